//! # Plansheet CLI (`psh`)
//!
//! ```bash
//! psh --config ./config/plansheet.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `psh init` | Create the SQLite database and tables |
//! | `psh classify <name>...` | Show category, subcategory and revision for file names |
//! | `psh project add/list` | Manage projects |
//! | `psh import <dir> --project <id>` | Import a directory of drawings |
//! | `psh add <file> --project <id>` | Register one file |
//! | `psh docs` / `get` / `edit` / `rm` | Browse and maintain documents |
//! | `psh annotate <doc> <text>` | Pin a note to a document |
//! | `psh task ...` / `psh milestone ...` | Task board and schedule |
//! | `psh notify ...` | Notifications |
//! | `psh search "<query>"` | Ranked search over documents, tasks and annotations |
//! | `psh stats` | Dashboard |
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` to change the
//! filter (default `plansheet=info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plansheet::config;
use plansheet::documents::{self, AnnotationOptions};
use plansheet::import;
use plansheet::notifications;
use plansheet::projects::{self, NewProject};
use plansheet::schema;
use plansheet::search;
use plansheet::stats;
use plansheet::tasks::{self, NewTask};
use plansheet_core::models::{DocumentFilter, DocumentUpdate};

/// Plansheet: document register, task board and keyword search for
/// construction projects.
#[derive(Parser)]
#[command(
    name = "psh",
    about = "Plansheet: drawings register, tasks and search for construction projects",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/plansheet.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Classify file names without touching the database.
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Import every matching file under a directory.
    ///
    /// Files whose name already exists in the project are skipped. A file
    /// the classifier cannot place is filed under its directory's name.
    Import {
        dir: PathBuf,
        #[arg(long)]
        project: String,
    },

    /// Register a single file in place.
    Add {
        file: PathBuf,
        #[arg(long)]
        project: String,
    },

    /// List documents, newest first.
    Docs {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Substring of the name, file name or extracted text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a document with its annotations.
    Get { id: String },

    /// Update document fields.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replace the extracted text.
        #[arg(long)]
        text: Option<String>,
    },

    /// Delete a document and its annotations.
    Rm { id: String },

    /// Add an annotation to a document.
    Annotate {
        document: String,
        content: String,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },

    /// Manage tasks.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage milestones.
    Milestone {
        #[command(subcommand)]
        action: MilestoneAction,
    },

    /// List, add and acknowledge notifications.
    Notify {
        #[command(subcommand)]
        action: NotifyAction,
    },

    /// Search documents, tasks and annotations.
    Search {
        query: String,
        #[arg(long)]
        project: Option<String>,
        /// Print the response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the project dashboard.
    Stats {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        /// active, completed or on-hold.
        #[arg(long)]
        status: Option<String>,
        /// Start date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,
    },
    List,
}

#[derive(Subcommand)]
enum TaskAction {
    Add {
        title: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        description: Option<String>,
        /// low, medium, high or urgent.
        #[arg(long)]
        priority: Option<String>,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        parent: Option<String>,
    },
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Set a task's status: todo, in_progress, review or completed.
    Status { id: String, status: String },
}

#[derive(Subcommand)]
enum MilestoneAction {
    Add {
        name: String,
        #[arg(long)]
        project: String,
        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: String,
        #[arg(long)]
        description: Option<String>,
    },
    List {
        #[arg(long)]
        project: Option<String>,
    },
    Done { id: String },
}

#[derive(Subcommand)]
enum NotifyAction {
    List {
        #[arg(long)]
        unread: bool,
    },
    Add {
        title: String,
        message: String,
        /// info, warning, error or success.
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        link: Option<String>,
    },
    Read {
        id: Option<String>,
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plansheet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Classify { names } = &cli.command {
        plansheet::classify::run_classify(names);
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            schema::run_init(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Classify { .. } => unreachable!("handled before config is loaded"),
        Commands::Project { action } => match action {
            ProjectAction::Add {
                name,
                description,
                location,
                budget,
                status,
                start,
                end,
            } => {
                let opts = NewProject {
                    description,
                    location,
                    budget,
                    status,
                    start,
                    end,
                };
                projects::run_project_add(&cfg, &name, opts).await?;
            }
            ProjectAction::List => projects::run_project_list(&cfg).await?,
        },
        Commands::Import { dir, project } => {
            import::run_import(&cfg, &dir, &project).await?;
        }
        Commands::Add { file, project } => {
            import::run_add(&cfg, &file, &project).await?;
        }
        Commands::Docs {
            project,
            category,
            search,
        } => {
            let filter = DocumentFilter {
                project_id: project,
                category,
                search,
            };
            documents::run_docs(&cfg, filter).await?;
        }
        Commands::Get { id } => documents::run_get(&cfg, &id).await?,
        Commands::Edit {
            id,
            name,
            description,
            text,
        } => {
            let update = DocumentUpdate {
                name,
                description,
                extracted_text: text,
                metadata: None,
            };
            documents::run_edit(&cfg, &id, update).await?;
        }
        Commands::Rm { id } => documents::run_rm(&cfg, &id).await?,
        Commands::Annotate {
            document,
            content,
            page,
            x,
            y,
            color,
            author,
        } => {
            let opts = AnnotationOptions {
                page,
                x,
                y,
                color,
                author,
            };
            documents::run_annotate(&cfg, &document, &content, opts).await?;
        }
        Commands::Task { action } => match action {
            TaskAction::Add {
                title,
                project,
                description,
                priority,
                due,
                hours,
                assignee,
                parent,
            } => {
                let opts = NewTask {
                    description,
                    priority,
                    due,
                    estimated_hours: hours,
                    assignee,
                    parent,
                };
                tasks::run_task_add(&cfg, &project, &title, opts).await?;
            }
            TaskAction::List { project, status } => {
                tasks::run_task_list(&cfg, project, status).await?;
            }
            TaskAction::Status { id, status } => {
                tasks::run_task_status(&cfg, &id, &status).await?;
            }
        },
        Commands::Milestone { action } => match action {
            MilestoneAction::Add {
                name,
                project,
                due,
                description,
            } => {
                tasks::run_milestone_add(&cfg, &project, &name, &due, description).await?;
            }
            MilestoneAction::List { project } => {
                tasks::run_milestone_list(&cfg, project.as_deref()).await?;
            }
            MilestoneAction::Done { id } => tasks::run_milestone_done(&cfg, &id).await?,
        },
        Commands::Notify { action } => match action {
            NotifyAction::List { unread } => {
                notifications::run_notify_list(&cfg, unread).await?;
            }
            NotifyAction::Add {
                title,
                message,
                kind,
                link,
            } => {
                notifications::run_notify_add(&cfg, &title, &message, kind.as_deref(), link)
                    .await?;
            }
            NotifyAction::Read { id, all } => {
                notifications::run_notify_read(&cfg, id.as_deref(), all).await?;
            }
        },
        Commands::Search {
            query,
            project,
            json,
        } => {
            search::run_search(&cfg, &query, project.as_deref(), json).await?;
        }
        Commands::Stats { project, json } => {
            stats::run_stats(&cfg, project.as_deref(), json).await?;
        }
    }

    Ok(())
}
