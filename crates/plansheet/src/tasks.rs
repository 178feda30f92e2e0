//! Task and milestone commands.

use anyhow::{bail, Result};

use plansheet_core::models::{
    format_date, parse_date, Milestone, Priority, Task, TaskFilter, TaskStatus,
};
use plansheet_core::register::require_project;
use plansheet_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Default)]
pub struct NewTask {
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub estimated_hours: Option<f64>,
    pub assignee: Option<String>,
    pub parent: Option<String>,
}

/// Validate CLI input and store a new task.
pub async fn add_task<S: Store + ?Sized>(
    store: &S,
    project_id: &str,
    title: &str,
    opts: NewTask,
) -> Result<Task> {
    if title.trim().is_empty() {
        bail!("task title must not be empty");
    }
    require_project(store, project_id).await?;

    let mut task = Task::new(project_id, title.trim());
    task.description = opts.description;
    if let Some(priority) = opts.priority {
        task.priority = priority.parse::<Priority>()?;
    }
    if let Some(due) = opts.due {
        task.due_date = Some(parse_date(&due)?);
    }
    if let Some(hours) = opts.estimated_hours {
        if hours < 0.0 {
            bail!("estimated hours must not be negative");
        }
        task.estimated_hours = Some(hours);
    }
    task.assignee_id = opts.assignee;
    task.parent_id = opts.parent;

    store.insert_task(&task).await?;
    Ok(task)
}

pub async fn run_task_add(
    config: &Config,
    project_id: &str,
    title: &str,
    opts: NewTask,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = add_task(&store, project_id, title, opts).await;
    store.close().await;

    let task = result?;
    println!("created task {}", task.id);
    println!("  {} [{} / {}]", task.title, task.status, task.priority);
    Ok(())
}

pub async fn run_task_list(
    config: &Config,
    project_id: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let filter = TaskFilter {
        project_id,
        status: status.map(|s| s.parse::<TaskStatus>()).transpose()?,
    };
    let store = SqliteStore::open(config).await?;
    let tasks = store.list_tasks(&filter).await?;
    store.close().await;

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for task in &tasks {
        let due = task
            .due_date
            .map(format_date)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} [{}] ({}) due {} {}",
            task.id, task.status, task.priority, due, task.title
        );
    }
    Ok(())
}

pub async fn run_task_status(config: &Config, id: &str, status: &str) -> Result<()> {
    let status: TaskStatus = status.parse()?;
    let store = SqliteStore::open(config).await?;
    let found = store.set_task_status(id, status).await?;
    store.close().await;

    if !found {
        bail!("task not found: {}", id);
    }
    println!("task {} -> {}", id, status);
    Ok(())
}

pub async fn run_milestone_add(
    config: &Config,
    project_id: &str,
    name: &str,
    due: &str,
    description: Option<String>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("milestone name must not be empty");
    }
    let due_date = parse_date(due)?;
    let store = SqliteStore::open(config).await?;
    if let Err(e) = require_project(&store, project_id).await {
        store.close().await;
        return Err(e);
    }
    let mut milestone = Milestone::new(project_id, name.trim(), due_date);
    milestone.description = description;
    store.insert_milestone(&milestone).await?;
    store.close().await;

    println!("created milestone {}", milestone.id);
    println!("  {} due {}", milestone.name, format_date(milestone.due_date));
    Ok(())
}

pub async fn run_milestone_list(config: &Config, project_id: Option<&str>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let milestones = store.list_milestones(project_id).await?;
    store.close().await;

    if milestones.is_empty() {
        println!("No milestones.");
        return Ok(());
    }
    for m in &milestones {
        let mark = if m.completed { "x" } else { " " };
        println!("[{}] {} {} {}", mark, format_date(m.due_date), m.id, m.name);
    }
    Ok(())
}

pub async fn run_milestone_done(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let found = store.complete_milestone(id).await?;
    store.close().await;

    if !found {
        bail!("milestone not found: {}", id);
    }
    println!("milestone {} completed", id);
    Ok(())
}
