//! `psh project add` and `psh project list`.

use anyhow::{bail, Result};

use plansheet_core::models::{format_date, parse_date, Project, ProjectStatus};
use plansheet_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Optional fields for a new project.
#[derive(Debug, Default)]
pub struct NewProject {
    pub description: Option<String>,
    pub location: Option<String>,
    pub budget: Option<f64>,
    pub status: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Build a [`Project`] from CLI input, validating status and dates.
pub fn build_project(name: &str, opts: NewProject) -> Result<Project> {
    if name.trim().is_empty() {
        bail!("project name must not be empty");
    }
    let mut project = Project::new(name.trim());
    project.description = opts.description;
    project.location = opts.location;
    project.budget = opts.budget;
    if let Some(status) = opts.status {
        project.status = status.parse::<ProjectStatus>()?;
    }
    if let Some(start) = opts.start {
        project.start_date = parse_date(&start)?;
    }
    if let Some(end) = opts.end {
        let end = parse_date(&end)?;
        if end < project.start_date {
            bail!("end date must not be before start date");
        }
        project.end_date = Some(end);
    }
    Ok(project)
}

pub async fn run_project_add(config: &Config, name: &str, opts: NewProject) -> Result<()> {
    let project = build_project(name, opts)?;
    let store = SqliteStore::open(config).await?;
    store.insert_project(&project).await?;
    store.close().await;

    println!("created project {}", project.id);
    println!("  name:   {}", project.name);
    println!("  status: {}", project.status);
    println!("  start:  {}", format_date(project.start_date));
    Ok(())
}

pub async fn run_project_list(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let projects = store.list_projects().await?;
    store.close().await;

    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    for summary in &projects {
        let p = &summary.project;
        println!("{} [{}] {}", p.id, p.status, p.name);
        if let Some(ref location) = p.location {
            println!("    location: {}", location);
        }
        if let Some(budget) = p.budget {
            println!("    budget: {:.2}", budget);
        }
        let end = p.end_date.map(format_date).unwrap_or_else(|| "-".to_string());
        println!("    dates: {} .. {}", format_date(p.start_date), end);
        println!(
            "    documents: {}  tasks: {}  milestones: {}",
            summary.documents, summary.tasks, summary.milestones
        );
    }
    Ok(())
}
