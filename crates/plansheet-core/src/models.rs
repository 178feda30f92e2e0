//! Record types owned by the store.
//!
//! Timestamps are Unix seconds; [`format_ts_iso`] renders them for output.
//! Identifiers are UUID v4 strings generated by the `new` constructors.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn now_ts() -> i64 {
    Utc::now().timestamp()
}

/// Render a Unix timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Render a Unix timestamp as `YYYY-MM-DD`.
pub fn format_date(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parse `YYYY-MM-DD` into the Unix timestamp of midnight UTC.
pub fn parse_date(s: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date '{}' (expected YYYY-MM-DD): {}", s, e))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| anyhow!("invalid date '{}'", s))
}

/// Declares a string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => bail!(
                        "invalid {} '{}'. Must be one of: {}",
                        $what,
                        other,
                        [$($text),+].join(", ")
                    ),
                }
            }
        }
    };
}

string_enum!(
    /// Lifecycle of a project.
    ProjectStatus, "project status", {
        Active => "active",
        Completed => "completed",
        OnHold => "on-hold",
    }
);

string_enum!(
    /// Workflow state of a task.
    TaskStatus, "task status", {
        Todo => "todo",
        InProgress => "in_progress",
        Review => "review",
        Completed => "completed",
    }
);

string_enum!(
    /// Task urgency.
    Priority, "priority", {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

string_enum!(
    /// Severity of a notification.
    NotificationKind, "notification type", {
        Info => "info",
        Warning => "warning",
        Error => "error",
        Success => "success",
    }
);

impl Priority {
    /// Ordering weight, higher is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: i64,
    pub end_date: Option<i64>,
    pub budget: Option<f64>,
    pub location: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    /// Active project starting now.
    pub fn new(name: &str) -> Self {
        let now = now_ts();
        Self {
            id: new_id(),
            name: name.to_string(),
            description: None,
            status: ProjectStatus::Active,
            start_date: now,
            end_date: None,
            budget: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A project with the sizes of its record collections.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub documents: i64,
    pub tasks: i64,
    pub milestones: i64,
}

/// A registered drawing or document file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Display name derived from the file name.
    pub name: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub category: String,
    pub subcategory: Option<String>,
    pub revision: Option<String>,
    pub description: Option<String>,
    pub extracted_text: Option<String>,
    /// Free-form JSON object.
    pub metadata: Option<String>,
    pub project_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Filters for listing documents. `search` is a case-insensitive substring
/// over name, file name and extracted text.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub project_id: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Editable document fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub extracted_text: Option<String>,
    pub metadata: Option<String>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.extracted_text.is_none()
            && self.metadata.is_none()
    }
}

/// Denormalized number of documents per category within a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub project_id: String,
    pub count: i64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<i64>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub assignee_id: Option<String>,
    pub project_id: String,
    pub parent_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// A `todo` task of `medium` priority.
    pub fn new(project_id: &str, title: &str) -> Self {
        let now = now_ts();
        Self {
            id: new_id(),
            title: title.to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            due_date: None,
            estimated_hours: None,
            actual_hours: None,
            assignee_id: None,
            project_id: project_id.to_string(),
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project_id: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Task listing order: priority descending, then due date ascending with
/// undated tasks last.
pub fn task_order(a: &Task, b: &Task) -> std::cmp::Ordering {
    b.priority.rank().cmp(&a.priority.rank()).then_with(|| {
        match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub due_date: i64,
    pub completed: bool,
    pub completed_at: Option<i64>,
    pub project_id: String,
    pub created_at: i64,
}

impl Milestone {
    pub fn new(project_id: &str, name: &str, due_date: i64) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            description: None,
            due_date,
            completed: false,
            completed_at: None,
            project_id: project_id.to_string(),
            created_at: now_ts(),
        }
    }
}

/// A note pinned to a position on a document page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub page: i64,
    pub color: String,
    pub document_id: String,
    pub author_name: Option<String>,
    pub created_at: i64,
}

impl Annotation {
    /// Default yellow highlight on page 1 at the origin.
    pub fn new(document_id: &str, content: &str) -> Self {
        Self {
            id: new_id(),
            content: content.to_string(),
            x: 0.0,
            y: 0.0,
            page: 1,
            color: "#FFEB3B".to_string(),
            document_id: document_id.to_string(),
            author_name: None,
            created_at: now_ts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub link: Option<String>,
    pub created_at: i64,
}

impl Notification {
    pub fn new(title: &str, message: &str, kind: NotificationKind) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            read: false,
            link: None,
            created_at: now_ts(),
        }
    }
}

/// A recorded search: the raw query and per-kind hit counts.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    pub results: serde_json::Value,
    pub created_at: i64,
}

impl SearchHistoryEntry {
    pub fn new(query: &str, documents: usize, tasks: usize, annotations: usize) -> Self {
        Self {
            id: new_id(),
            query: query.to_string(),
            results: serde_json::json!({
                "documentsCount": documents,
                "tasksCount": tasks,
                "annotationsCount": annotations,
            }),
            created_at: now_ts(),
        }
    }
}
