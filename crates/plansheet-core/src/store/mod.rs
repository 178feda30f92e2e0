//! Storage abstraction for Plansheet.
//!
//! The [`Store`] trait is the generic record store every operation in this
//! crate runs against. It is always passed in explicitly; nothing holds a
//! process-wide handle. Backends: SQLite (in the `plansheet` crate) and
//! [`memory::InMemoryStore`] for tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! # Ordering contracts
//!
//! | Method | Order |
//! |--------|-------|
//! | [`list_projects`](Store::list_projects) | newest first |
//! | [`list_documents`](Store::list_documents) | newest first |
//! | [`list_categories`](Store::list_categories) | count descending |
//! | [`list_tasks`](Store::list_tasks) | [`task_order`](crate::models::task_order) |
//! | [`list_milestones`](Store::list_milestones) | due date ascending |
//! | [`list_annotations`](Store::list_annotations) | newest first |
//! | [`list_notifications`](Store::list_notifications) | newest first |
//! | `*_candidates` | insertion order |
//!
//! # Matching
//!
//! Substring filters (`DocumentFilter::search` and the `*_candidates`
//! methods) fold ASCII letters only, which is what SQLite's `lower()` does.
//! `"elevation"` finds `"ELEVATION"`, but `"élévation"` does not find
//! `"ÉLÉVATION"`. Every backend must match the same way.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{
    Annotation, CategoryCount, Document, DocumentFilter, DocumentUpdate, Milestone, Notification,
    Project, ProjectSummary, SearchHistoryEntry, Task, TaskFilter, TaskStatus,
};

/// An annotation matched by search, with the name of the document it sits on.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationCandidate {
    pub annotation: Annotation,
    pub document_name: Option<String>,
}

/// Abstract record store.
///
/// Search candidate methods apply a broad, case-insensitive substring
/// filter for the whole query; ranking happens in [`crate::search`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_project(&self, project: &Project) -> Result<()>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>>;

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    async fn insert_document(&self, doc: &Document) -> Result<()>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Look up a document by its file name within one project.
    async fn find_document_by_file_name(
        &self,
        project_id: &str,
        file_name: &str,
    ) -> Result<Option<Document>>;

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>>;

    /// Apply the set fields of `update`. Returns the updated document, or
    /// `None` if the id is unknown.
    async fn update_document(&self, id: &str, update: &DocumentUpdate)
        -> Result<Option<Document>>;

    /// Delete a document and its annotations. Returns `false` if the id is unknown.
    async fn delete_document(&self, id: &str) -> Result<bool>;

    /// Add one to a category counter, creating it with `color` if missing.
    async fn increment_category(&self, project_id: &str, name: &str, color: &str) -> Result<()>;

    /// Subtract one from a category counter if it exists.
    async fn decrement_category(&self, project_id: &str, name: &str) -> Result<()>;

    async fn list_categories(&self, project_id: Option<&str>) -> Result<Vec<CategoryCount>>;

    async fn insert_task(&self, task: &Task) -> Result<()>;

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Returns `false` if the id is unknown.
    async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<bool>;

    async fn insert_milestone(&self, milestone: &Milestone) -> Result<()>;

    async fn list_milestones(&self, project_id: Option<&str>) -> Result<Vec<Milestone>>;

    /// Mark a milestone completed now. Returns `false` if the id is unknown.
    async fn complete_milestone(&self, id: &str) -> Result<bool>;

    async fn insert_annotation(&self, annotation: &Annotation) -> Result<()>;

    async fn list_annotations(&self, document_id: &str) -> Result<Vec<Annotation>>;

    async fn insert_notification(&self, notification: &Notification) -> Result<()>;

    async fn list_notifications(&self, unread_only: bool, limit: i64)
        -> Result<Vec<Notification>>;

    /// Returns `false` if the id is unknown.
    async fn mark_notification_read(&self, id: &str) -> Result<bool>;

    /// Returns the number of notifications that changed.
    async fn mark_all_notifications_read(&self) -> Result<u64>;

    /// Documents whose name, file name, description, extracted text,
    /// category or subcategory contains `query`.
    async fn document_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Document>>;

    /// Tasks whose title or description contains `query`.
    async fn task_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Task>>;

    /// Annotations whose content contains `query`; the project filter
    /// applies through the annotated document.
    async fn annotation_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AnnotationCandidate>>;

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()>;
}
