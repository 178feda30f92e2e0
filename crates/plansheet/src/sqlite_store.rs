//! SQLite-backed [`Store`] implementation.
//!
//! Every [`Store`] method maps to one or a few statements against the tables
//! created by [`crate::schema`]. Substring matching folds ASCII case only:
//! SQLite's `lower()` on the column, `to_ascii_lowercase` on the query.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use plansheet_core::models::{
    task_order, Annotation, CategoryCount, Document, DocumentFilter, DocumentUpdate, Milestone,
    Notification, Project, ProjectSummary, SearchHistoryEntry, Task, TaskFilter, TaskStatus,
};
use plansheet_core::store::{AnnotationCandidate, Store};

use crate::config::Config;
use crate::db;
use crate::schema::ensure_schema;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, bootstrapping the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

const DOCUMENT_COLUMNS: &str = "id, name, file_name, file_path, file_size, category, subcategory, \
     revision, description, extracted_text, metadata, project_id, created_at, updated_at";

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, estimated_hours, \
     actual_hours, assignee_id, project_id, parent_id, created_at, updated_at";

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let status: String = row.get("status");
    Ok(Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        status: status.parse()?,
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        budget: row.get("budget"),
        location: row.get("location"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn document_from_row(row: &SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        name: row.get("name"),
        file_name: row.get("file_name"),
        file_path: row.get("file_path"),
        file_size: row.get("file_size"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        revision: row.get("revision"),
        description: row.get("description"),
        extracted_text: row.get("extracted_text"),
        metadata: row.get("metadata"),
        project_id: row.get("project_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let status: String = row.get("status");
    let priority: String = row.get("priority");
    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: status.parse()?,
        priority: priority.parse()?,
        due_date: row.get("due_date"),
        estimated_hours: row.get("estimated_hours"),
        actual_hours: row.get("actual_hours"),
        assignee_id: row.get("assignee_id"),
        project_id: row.get("project_id"),
        parent_id: row.get("parent_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn milestone_from_row(row: &SqliteRow) -> Milestone {
    Milestone {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        due_date: row.get("due_date"),
        completed: row.get("completed"),
        completed_at: row.get("completed_at"),
        project_id: row.get("project_id"),
        created_at: row.get("created_at"),
    }
}

fn annotation_from_row(row: &SqliteRow) -> Annotation {
    Annotation {
        id: row.get("id"),
        content: row.get("content"),
        x: row.get("x"),
        y: row.get("y"),
        page: row.get("page"),
        color: row.get("color"),
        document_id: row.get("document_id"),
        author_name: row.get("author_name"),
        created_at: row.get("created_at"),
    }
}

fn notification_from_row(row: &SqliteRow) -> Result<Notification> {
    let kind: String = row.get("kind");
    Ok(Notification {
        id: row.get("id"),
        title: row.get("title"),
        message: row.get("message"),
        kind: kind.parse()?,
        read: row.get("read"),
        link: row.get("link"),
        created_at: row.get("created_at"),
    })
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_project(&self, project: &Project) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, status, start_date, end_date,
                                  budget, location, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.budget)
        .bind(&project.location)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT p.*,
                   (SELECT COUNT(*) FROM documents d WHERE d.project_id = p.id) AS document_count,
                   (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count,
                   (SELECT COUNT(*) FROM milestones m WHERE m.project_id = p.id) AS milestone_count
            FROM projects p
            ORDER BY p.created_at DESC, p.rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ProjectSummary {
                    project: project_from_row(row)?,
                    documents: row.get("document_count"),
                    tasks: row.get("task_count"),
                    milestones: row.get("milestone_count"),
                })
            })
            .collect()
    }

    async fn insert_document(&self, doc: &Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, name, file_name, file_path, file_size, category,
                                   subcategory, revision, description, extracted_text,
                                   metadata, project_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.name)
        .bind(&doc.file_name)
        .bind(&doc.file_path)
        .bind(doc.file_size)
        .bind(&doc.category)
        .bind(&doc.subcategory)
        .bind(&doc.revision)
        .bind(&doc.description)
        .bind(&doc.extracted_text)
        .bind(&doc.metadata)
        .bind(&doc.project_id)
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert document '{}'", doc.file_name))?;
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("SELECT {} FROM documents WHERE id = ?", DOCUMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(document_from_row))
    }

    async fn find_document_by_file_name(
        &self,
        project_id: &str,
        file_name: &str,
    ) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE project_id = ? AND file_name = ? ORDER BY rowid LIMIT 1",
            DOCUMENT_COLUMNS
        ))
        .bind(project_id)
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(document_from_row))
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        let needle = filter.search.as_deref().map(str::to_ascii_lowercase);
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM documents
            WHERE (?1 IS NULL OR project_id = ?1)
              AND (?2 IS NULL OR category = ?2)
              AND (?3 IS NULL
                   OR instr(lower(name), ?3) > 0
                   OR instr(lower(file_name), ?3) > 0
                   OR instr(lower(COALESCE(extracted_text, '')), ?3) > 0)
            ORDER BY created_at DESC, rowid DESC
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(&filter.project_id)
        .bind(&filter.category)
        .bind(&needle)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<Option<Document>> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                extracted_text = COALESCE(?, extracted_text),
                metadata = COALESCE(?, metadata),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.extracted_text)
        .bind(&update.metadata)
        .bind(now_ts())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_document(id).await
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM annotations WHERE document_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_category(&self, project_id: &str, name: &str, color: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (name, project_id, count, color)
            VALUES (?, ?, 1, ?)
            ON CONFLICT(name, project_id) DO UPDATE SET count = count + 1
            "#,
        )
        .bind(name)
        .bind(project_id)
        .bind(color)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn decrement_category(&self, project_id: &str, name: &str) -> Result<()> {
        sqlx::query("UPDATE categories SET count = count - 1 WHERE name = ? AND project_id = ?")
            .bind(name)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_categories(&self, project_id: Option<&str>) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query(
            r#"
            SELECT name, project_id, count, color FROM categories
            WHERE (?1 IS NULL OR project_id = ?1)
            ORDER BY count DESC, rowid ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CategoryCount {
                name: row.get("name"),
                project_id: row.get("project_id"),
                count: row.get("count"),
                color: row.get("color"),
            })
            .collect())
    }

    async fn insert_task(&self, task: &Task) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO tasks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            TASK_COLUMNS
        ))
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.estimated_hours)
        .bind(task.actual_hours)
        .bind(&task.assignee_id)
        .bind(&task.project_id)
        .bind(&task.parent_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM tasks
            WHERE (?1 IS NULL OR project_id = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY rowid
            "#,
            TASK_COLUMNS
        ))
        .bind(&filter.project_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        // Priority is stored as text, so ordering happens here.
        let mut tasks = rows.iter().map(task_from_row).collect::<Result<Vec<_>>>()?;
        tasks.sort_by(task_order);
        Ok(tasks)
    }

    async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_ts())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_milestone(&self, milestone: &Milestone) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO milestones (id, name, description, due_date, completed,
                                    completed_at, project_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&milestone.id)
        .bind(&milestone.name)
        .bind(&milestone.description)
        .bind(milestone.due_date)
        .bind(milestone.completed)
        .bind(milestone.completed_at)
        .bind(&milestone.project_id)
        .bind(milestone.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_milestones(&self, project_id: Option<&str>) -> Result<Vec<Milestone>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM milestones
            WHERE (?1 IS NULL OR project_id = ?1)
            ORDER BY due_date ASC, rowid ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(milestone_from_row).collect())
    }

    async fn complete_milestone(&self, id: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE milestones SET completed = 1, completed_at = ? WHERE id = ?")
                .bind(now_ts())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_annotation(&self, annotation: &Annotation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO annotations (id, content, x, y, page, color, document_id,
                                     author_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&annotation.id)
        .bind(&annotation.content)
        .bind(annotation.x)
        .bind(annotation.y)
        .bind(annotation.page)
        .bind(&annotation.color)
        .bind(&annotation.document_id)
        .bind(&annotation.author_name)
        .bind(annotation.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_annotations(&self, document_id: &str) -> Result<Vec<Annotation>> {
        let rows = sqlx::query(
            "SELECT * FROM annotations WHERE document_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(annotation_from_row).collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, title, message, kind, read, link, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.read)
        .bind(&notification.link)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notifications(
        &self,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM notifications
            WHERE (?1 = 0 OR read = 0)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(notification_from_row).collect()
    }

    async fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE read = 0")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn document_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM documents
            WHERE (?2 IS NULL OR project_id = ?2)
              AND (instr(lower(name), ?1) > 0
                   OR instr(lower(file_name), ?1) > 0
                   OR instr(lower(COALESCE(description, '')), ?1) > 0
                   OR instr(lower(COALESCE(extracted_text, '')), ?1) > 0
                   OR instr(lower(category), ?1) > 0
                   OR instr(lower(COALESCE(subcategory, '')), ?1) > 0)
            ORDER BY rowid
            LIMIT ?3
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(query.to_ascii_lowercase())
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn task_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM tasks
            WHERE (?2 IS NULL OR project_id = ?2)
              AND (instr(lower(title), ?1) > 0
                   OR instr(lower(COALESCE(description, '')), ?1) > 0)
            ORDER BY rowid
            LIMIT ?3
            "#,
            TASK_COLUMNS
        ))
        .bind(query.to_ascii_lowercase())
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn annotation_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AnnotationCandidate>> {
        let rows = sqlx::query(
            r#"
            SELECT a.*, d.name AS document_name
            FROM annotations a
            LEFT JOIN documents d ON d.id = a.document_id
            WHERE instr(lower(a.content), ?1) > 0
              AND (?2 IS NULL OR d.project_id = ?2)
            ORDER BY a.rowid
            LIMIT ?3
            "#,
        )
        .bind(query.to_ascii_lowercase())
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| AnnotationCandidate {
                annotation: annotation_from_row(row),
                document_name: row.get("document_name"),
            })
            .collect())
    }

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO search_history (id, query, results, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.query)
        .bind(serde_json::to_string(&entry.results)?)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
