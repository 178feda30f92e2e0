//! Schema bootstrap.
//!
//! Creates every table and index with `IF NOT EXISTS`, so `psh init` can be
//! run any number of times. Tables are rowid tables; listing "in store
//! order" means ascending rowid, i.e. insertion order.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        start_date INTEGER NOT NULL,
        end_date INTEGER,
        budget REAL,
        location TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        file_name TEXT NOT NULL,
        file_path TEXT NOT NULL,
        file_size INTEGER NOT NULL,
        category TEXT NOT NULL,
        subcategory TEXT,
        revision TEXT,
        description TEXT,
        extracted_text TEXT,
        metadata TEXT,
        project_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        FOREIGN KEY (project_id) REFERENCES projects(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        name TEXT NOT NULL,
        project_id TEXT NOT NULL,
        count INTEGER NOT NULL DEFAULT 0,
        color TEXT NOT NULL,
        UNIQUE(name, project_id),
        FOREIGN KEY (project_id) REFERENCES projects(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'todo',
        priority TEXT NOT NULL DEFAULT 'medium',
        due_date INTEGER,
        estimated_hours REAL,
        actual_hours REAL,
        assignee_id TEXT,
        project_id TEXT NOT NULL,
        parent_id TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        FOREIGN KEY (project_id) REFERENCES projects(id),
        FOREIGN KEY (parent_id) REFERENCES tasks(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS milestones (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        due_date INTEGER NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        completed_at INTEGER,
        project_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        FOREIGN KEY (project_id) REFERENCES projects(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS annotations (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        x REAL NOT NULL,
        y REAL NOT NULL,
        page INTEGER NOT NULL DEFAULT 1,
        color TEXT NOT NULL,
        document_id TEXT NOT NULL,
        author_name TEXT,
        created_at INTEGER NOT NULL,
        FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        kind TEXT NOT NULL DEFAULT 'info',
        read INTEGER NOT NULL DEFAULT 0,
        link TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS search_history (
        id TEXT PRIMARY KEY,
        query TEXT NOT NULL,
        results TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_documents_project ON documents(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_file_name ON documents(project_id, file_name)",
    "CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_milestones_due ON milestones(due_date)",
    "CREATE INDEX IF NOT EXISTS idx_annotations_document ON annotations(document_id)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_read ON notifications(read)",
];

/// Create all tables and indexes on an open pool.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in TABLES.iter().chain(INDEXES.iter()) {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// `psh init`: open (creating if needed) the database and bootstrap it.
pub async fn run_init(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    tracing::info!(path = %config.db.path.display(), "schema ready");
    Ok(())
}
