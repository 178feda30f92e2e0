//! Directory import and single-file registration.
//!
//! `psh import` walks a directory tree, registers every file matching the
//! configured globs and skips file names the project already has. A file
//! the classifier cannot place takes the name of the directory it sits in
//! as its category. Each import ends with one summary notification.

use anyhow::{bail, Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use walkdir::WalkDir;

use plansheet_core::models::{Document, Notification, NotificationKind};
use plansheet_core::register::{register_document, require_project, Registration};
use plansheet_core::store::Store;

use crate::config::{Config, ImportConfig};
use crate::extract::{extract_text, is_extractable};
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct ImportedDocument {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub documents: Vec<ImportedDocument>,
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
    }
    Ok(builder.build()?)
}

/// Bytes, hash and (optionally) text of a file about to be registered.
struct FilePayload {
    size: i64,
    sha256: String,
    text: Option<String>,
}

fn read_payload(path: &Path, file_name: &str, config: &ImportConfig) -> Result<FilePayload> {
    let bytes = std::fs::read(path)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let sha256 = format!("{:x}", hasher.finalize());

    let wants_text = config.extract_text
        && is_extractable(file_name)
        && bytes.len() as u64 <= config.max_extract_bytes;
    let text = if wants_text {
        match extract_text(&bytes, file_name) {
            Ok(t) if !t.is_empty() => Some(t),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "text extraction failed");
                None
            }
        }
    } else {
        None
    };

    Ok(FilePayload {
        size: bytes.len() as i64,
        sha256,
        text,
    })
}

async fn import_file<S: Store + ?Sized>(
    store: &S,
    config: &ImportConfig,
    project_id: &str,
    path: &Path,
    relative: &str,
    category_hint: Option<&str>,
) -> Result<Document> {
    let file_name = file_name_of(path)?;
    let payload = read_payload(path, &file_name, config)?;
    let file_path = path.to_string_lossy();

    let mut reg = Registration::new(project_id, &file_name, &file_path, payload.size);
    reg.extracted_text = payload.text;
    reg.metadata = Some(
        serde_json::json!({
            "sha256": payload.sha256,
            "relativePath": relative,
        })
        .to_string(),
    );
    reg.category_hint = category_hint;
    register_document(store, reg).await
}

fn file_name_of(path: &Path) -> Result<String> {
    match path.file_name() {
        Some(n) => Ok(n.to_string_lossy().to_string()),
        None => bail!("not a file: {}", path.display()),
    }
}

/// Import every matching file under `root` into a project.
///
/// Per-file and per-directory failures are collected in the report; only an
/// unknown project, a missing root or bad globs fail the whole call.
pub async fn import_directory<S: Store + ?Sized>(
    store: &S,
    config: &ImportConfig,
    root: &Path,
    project_id: &str,
) -> Result<ImportReport> {
    require_project(store, project_id).await?;

    if !root.is_dir() {
        bail!("Import directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;
    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut report = ImportReport::default();

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let dir = e.path().unwrap_or(root).display().to_string();
                report.errors.push(format!("Error scanning {}: {}", dir, e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        match store.find_document_by_file_name(project_id, &file_name).await {
            Ok(Some(_)) => {
                tracing::debug!(file = %file_name, "already imported, skipping");
                report.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                report
                    .errors
                    .push(format!("Error importing {}: {}", file_name, e));
                continue;
            }
        }

        // The directory directly containing the file, if below the root.
        let hint = relative
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string());

        match import_file(store, config, project_id, path, &rel_str, hint.as_deref()).await {
            Ok(doc) => {
                report.imported += 1;
                report.documents.push(ImportedDocument {
                    name: doc.name,
                    category: doc.category,
                });
            }
            Err(e) => report
                .errors
                .push(format!("Error importing {}: {}", file_name, e)),
        }
    }

    let kind = if report.errors.is_empty() {
        NotificationKind::Success
    } else {
        NotificationKind::Warning
    };
    store
        .insert_notification(&Notification::new(
            "Import Complete",
            &format!(
                "Imported {} documents, skipped {}",
                report.imported, report.skipped
            ),
            kind,
        ))
        .await?;

    tracing::info!(
        root = %root.display(),
        imported = report.imported,
        skipped = report.skipped,
        errors = report.errors.len(),
        "import finished"
    );

    Ok(report)
}

/// Register one file in place.
pub async fn add_file<S: Store + ?Sized>(
    store: &S,
    config: &ImportConfig,
    path: &Path,
    project_id: &str,
) -> Result<Document> {
    require_project(store, project_id).await?;
    if !path.is_file() {
        bail!("File does not exist: {}", path.display());
    }
    let relative = file_name_of(path)?;
    import_file(store, config, project_id, path, &relative, None)
        .await
        .with_context(|| format!("Failed to add {}", path.display()))
}

pub async fn run_import(config: &Config, dir: &Path, project_id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let report = import_directory(&store, &config.import, dir, project_id).await?;
    store.close().await;

    println!("import {}", dir.display());
    for doc in &report.documents {
        println!("  + {} [{}]", doc.name, doc.category);
    }
    println!("  imported: {}", report.imported);
    println!("  skipped: {}", report.skipped);
    println!("  errors: {}", report.errors.len());
    for err in &report.errors {
        println!("    {}", err);
    }
    println!("ok");
    Ok(())
}

pub async fn run_add(config: &Config, file: &Path, project_id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let doc = add_file(&store, &config.import, file, project_id).await?;
    store.close().await;

    println!("added {}", doc.id);
    println!("  name:        {}", doc.name);
    println!("  category:    {}", doc.category);
    println!(
        "  subcategory: {}",
        doc.subcategory.as_deref().unwrap_or("-")
    );
    println!("  revision:    {}", doc.revision.as_deref().unwrap_or("-"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansheet_core::models::{DocumentFilter, Project};
    use plansheet_core::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn no_text() -> ImportConfig {
        ImportConfig {
            extract_text: false,
            ..Default::default()
        }
    }

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"%PDF-1.4 placeholder").unwrap();
    }

    async fn store_with_project() -> (InMemoryStore, Project) {
        let store = InMemoryStore::new();
        let p = Project::new("Tower");
        store.insert_project(&p).await.unwrap();
        (store, p)
    }

    #[tokio::test]
    async fn test_import_classifies_and_hints() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "A-101-FLOOR-PLAN.pdf");
        write(tmp.path(), "Kitchen/KE-1-HOODS.PDF");
        write(tmp.path(), "Kitchen/notes.txt");
        let (store, p) = store_with_project().await;

        let report = import_directory(&store, &no_text(), tmp.path(), &p.id)
            .await
            .unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());

        let docs = store.list_documents(&DocumentFilter::default()).await.unwrap();
        let kitchen = docs.iter().find(|d| d.file_name == "KE-1-HOODS.PDF").unwrap();
        assert_eq!(kitchen.category, "Kitchen");
        assert_eq!(kitchen.subcategory.as_deref(), Some("General"));
        let arch = docs.iter().find(|d| d.file_name == "A-101-FLOOR-PLAN.pdf").unwrap();
        assert_eq!(arch.category, "Architecture");

        let meta: serde_json::Value =
            serde_json::from_str(arch.metadata.as_deref().unwrap()).unwrap();
        assert_eq!(meta["sha256"].as_str().unwrap().len(), 64);

        let notes = store.list_notifications(false, 10).await.unwrap();
        assert_eq!(notes[0].title, "Import Complete");
        assert_eq!(notes[0].message, "Imported 2 documents, skipped 0");
        assert_eq!(notes[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn test_reimport_skips_known_file_names() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "S1-FOUNDATION.pdf");
        write(tmp.path(), "copy/S1-FOUNDATION.pdf");
        let (store, p) = store_with_project().await;

        let report = import_directory(&store, &no_text(), tmp.path(), &p.id)
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);

        let again = import_directory(&store, &no_text(), tmp.path(), &p.id)
            .await
            .unwrap();
        assert_eq!(again.imported, 0);
        assert_eq!(again.skipped, 2);

        let cats = store.list_categories(Some(&p.id)).await.unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].count, 1);
    }

    #[tokio::test]
    async fn test_exclude_globs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "current/A-1.pdf");
        write(tmp.path(), "superseded/A-2.pdf");
        let (store, p) = store_with_project().await;
        let config = ImportConfig {
            exclude_globs: vec!["superseded/**".to_string()],
            ..no_text()
        };

        let report = import_directory(&store, &config, tmp.path(), &p.id)
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
    }

    #[tokio::test]
    async fn test_bad_pdf_text_does_not_abort() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "M-1-HVAC.pdf");
        let (store, p) = store_with_project().await;

        let report = import_directory(&store, &ImportConfig::default(), tmp.path(), &p.id)
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
        assert!(report.errors.is_empty());
        let docs = store.list_documents(&DocumentFilter::default()).await.unwrap();
        assert!(docs[0].extracted_text.is_none());
    }

    #[tokio::test]
    async fn test_unknown_project_and_missing_root() {
        let tmp = TempDir::new().unwrap();
        let (store, p) = store_with_project().await;

        let err = import_directory(&store, &no_text(), tmp.path(), "nope")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("project not found"));

        let missing = tmp.path().join("missing");
        assert!(import_directory(&store, &no_text(), &missing, &p.id)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_add_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "EA-200-LIGHTING-Rev2.pdf");
        let (store, p) = store_with_project().await;

        let doc = add_file(
            &store,
            &no_text(),
            &tmp.path().join("EA-200-LIGHTING-Rev2.pdf"),
            &p.id,
        )
        .await
        .unwrap();
        assert_eq!(doc.category, "Electrical");
        assert_eq!(doc.subcategory.as_deref(), Some("Lighting"));
        assert_eq!(doc.revision.as_deref(), Some("2"));
        assert_eq!(doc.file_size, 20);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_reported_per_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "A-101-FLOOR-PLAN.pdf");
        write(tmp.path(), "S1-FOUNDATION.pdf");

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::schema::ensure_schema(&pool).await.unwrap();
        sqlx::query("DROP TABLE documents")
            .execute(&pool)
            .await
            .unwrap();
        let store = crate::sqlite_store::SqliteStore::new(pool);
        let p = Project::new("Tower");
        store.insert_project(&p).await.unwrap();

        let report = import_directory(&store, &no_text(), tmp.path(), &p.id)
            .await
            .unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("Error importing A-101-FLOOR-PLAN.pdf"));

        let notes = store.list_notifications(false, 10).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Import Complete");
        assert_eq!(notes[0].kind, NotificationKind::Warning);
    }
}
