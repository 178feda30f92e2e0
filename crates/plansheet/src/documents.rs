//! Document commands: `docs`, `get`, `edit`, `rm` and `annotate`.

use anyhow::{bail, Result};

use plansheet_core::models::{format_ts_iso, Annotation, Document, DocumentFilter, DocumentUpdate};
use plansheet_core::register::remove_document;
use plansheet_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Placement and styling for a new annotation.
#[derive(Debug, Default)]
pub struct AnnotationOptions {
    pub page: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
    pub author: Option<String>,
}

/// Build an annotation for an existing document.
pub async fn annotate<S: Store + ?Sized>(
    store: &S,
    document_id: &str,
    content: &str,
    opts: AnnotationOptions,
) -> Result<Annotation> {
    if content.trim().is_empty() {
        bail!("annotation content must not be empty");
    }
    if store.get_document(document_id).await?.is_none() {
        bail!("document not found: {}", document_id);
    }

    let mut annotation = Annotation::new(document_id, content);
    if let Some(page) = opts.page {
        if page < 1 {
            bail!("page must be >= 1");
        }
        annotation.page = page;
    }
    annotation.x = opts.x.unwrap_or(annotation.x);
    annotation.y = opts.y.unwrap_or(annotation.y);
    if let Some(color) = opts.color {
        annotation.color = color;
    }
    annotation.author_name = opts.author;

    store.insert_annotation(&annotation).await?;
    Ok(annotation)
}

fn print_document_line(doc: &Document) {
    println!(
        "{} [{} / {}] {}",
        doc.id,
        doc.category,
        doc.subcategory.as_deref().unwrap_or("-"),
        doc.name
    );
    if let Some(ref rev) = doc.revision {
        println!("    revision: {}", rev);
    }
    println!("    file: {}", doc.file_path);
}

pub async fn run_docs(config: &Config, filter: DocumentFilter) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let docs = store.list_documents(&filter).await?;
    store.close().await;

    if docs.is_empty() {
        println!("No documents.");
        return Ok(());
    }
    for doc in &docs {
        print_document_line(doc);
    }
    println!();
    println!("{} document(s)", docs.len());
    Ok(())
}

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let doc = match store.get_document(id).await? {
        Some(d) => d,
        None => {
            store.close().await;
            bail!("document not found: {}", id);
        }
    };
    let annotations = store.list_annotations(id).await?;
    store.close().await;

    println!("--- Document ---");
    println!("id:          {}", doc.id);
    println!("name:        {}", doc.name);
    println!("file_name:   {}", doc.file_name);
    println!("file_path:   {}", doc.file_path);
    println!("file_size:   {}", doc.file_size);
    println!("category:    {}", doc.category);
    println!(
        "subcategory: {}",
        doc.subcategory.as_deref().unwrap_or("-")
    );
    println!("revision:    {}", doc.revision.as_deref().unwrap_or("-"));
    if let Some(ref description) = doc.description {
        println!("description: {}", description);
    }
    println!("project_id:  {}", doc.project_id);
    println!("created_at:  {}", format_ts_iso(doc.created_at));
    println!("updated_at:  {}", format_ts_iso(doc.updated_at));
    if let Some(ref metadata) = doc.metadata {
        println!("metadata:    {}", metadata);
    }

    if let Some(ref text) = doc.extracted_text {
        println!();
        println!("--- Text ---");
        println!("{}", text);
    }

    println!();
    println!("--- Annotations ({}) ---", annotations.len());
    for a in &annotations {
        let author = a.author_name.as_deref().unwrap_or("anonymous");
        println!(
            "[p{} @ {:.1},{:.1} {}] {} ({})",
            a.page, a.x, a.y, a.color, a.content, author
        );
    }
    Ok(())
}

pub async fn run_edit(config: &Config, id: &str, update: DocumentUpdate) -> Result<()> {
    if update.is_empty() {
        bail!("nothing to update: pass --name, --description or --text");
    }
    let store = SqliteStore::open(config).await?;
    let updated = store.update_document(id, &update).await?;
    store.close().await;

    match updated {
        Some(doc) => {
            println!("updated {}", doc.id);
            print_document_line(&doc);
            Ok(())
        }
        None => bail!("document not found: {}", id),
    }
}

pub async fn run_rm(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = remove_document(&store, id).await;
    store.close().await;

    let doc = result?;
    println!("removed {} ({})", doc.id, doc.name);
    Ok(())
}

pub async fn run_annotate(
    config: &Config,
    document_id: &str,
    content: &str,
    opts: AnnotationOptions,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = annotate(&store, document_id, content, opts).await;
    store.close().await;

    let annotation = result?;
    println!("annotated {} ({})", annotation.document_id, annotation.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansheet_core::register::{register_document, Registration};
    use plansheet_core::store::memory::InMemoryStore;

    #[tokio::test]
    async fn test_annotate_defaults_and_overrides() {
        let store = InMemoryStore::new();
        let doc = register_document(&store, Registration::new("p", "A-1.pdf", "a", 1))
            .await
            .unwrap();

        let plain = annotate(&store, &doc.id, "verify grid line", AnnotationOptions::default())
            .await
            .unwrap();
        assert_eq!(plain.page, 1);
        assert_eq!(plain.color, "#FFEB3B");

        let placed = annotate(
            &store,
            &doc.id,
            "RFI 12",
            AnnotationOptions {
                page: Some(3),
                x: Some(12.5),
                color: Some("#FF0000".to_string()),
                author: Some("Site office".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(placed.page, 3);
        assert_eq!(placed.x, 12.5);
        assert_eq!(placed.y, 0.0);
        assert_eq!(placed.author_name.as_deref(), Some("Site office"));

        assert_eq!(store.list_annotations(&doc.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_annotate_rejects_bad_input() {
        let store = InMemoryStore::new();
        let doc = register_document(&store, Registration::new("p", "A-1.pdf", "a", 1))
            .await
            .unwrap();

        assert!(annotate(&store, "missing", "x", AnnotationOptions::default())
            .await
            .is_err());
        assert!(annotate(&store, &doc.id, "   ", AnnotationOptions::default())
            .await
            .is_err());
        let zero_page = AnnotationOptions {
            page: Some(0),
            ..Default::default()
        };
        assert!(annotate(&store, &doc.id, "x", zero_page).await.is_err());
    }
}
