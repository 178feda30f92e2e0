//! Document registration and removal.
//!
//! Registration classifies the file name, extracts the revision token,
//! derives the display name, stores the record and bumps the per-category
//! counter. Removal deletes the record, then decrements the counter.

use anyhow::{bail, Result};

use crate::classify::{category_color, classify, display_name, extract_revision, GENERAL};
use crate::models::{new_id, now_ts, Document, Project};
use crate::store::Store;

/// Inputs for [`register_document`].
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub project_id: &'a str,
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub file_size: i64,
    pub extracted_text: Option<String>,
    pub metadata: Option<String>,
    /// Category to use when the classifier falls back to `Other`, e.g. the
    /// name of the directory the file was imported from.
    pub category_hint: Option<&'a str>,
}

impl<'a> Registration<'a> {
    pub fn new(project_id: &'a str, file_name: &'a str, file_path: &'a str, file_size: i64) -> Self {
        Self {
            project_id,
            file_name,
            file_path,
            file_size,
            extracted_text: None,
            metadata: None,
            category_hint: None,
        }
    }
}

/// Fetch a project or fail with `project not found`.
pub async fn require_project<S: Store + ?Sized>(store: &S, id: &str) -> Result<Project> {
    match store.get_project(id).await? {
        Some(p) => Ok(p),
        None => bail!("project not found: {}", id),
    }
}

/// Classify and store a document, then increment its category counter.
pub async fn register_document<S: Store + ?Sized>(
    store: &S,
    reg: Registration<'_>,
) -> Result<Document> {
    let classification = classify(reg.file_name);
    let category = match reg.category_hint {
        Some(hint) if classification.is_other() && !hint.is_empty() => hint.to_string(),
        _ => classification.category,
    };

    let now = now_ts();
    let doc = Document {
        id: new_id(),
        name: display_name(reg.file_name),
        file_name: reg.file_name.to_string(),
        file_path: reg.file_path.to_string(),
        file_size: reg.file_size,
        category,
        subcategory: Some(classification.subcategory),
        revision: extract_revision(reg.file_name),
        description: None,
        extracted_text: reg.extracted_text,
        metadata: reg.metadata,
        project_id: reg.project_id.to_string(),
        created_at: now,
        updated_at: now,
    };

    store.insert_document(&doc).await?;
    store
        .increment_category(&doc.project_id, &doc.category, category_color(&doc.category))
        .await?;

    tracing::debug!(
        file = %doc.file_name,
        category = %doc.category,
        subcategory = doc.subcategory.as_deref().unwrap_or(GENERAL),
        "registered document"
    );

    Ok(doc)
}

/// Delete a document and decrement its category counter.
pub async fn remove_document<S: Store + ?Sized>(store: &S, id: &str) -> Result<Document> {
    let doc = match store.get_document(id).await? {
        Some(d) => d,
        None => bail!("document not found: {}", id),
    };
    if !store.delete_document(id).await? {
        bail!("document not found: {}", id);
    }
    store.decrement_category(&doc.project_id, &doc.category).await?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[tokio::test]
    async fn test_register_classifies_and_counts() {
        let store = InMemoryStore::new();
        let doc = register_document(
            &store,
            Registration::new("p", "A-101-FLOOR-PLAN-Rev.3.pdf", "/plans/a.pdf", 2048),
        )
        .await
        .unwrap();

        assert_eq!(doc.name, "A 101 FLOOR PLAN Rev.3");
        assert_eq!(doc.category, "Architecture");
        assert_eq!(doc.subcategory.as_deref(), Some("Floor Plans"));
        assert_eq!(doc.revision.as_deref(), Some("3"));

        let cats = store.list_categories(Some("p")).await.unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Architecture");
        assert_eq!(cats[0].count, 1);
        assert_eq!(cats[0].color, "#3B82F6");
    }

    #[tokio::test]
    async fn test_category_hint_only_for_other() {
        let store = InMemoryStore::new();
        let mut reg = Registration::new("p", "cover-sheet.pdf", "/x/cover-sheet.pdf", 1);
        reg.category_hint = Some("Scenography");
        let hinted = register_document(&store, reg).await.unwrap();
        assert_eq!(hinted.category, "Scenography");
        assert_eq!(hinted.subcategory.as_deref(), Some("General"));

        let mut reg = Registration::new("p", "C-200-SITE.pdf", "/x/C-200-SITE.pdf", 1);
        reg.category_hint = Some("Scenography");
        let classified = register_document(&store, reg).await.unwrap();
        assert_eq!(classified.category, "Civil");

        let cats = store.list_categories(Some("p")).await.unwrap();
        let sceno = cats.iter().find(|c| c.name == "Scenography").unwrap();
        assert_eq!(sceno.color, "#06B6D4");
    }

    #[tokio::test]
    async fn test_remove_decrements_counter() {
        let store = InMemoryStore::new();
        let a = register_document(&store, Registration::new("p", "C-1-SITE.pdf", "/a", 1))
            .await
            .unwrap();
        register_document(&store, Registration::new("p", "C-2-GRADING.pdf", "/b", 1))
            .await
            .unwrap();

        remove_document(&store, &a.id).await.unwrap();
        let cats = store.list_categories(Some("p")).await.unwrap();
        assert_eq!(cats[0].count, 1);
        assert!(store.get_document(&a.id).await.unwrap().is_none());

        let err = remove_document(&store, &a.id).await.unwrap_err();
        assert!(err.to_string().contains("document not found"));
    }

    #[tokio::test]
    async fn test_require_project() {
        let store = InMemoryStore::new();
        let p = Project::new("Theatre");
        store.insert_project(&p).await.unwrap();
        assert_eq!(require_project(&store, &p.id).await.unwrap().name, "Theatre");
        assert!(require_project(&store, "missing").await.is_err());
    }
}
