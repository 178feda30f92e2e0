//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Each table is a `Vec` kept in insertion order behind one
//! `std::sync::RwLock`. Substring filters use Unicode lowercase folding.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{
    now_ts, task_order, Annotation, CategoryCount, Document, DocumentFilter, DocumentUpdate,
    Milestone, Notification, Project, ProjectSummary, SearchHistoryEntry, Task, TaskFilter,
    TaskStatus,
};

use super::{AnnotationCandidate, Store};

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    documents: Vec<Document>,
    categories: Vec<CategoryCount>,
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    annotations: Vec<Annotation>,
    notifications: Vec<Notification>,
    searches: Vec<SearchHistoryEntry>,
}

/// In-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded searches.
    pub fn search_count(&self) -> usize {
        self.tables.read().map(|t| t.searches.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

fn contains_folded(field: Option<&str>, needle: &str) -> bool {
    field
        .map(|f| f.to_ascii_lowercase().contains(needle))
        .unwrap_or(false)
}

fn limit_to(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

/// Newest first; ties keep the later insertion first, as with a rowid sort.
fn newest_first<T>(items: &mut Vec<T>, created_at: impl Fn(&T) -> i64) {
    items.reverse();
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_project(&self, project: &Project) -> Result<()> {
        self.write()?.projects.push(project.clone());
        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.read()?.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let t = self.read()?;
        let mut projects = t.projects.clone();
        newest_first(&mut projects, |p| p.created_at);
        Ok(projects
            .into_iter()
            .map(|project| {
                let id = project.id.clone();
                ProjectSummary {
                    documents: t.documents.iter().filter(|d| d.project_id == id).count() as i64,
                    tasks: t.tasks.iter().filter(|x| x.project_id == id).count() as i64,
                    milestones: t.milestones.iter().filter(|m| m.project_id == id).count() as i64,
                    project,
                }
            })
            .collect())
    }

    async fn insert_document(&self, doc: &Document) -> Result<()> {
        self.write()?.documents.push(doc.clone());
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.read()?.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn find_document_by_file_name(
        &self,
        project_id: &str,
        file_name: &str,
    ) -> Result<Option<Document>> {
        Ok(self
            .read()?
            .documents
            .iter()
            .find(|d| d.project_id == project_id && d.file_name == file_name)
            .cloned())
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        let needle = filter.search.as_deref().map(str::to_ascii_lowercase);
        let mut docs: Vec<Document> = self
            .read()?
            .documents
            .iter()
            .filter(|d| filter.project_id.as_deref().map_or(true, |p| d.project_id == p))
            .filter(|d| filter.category.as_deref().map_or(true, |c| d.category == c))
            .filter(|d| {
                needle.as_deref().map_or(true, |n| {
                    contains_folded(Some(&d.name), n)
                        || contains_folded(Some(&d.file_name), n)
                        || contains_folded(d.extracted_text.as_deref(), n)
                })
            })
            .cloned()
            .collect();
        newest_first(&mut docs, |d| d.created_at);
        Ok(docs)
    }

    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<Option<Document>> {
        let mut t = self.write()?;
        let doc = match t.documents.iter_mut().find(|d| d.id == id) {
            Some(d) => d,
            None => return Ok(None),
        };
        if let Some(ref name) = update.name {
            doc.name = name.clone();
        }
        if let Some(ref description) = update.description {
            doc.description = Some(description.clone());
        }
        if let Some(ref text) = update.extracted_text {
            doc.extracted_text = Some(text.clone());
        }
        if let Some(ref metadata) = update.metadata {
            doc.metadata = Some(metadata.clone());
        }
        doc.updated_at = now_ts();
        Ok(Some(doc.clone()))
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let mut t = self.write()?;
        let before = t.documents.len();
        t.documents.retain(|d| d.id != id);
        if t.documents.len() == before {
            return Ok(false);
        }
        t.annotations.retain(|a| a.document_id != id);
        Ok(true)
    }

    async fn increment_category(&self, project_id: &str, name: &str, color: &str) -> Result<()> {
        let mut t = self.write()?;
        match t
            .categories
            .iter_mut()
            .find(|c| c.project_id == project_id && c.name == name)
        {
            Some(c) => c.count += 1,
            None => t.categories.push(CategoryCount {
                name: name.to_string(),
                project_id: project_id.to_string(),
                count: 1,
                color: color.to_string(),
            }),
        }
        Ok(())
    }

    async fn decrement_category(&self, project_id: &str, name: &str) -> Result<()> {
        let mut t = self.write()?;
        if let Some(c) = t
            .categories
            .iter_mut()
            .find(|c| c.project_id == project_id && c.name == name)
        {
            c.count -= 1;
        }
        Ok(())
    }

    async fn list_categories(&self, project_id: Option<&str>) -> Result<Vec<CategoryCount>> {
        let mut cats: Vec<CategoryCount> = self
            .read()?
            .categories
            .iter()
            .filter(|c| project_id.map_or(true, |p| c.project_id == p))
            .cloned()
            .collect();
        cats.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(cats)
    }

    async fn insert_task(&self, task: &Task) -> Result<()> {
        self.write()?.tasks.push(task.clone());
        Ok(())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .iter()
            .filter(|x| filter.project_id.as_deref().map_or(true, |p| x.project_id == p))
            .filter(|x| filter.status.map_or(true, |s| x.status == s))
            .cloned()
            .collect();
        tasks.sort_by(task_order);
        Ok(tasks)
    }

    async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<bool> {
        let mut t = self.write()?;
        match t.tasks.iter_mut().find(|x| x.id == id) {
            Some(task) => {
                task.status = status;
                task.updated_at = now_ts();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_milestone(&self, milestone: &Milestone) -> Result<()> {
        self.write()?.milestones.push(milestone.clone());
        Ok(())
    }

    async fn list_milestones(&self, project_id: Option<&str>) -> Result<Vec<Milestone>> {
        let mut milestones: Vec<Milestone> = self
            .read()?
            .milestones
            .iter()
            .filter(|m| project_id.map_or(true, |p| m.project_id == p))
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.due_date);
        Ok(milestones)
    }

    async fn complete_milestone(&self, id: &str) -> Result<bool> {
        let mut t = self.write()?;
        match t.milestones.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.completed = true;
                m.completed_at = Some(now_ts());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_annotation(&self, annotation: &Annotation) -> Result<()> {
        self.write()?.annotations.push(annotation.clone());
        Ok(())
    }

    async fn list_annotations(&self, document_id: &str) -> Result<Vec<Annotation>> {
        let mut anns: Vec<Annotation> = self
            .read()?
            .annotations
            .iter()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect();
        newest_first(&mut anns, |a| a.created_at);
        Ok(anns)
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        self.write()?.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(
        &self,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let mut notes: Vec<Notification> = self
            .read()?
            .notifications
            .iter()
            .filter(|n| !unread_only || !n.read)
            .cloned()
            .collect();
        newest_first(&mut notes, |n| n.created_at);
        notes.truncate(limit_to(limit));
        Ok(notes)
    }

    async fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let mut t = self.write()?;
        match t.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self) -> Result<u64> {
        let mut t = self.write()?;
        let mut changed = 0;
        for n in t.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn document_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Document>> {
        let needle = query.to_ascii_lowercase();
        Ok(self
            .read()?
            .documents
            .iter()
            .filter(|d| project_id.map_or(true, |p| d.project_id == p))
            .filter(|d| {
                [
                    Some(d.name.as_str()),
                    Some(d.file_name.as_str()),
                    d.description.as_deref(),
                    d.extracted_text.as_deref(),
                    Some(d.category.as_str()),
                    d.subcategory.as_deref(),
                ]
                .into_iter()
                .any(|f| contains_folded(f, &needle))
            })
            .take(limit_to(limit))
            .cloned()
            .collect())
    }

    async fn task_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Task>> {
        let needle = query.to_ascii_lowercase();
        Ok(self
            .read()?
            .tasks
            .iter()
            .filter(|x| project_id.map_or(true, |p| x.project_id == p))
            .filter(|x| {
                contains_folded(Some(&x.title), &needle)
                    || contains_folded(x.description.as_deref(), &needle)
            })
            .take(limit_to(limit))
            .cloned()
            .collect())
    }

    async fn annotation_candidates(
        &self,
        query: &str,
        project_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AnnotationCandidate>> {
        let needle = query.to_ascii_lowercase();
        let t = self.read()?;
        Ok(t.annotations
            .iter()
            .filter(|a| contains_folded(Some(&a.content), &needle))
            .filter_map(|a| {
                let doc = t.documents.iter().find(|d| d.id == a.document_id);
                if let Some(p) = project_id {
                    if doc.map_or(true, |d| d.project_id != p) {
                        return None;
                    }
                }
                Some(AnnotationCandidate {
                    annotation: a.clone(),
                    document_name: doc.map(|d| d.name.clone()),
                })
            })
            .take(limit_to(limit))
            .collect())
    }

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()> {
        self.write()?.searches.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn doc(project: &str, file_name: &str, created_at: i64) -> Document {
        Document {
            id: format!("doc-{}", file_name),
            name: file_name.to_string(),
            file_name: file_name.to_string(),
            file_path: format!("/plans/{}", file_name),
            file_size: 10,
            category: "Other".to_string(),
            subcategory: Some("General".to_string()),
            revision: None,
            description: None,
            extracted_text: None,
            metadata: None,
            project_id: project.to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_list_documents_newest_first_and_filtered() {
        let store = InMemoryStore::new();
        store.insert_document(&doc("p1", "old.pdf", 1)).await.unwrap();
        store.insert_document(&doc("p1", "new.pdf", 2)).await.unwrap();
        store.insert_document(&doc("p2", "other.pdf", 3)).await.unwrap();

        let filter = DocumentFilter {
            project_id: Some("p1".to_string()),
            ..Default::default()
        };
        let names: Vec<String> = store
            .list_documents(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.file_name)
            .collect();
        assert_eq!(names, vec!["new.pdf", "old.pdf"]);

        let filter = DocumentFilter {
            search: Some("OTHER".to_string()),
            ..Default::default()
        };
        assert_eq!(store.list_documents(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_category_counter() {
        let store = InMemoryStore::new();
        store.increment_category("p", "Civil", "#10B981").await.unwrap();
        store.increment_category("p", "Civil", "#10B981").await.unwrap();
        store.increment_category("p", "Architecture", "#3B82F6").await.unwrap();
        store.decrement_category("p", "Civil").await.unwrap();
        store.decrement_category("p", "Missing").await.unwrap();

        let cats = store.list_categories(Some("p")).await.unwrap();
        assert_eq!(cats.len(), 2);
        assert!(cats.iter().all(|c| c.count == 1));
        assert!(store.list_categories(Some("q")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_document_removes_annotations() {
        let store = InMemoryStore::new();
        let d = doc("p", "A-1.pdf", 1);
        store.insert_document(&d).await.unwrap();
        store
            .insert_annotation(&Annotation::new(&d.id, "check"))
            .await
            .unwrap();
        assert!(store.delete_document(&d.id).await.unwrap());
        assert!(!store.delete_document(&d.id).await.unwrap());
        assert!(store.list_annotations(&d.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifications_unread_and_mark_all() {
        let store = InMemoryStore::new();
        let a = Notification::new("a", "first", crate::models::NotificationKind::Info);
        let b = Notification::new("b", "second", crate::models::NotificationKind::Success);
        store.insert_notification(&a).await.unwrap();
        store.insert_notification(&b).await.unwrap();
        assert!(store.mark_notification_read(&a.id).await.unwrap());
        assert_eq!(store.list_notifications(true, 50).await.unwrap().len(), 1);
        assert_eq!(store.mark_all_notifications_read().await.unwrap(), 1);
        assert!(store.list_notifications(true, 50).await.unwrap().is_empty());
        assert_eq!(store.list_notifications(false, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tasks_ordered_and_status_update() {
        let store = InMemoryStore::new();
        let low = {
            let mut t = Task::new("p", "low");
            t.priority = Priority::Low;
            t
        };
        let high = {
            let mut t = Task::new("p", "high");
            t.priority = Priority::High;
            t
        };
        store.insert_task(&low).await.unwrap();
        store.insert_task(&high).await.unwrap();
        let titles: Vec<String> = store
            .list_tasks(&TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["high", "low"]);

        assert!(store.set_task_status(&low.id, TaskStatus::Completed).await.unwrap());
        let done = store
            .list_tasks(&TaskFilter {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert!(!store.set_task_status("nope", TaskStatus::Todo).await.unwrap());
    }

    #[tokio::test]
    async fn test_annotation_candidates_project_scope() {
        let store = InMemoryStore::new();
        let d1 = doc("p1", "A-1.pdf", 1);
        let d2 = doc("p2", "A-2.pdf", 1);
        store.insert_document(&d1).await.unwrap();
        store.insert_document(&d2).await.unwrap();
        store.insert_annotation(&Annotation::new(&d1.id, "Roof leak")).await.unwrap();
        store.insert_annotation(&Annotation::new(&d2.id, "roof drain")).await.unwrap();

        let all = store.annotation_candidates("roof", None, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        let scoped = store.annotation_candidates("roof", Some("p1"), 10).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].document_name.as_deref(), Some("A-1.pdf"));
    }

    #[tokio::test]
    async fn test_matching_folds_ascii_only() {
        let store = InMemoryStore::new();
        store
            .insert_task(&Task::new("p", "ÉLÉVATION NORD"))
            .await
            .unwrap();

        assert_eq!(store.task_candidates("nord", None, 10).await.unwrap().len(), 1);
        assert!(store
            .task_candidates("élévation", None, 10)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.task_candidates("ÉLÉVATION", None, 10).await.unwrap().len(), 1);
    }
}
