//! Dashboard aggregation.
//!
//! Everything here is derived from [`Store`] listings; nothing is cached.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::models::{
    CategoryCount, DocumentFilter, Milestone, TaskFilter, TaskStatus,
};
use crate::store::Store;

const RECENT_DOCUMENTS: usize = 5;
const RECENT_TASKS: usize = 5;
const RECENT_ACTIVITY: usize = 10;
const UPCOMING_MILESTONES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    DocumentAdded,
    TaskCompleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: i64,
}

/// Document count and total file size for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryUsage {
    pub category: String,
    pub count: i64,
    pub total_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_documents: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    /// Tasks still in `todo`.
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    /// Rounded percentage of completed tasks, `0` when there are none.
    pub task_completion_rate: i64,
    pub categories: Vec<CategoryCount>,
    pub documents_by_category: Vec<CategoryUsage>,
    pub recent_activity: Vec<ActivityItem>,
    pub milestones: Vec<Milestone>,
}

pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total > 0 {
        (completed as f64 * 100.0 / total as f64).round() as i64
    } else {
        0
    }
}

/// Aggregate the dashboard for one project, or for everything.
pub async fn dashboard<S: Store + ?Sized>(
    store: &S,
    project_id: Option<&str>,
) -> Result<DashboardStats> {
    let documents = store
        .list_documents(&DocumentFilter {
            project_id: project_id.map(str::to_string),
            ..Default::default()
        })
        .await?;
    let mut tasks = store
        .list_tasks(&TaskFilter {
            project_id: project_id.map(str::to_string),
            ..Default::default()
        })
        .await?;
    let categories = store.list_categories(project_id).await?;
    let mut milestones = store.list_milestones(project_id).await?;

    let count_status = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count() as i64;
    let total_tasks = tasks.len() as i64;
    let completed_tasks = count_status(TaskStatus::Completed);
    let pending_tasks = count_status(TaskStatus::Todo);
    let in_progress_tasks = count_status(TaskStatus::InProgress);

    let mut usage: BTreeMap<&str, CategoryUsage> = BTreeMap::new();
    for doc in &documents {
        let entry = usage
            .entry(doc.category.as_str())
            .or_insert_with(|| CategoryUsage {
                category: doc.category.clone(),
                count: 0,
                total_size: 0,
            });
        entry.count += 1;
        entry.total_size += doc.file_size;
    }
    let documents_by_category: Vec<CategoryUsage> = usage.into_values().collect();

    // Documents are listed newest first already.
    let mut recent_activity: Vec<ActivityItem> = documents
        .iter()
        .take(RECENT_DOCUMENTS)
        .map(|d| ActivityItem {
            id: d.id.clone(),
            kind: ActivityKind::DocumentAdded,
            title: "Document Added".to_string(),
            description: d.name.clone(),
            timestamp: d.created_at,
        })
        .collect();

    tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent_activity.extend(
        tasks
            .iter()
            .take(RECENT_TASKS)
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| ActivityItem {
                id: t.id.clone(),
                kind: ActivityKind::TaskCompleted,
                title: "Task Completed".to_string(),
                description: t.title.clone(),
                timestamp: t.updated_at,
            }),
    );
    recent_activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent_activity.truncate(RECENT_ACTIVITY);

    milestones.truncate(UPCOMING_MILESTONES);

    Ok(DashboardStats {
        total_documents: documents.len() as i64,
        total_tasks,
        completed_tasks,
        pending_tasks,
        in_progress_tasks,
        task_completion_rate: completion_rate(completed_tasks, total_tasks),
        categories,
        documents_by_category,
        recent_activity,
        milestones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Milestone, Task};
    use crate::register::{register_document, Registration};
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 2), 50);
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let store = InMemoryStore::new();
        for (name, size) in [("A-1-ROOF.pdf", 100), ("A-2-STAIR.pdf", 50), ("C-1-SITE.pdf", 10)] {
            register_document(&store, Registration::new("p", name, name, size))
                .await
                .unwrap();
        }
        let mut done = Task::new("p", "Issue permit set");
        done.status = TaskStatus::Completed;
        let mut doing = Task::new("p", "Coordinate ducts");
        doing.status = TaskStatus::InProgress;
        store.insert_task(&done).await.unwrap();
        store.insert_task(&doing).await.unwrap();
        store.insert_task(&Task::new("p", "Order steel")).await.unwrap();
        store.insert_task(&Task::new("other", "Elsewhere")).await.unwrap();
        for day in (1..=7).rev() {
            store
                .insert_milestone(&Milestone::new("p", &format!("M{}", day), day * 86_400))
                .await
                .unwrap();
        }

        let stats = dashboard(&store, Some("p")).await.unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.task_completion_rate, 33);

        assert_eq!(stats.categories[0].name, "Architecture");
        assert_eq!(stats.categories[0].count, 2);
        assert_eq!(
            stats.documents_by_category[0],
            CategoryUsage {
                category: "Architecture".to_string(),
                count: 2,
                total_size: 150
            }
        );

        assert_eq!(stats.milestones.len(), 5);
        assert_eq!(stats.milestones[0].name, "M1");

        let completed: Vec<&ActivityItem> = stats
            .recent_activity
            .iter()
            .filter(|a| a.kind == ActivityKind::TaskCompleted)
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(stats.recent_activity.len(), 4);
    }

    #[tokio::test]
    async fn test_dashboard_empty() {
        let store = InMemoryStore::new();
        let stats = dashboard(&store, None).await.unwrap();
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.task_completion_rate, 0);
        assert!(stats.recent_activity.is_empty());
    }
}
