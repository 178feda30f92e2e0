//! Keyword search across documents, tasks and annotations.
//!
//! The store supplies candidates with a broad substring filter; this module
//! scores them with [`crate::score`], merges the three kinds and ranks the
//! result.
//!
//! # Ranking
//!
//! 1. Fetch up to `document_limit` documents, `task_limit` tasks and
//!    `annotation_limit` annotations containing the query.
//! 2. Score: documents `score(name) + score(extracted_text)`, tasks
//!    `score(title)`, annotations `score(content)`.
//! 3. Concatenate documents, then tasks, then annotations.
//! 4. Stable sort by score descending. Ties keep concatenation order
//!    ([`TieBreak::Merge`]) or fall back to ascending id ([`TieBreak::Id`]).
//! 5. Record the query and per-kind counts in the search history.

use std::cmp::Ordering;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Document, SearchHistoryEntry, Task};
use crate::score::{score_fields, score_text};
use crate::store::{AnnotationCandidate, Store};

/// What a [`SearchHit`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Document,
    Task,
    Annotation,
}

impl HitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitKind::Document => "document",
            HitKind::Task => "task",
            HitKind::Annotation => "annotation",
        }
    }
}

/// One scored search candidate, alive only for the request that built it.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HitKind,
    pub title: String,
    pub snippet: String,
    pub score: f64,
    pub metadata: serde_json::Value,
}

/// Secondary order for hits with equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Keep merge order: documents, tasks, annotations, each in store order.
    #[default]
    Merge,
    /// Ascending id.
    Id,
}

impl FromStr for TieBreak {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(TieBreak::Merge),
            "id" => Ok(TieBreak::Id),
            other => bail!("Unknown tie break: '{}'. Use merge or id.", other),
        }
    }
}

/// Candidate limits and ranking policy, decoupled from application config.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub document_limit: i64,
    pub task_limit: i64,
    pub annotation_limit: i64,
    pub tie_break: TieBreak,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            document_limit: 20,
            task_limit: 10,
            annotation_limit: 10,
            tie_break: TieBreak::Merge,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    /// Only search records belonging to this project.
    pub project_id: Option<&'a str>,
    pub params: SearchParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<SearchHit>,
}

pub fn document_hit(doc: &Document, query: &str) -> SearchHit {
    let snippet = doc.description.clone().unwrap_or_else(|| {
        format!(
            "{} - {}",
            doc.category,
            doc.subcategory.as_deref().unwrap_or("General")
        )
    });
    SearchHit {
        id: doc.id.clone(),
        kind: HitKind::Document,
        title: doc.name.clone(),
        snippet,
        score: score_fields([Some(doc.name.as_str()), doc.extracted_text.as_deref()], query),
        metadata: serde_json::json!({
            "category": doc.category,
            "revision": doc.revision,
            "filePath": doc.file_path,
        }),
    }
}

pub fn task_hit(task: &Task, query: &str) -> SearchHit {
    let snippet = task.description.clone().unwrap_or_else(|| {
        format!("Status: {}, Priority: {}", task.status, task.priority)
    });
    SearchHit {
        id: task.id.clone(),
        kind: HitKind::Task,
        title: task.title.clone(),
        snippet,
        score: score_text(Some(&task.title), query),
        metadata: serde_json::json!({
            "status": task.status,
            "priority": task.priority,
        }),
    }
}

pub fn annotation_hit(candidate: &AnnotationCandidate, query: &str) -> SearchHit {
    let ann = &candidate.annotation;
    SearchHit {
        id: ann.id.clone(),
        kind: HitKind::Annotation,
        title: format!(
            "Annotation on {}",
            candidate.document_name.as_deref().unwrap_or("Document")
        ),
        snippet: ann.content.clone(),
        score: score_text(Some(&ann.content), query),
        metadata: serde_json::json!({
            "documentId": ann.document_id,
            "page": ann.page,
        }),
    }
}

/// Sort hits by descending score. The sort is stable, so with
/// [`TieBreak::Merge`] equal scores keep their incoming order.
pub fn rank(hits: &mut [SearchHit], tie_break: TieBreak) {
    hits.sort_by(|a, b| {
        let by_score = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
        match tie_break {
            TieBreak::Merge => by_score,
            TieBreak::Id => by_score.then_with(|| a.id.cmp(&b.id)),
        }
    });
}

/// Run a search against a [`Store`] and record it in the search history.
pub async fn search<S: Store + ?Sized>(
    store: &S,
    req: &SearchRequest<'_>,
) -> Result<SearchResponse> {
    if req.query.is_empty() {
        bail!("query must not be empty");
    }

    let documents = store
        .document_candidates(req.query, req.project_id, req.params.document_limit)
        .await?;
    let tasks = store
        .task_candidates(req.query, req.project_id, req.params.task_limit)
        .await?;
    let annotations = store
        .annotation_candidates(req.query, req.project_id, req.params.annotation_limit)
        .await?;

    tracing::debug!(
        query = req.query,
        documents = documents.len(),
        tasks = tasks.len(),
        annotations = annotations.len(),
        "search candidates fetched"
    );

    store
        .record_search(&SearchHistoryEntry::new(
            req.query,
            documents.len(),
            tasks.len(),
            annotations.len(),
        ))
        .await?;

    let mut results: Vec<SearchHit> = documents
        .iter()
        .map(|d| document_hit(d, req.query))
        .chain(tasks.iter().map(|t| task_hit(t, req.query)))
        .chain(annotations.iter().map(|a| annotation_hit(a, req.query)))
        .collect();

    rank(&mut results, req.params.tie_break);

    Ok(SearchResponse {
        query: req.query.to_string(),
        total: results.len(),
        results,
    })
}
