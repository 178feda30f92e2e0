//! `psh stats`: project dashboard.
//!
//! Totals, task completion, category counters, per-category file sizes,
//! recent activity and the next milestones, for one project or all of them.

use anyhow::Result;

use plansheet_core::models::{format_date, format_ts_iso};
use plansheet_core::stats::{dashboard, ActivityKind};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_stats(config: &Config, project_id: Option<&str>, json: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = dashboard(&store, project_id).await;
    store.close().await;
    let stats = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Plansheet Dashboard");
    println!("===================");
    println!();
    println!("  Documents:   {}", stats.total_documents);
    println!("  Tasks:       {}", stats.total_tasks);
    println!(
        "    completed {}  in progress {}  to do {}",
        stats.completed_tasks, stats.in_progress_tasks, stats.pending_tasks
    );
    println!("  Completion:  {}%", stats.task_completion_rate);

    if !stats.categories.is_empty() {
        println!();
        println!("  By category:");
        println!("  {:<24} {:>6} {:>10}   {}", "CATEGORY", "DOCS", "SIZE", "COLOR");
        println!("  {}", "-".repeat(52));
        for cat in &stats.categories {
            let size = stats
                .documents_by_category
                .iter()
                .find(|u| u.category == cat.name)
                .map(|u| u.total_size)
                .unwrap_or(0);
            println!(
                "  {:<24} {:>6} {:>10}   {}",
                cat.name,
                cat.count,
                format_bytes(size.max(0) as u64),
                cat.color
            );
        }
    }

    if !stats.recent_activity.is_empty() {
        println!();
        println!("  Recent activity:");
        for item in &stats.recent_activity {
            let marker = match item.kind {
                ActivityKind::DocumentAdded => "+",
                ActivityKind::TaskCompleted => "x",
            };
            println!(
                "  {} {:<16} {} ({})",
                marker,
                item.title,
                item.description,
                format_ts_relative(item.timestamp)
            );
        }
    }

    if !stats.milestones.is_empty() {
        println!();
        println!("  Milestones:");
        for m in &stats.milestones {
            let mark = if m.completed { "x" } else { " " };
            println!("  [{}] {} {}", mark, format_date(m.due_date), m.name);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;
    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_date(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_ts_relative() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_ts_relative(now), "just now");
        assert_eq!(format_ts_relative(now - 7200), "2 hours ago");
        assert_eq!(format_ts_relative(86_400), "1970-01-02");
    }
}
