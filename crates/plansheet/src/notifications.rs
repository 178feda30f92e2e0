//! `psh notify`: list, add and mark notifications read.

use anyhow::{bail, Result};

use plansheet_core::models::{format_ts_iso, Notification, NotificationKind};
use plansheet_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_notify_list(config: &Config, unread_only: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let notifications = store
        .list_notifications(unread_only, config.notifications.list_limit)
        .await?;
    store.close().await;

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }
    for n in &notifications {
        let mark = if n.read { " " } else { "*" };
        println!(
            "{} {} [{}] {}: {}",
            mark,
            format_ts_iso(n.created_at),
            n.kind,
            n.title,
            n.message
        );
        if let Some(ref link) = n.link {
            println!("    link: {}", link);
        }
        println!("    id: {}", n.id);
    }
    Ok(())
}

pub async fn run_notify_add(
    config: &Config,
    title: &str,
    message: &str,
    kind: Option<&str>,
    link: Option<String>,
) -> Result<()> {
    if title.trim().is_empty() {
        bail!("notification title must not be empty");
    }
    let kind = match kind {
        Some(k) => k.parse::<NotificationKind>()?,
        None => NotificationKind::Info,
    };
    let mut notification = Notification::new(title, message, kind);
    notification.link = link;

    let store = SqliteStore::open(config).await?;
    store.insert_notification(&notification).await?;
    store.close().await;

    println!("created notification {}", notification.id);
    Ok(())
}

pub async fn run_notify_read(config: &Config, id: Option<&str>, all: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let outcome = match (id, all) {
        (_, true) => store
            .mark_all_notifications_read()
            .await
            .map(|n| format!("marked {} notification(s) read", n)),
        (Some(id), false) => match store.mark_notification_read(id).await {
            Ok(true) => Ok(format!("marked {} read", id)),
            Ok(false) => Err(anyhow::anyhow!("notification not found: {}", id)),
            Err(e) => Err(e),
        },
        (None, false) => Err(anyhow::anyhow!("pass a notification id or --all")),
    };
    store.close().await;

    println!("{}", outcome?);
    Ok(())
}
