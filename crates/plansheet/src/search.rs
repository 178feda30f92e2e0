//! `psh search`: ranked keyword search over documents, tasks and annotations.

use anyhow::Result;

use plansheet_core::search::{search, SearchRequest};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_search(
    config: &Config,
    query: &str,
    project_id: Option<&str>,
    json: bool,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let request = SearchRequest {
        query,
        project_id,
        params: config.search.params(),
    };
    let result = search(&store, &request).await;
    store.close().await;
    let response = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in response.results.iter().enumerate() {
        println!(
            "{}. [{:.2}] {} / {}",
            i + 1,
            hit.score,
            hit.kind.as_str(),
            hit.title
        );
        println!("    excerpt: \"{}\"", hit.snippet.replace('\n', " ").trim());
        if let Some(path) = hit.metadata.get("filePath").and_then(|v| v.as_str()) {
            println!("    file: {}", path);
        }
        println!("    id: {}", hit.id);
        println!();
    }
    println!("{} result(s)", response.total);
    Ok(())
}
