use anyhow::{bail, Context, Result};
use globset::GlobBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use plansheet_core::search::{SearchParams, TieBreak};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_extract_text")]
    pub extract_text: bool,
    #[serde(default = "default_max_extract_bytes")]
    pub max_extract_bytes: u64,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            extract_text: default_extract_text(),
            max_extract_bytes: default_max_extract_bytes(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.pdf".to_string()]
}
fn default_extract_text() -> bool {
    true
}
fn default_max_extract_bytes() -> u64 {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_document_limit")]
    pub document_limit: i64,
    #[serde(default = "default_task_limit")]
    pub task_limit: i64,
    #[serde(default = "default_annotation_limit")]
    pub annotation_limit: i64,
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            document_limit: default_document_limit(),
            task_limit: default_task_limit(),
            annotation_limit: default_annotation_limit(),
            tie_break: TieBreak::default(),
        }
    }
}

fn default_document_limit() -> i64 {
    20
}
fn default_task_limit() -> i64 {
    10
}
fn default_annotation_limit() -> i64 {
    10
}

impl SearchConfig {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            document_limit: self.document_limit,
            task_limit: self.task_limit,
            annotation_limit: self.annotation_limit,
            tie_break: self.tie_break,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    #[serde(default = "default_list_limit")]
    pub list_limit: i64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

fn default_list_limit() -> i64 {
    50
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate search
    if config.search.document_limit < 1
        || config.search.task_limit < 1
        || config.search.annotation_limit < 1
    {
        bail!("search limits must be >= 1");
    }

    if config.notifications.list_limit < 1 {
        bail!("notifications.list_limit must be >= 1");
    }

    // Validate import globs
    if config.import.include_globs.is_empty() {
        bail!("import.include_globs must not be empty");
    }
    for pattern in config
        .import
        .include_globs
        .iter()
        .chain(config.import.exclude_globs.iter())
    {
        GlobBuilder::new(pattern)
            .build()
            .with_context(|| format!("invalid import glob: '{}'", pattern))?;
    }

    Ok(config)
}
