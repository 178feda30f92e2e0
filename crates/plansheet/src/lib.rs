//! # Plansheet
//!
//! **Document register, task board and keyword search for construction projects.**
//!
//! Drawing files are filed by discipline from their sheet numbers
//! (`A-101`, `EA-301`, `S1-…`), stored in SQLite with optional extracted
//! PDF text, and searched together with tasks and annotations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │   Import    │──▶│   Classify   │──▶│  SQLite   │
//! │ walk + PDF  │   │ + register   │   │  store    │
//! └─────────────┘   └──────────────┘   └────┬─────┘
//!                                           │
//!                                           ▼
//!                                     ┌──────────┐
//!                                     │   CLI    │
//!                                     │  (psh)   │
//!                                     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! psh init
//! psh project add "Harbour Museum"
//! psh import ./drawings --project <id>
//! psh search "lighting"
//! psh stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`schema`] | Idempotent table bootstrap |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`extract`] | PDF text extraction |
//! | [`import`] | Directory import and single-file registration |
//! | [`projects`] | `project add` / `project list` |
//! | [`documents`] | `docs`, `get`, `edit`, `rm`, `annotate` |
//! | [`tasks`] | Tasks and milestones |
//! | [`notifications`] | Notification listing and read state |
//! | [`search`] | Ranked keyword search output |
//! | [`stats`] | Dashboard output |
//! | [`classify`] | Dry-run classification of file names |
//!
//! Classification, scoring, ranking and the store trait live in
//! `plansheet-core`.

pub mod classify;
pub mod config;
pub mod db;
pub mod documents;
pub mod extract;
pub mod import;
pub mod notifications;
pub mod projects;
pub mod schema;
pub mod search;
pub mod sqlite_store;
pub mod stats;
pub mod tasks;

pub use plansheet_core::store;
