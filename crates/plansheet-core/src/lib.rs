//! # Plansheet Core
//!
//! Shared, I/O-free logic for Plansheet: drawing classification, revision
//! extraction, lexical scoring, search ranking, record models and the
//! store abstraction.
//!
//! This crate contains no tokio, sqlx or filesystem access. Every
//! operation that touches records receives its [`store::Store`]
//! explicitly; there is no global handle.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`classify`] | File name → `(category, subcategory)`, revision tokens |
//! | [`score`] | Lexical relevance of a text against a query |
//! | [`search`] | Candidate scoring, merge and ranking |
//! | [`register`] | Document registration and removal with category counters |
//! | [`stats`] | Dashboard aggregation |
//! | [`models`] | Record types |
//! | [`store`] | Storage trait and in-memory backend |

pub mod classify;
pub mod models;
pub mod register;
pub mod score;
pub mod search;
pub mod stats;
pub mod store;
