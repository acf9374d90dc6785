//! Fathom - document search service
//!
//! A small HTTP service that lists documents from named collections, with
//! client-controlled result ordering: `?ordering=title,-id` resolves each
//! token against the collection's declared sortable fields and applies the
//! matching directives as a multi-key sort. The index backend sits behind a
//! trait with Postgres and in-memory implementations.

pub mod api;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod state;

pub use error::{Error, Result};
