//! Document index backends
//!
//! The search backend is an external collaborator behind the
//! [`DocumentIndex`] trait: the HTTP layer builds a sort specification and
//! hands it over; the backend owns execution. Two implementations exist, a
//! Postgres-backed index for deployments and an in-memory index for tests and
//! single-process setups.

mod memory;
mod postgres;

pub use memory::MemoryIndex;
pub use postgres::PgIndex;

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fathom_ordering::SortDirective;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A document as stored by an index backend.
///
/// `seq` is assigned by the backend in insertion order and serves as the
/// stable tie-breaker for equal sort keys.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub seq: i64,
    pub document: JsonValue,
    pub indexed_at: DateTime<Utc>,
}

#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Store one document in a collection.
    async fn add(&self, collection: &str, document: JsonValue) -> Result<StoredDocument>;

    /// Fetch a page of documents, ordered by the given sort directives in
    /// priority order. An empty `sort` returns documents in insertion order
    /// (the index's default ordering).
    async fn search(
        &self,
        collection: &str,
        sort: &[SortDirective],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredDocument>>;

    /// Total number of documents in a collection.
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Remove every document in a collection, returning the number removed.
    /// This is the explicit rebuild/teardown hook; there is no ambient reset.
    async fn clear(&self, collection: &str) -> Result<u64>;
}

/// Look up a dotted sort-key path (`author.name`) in a JSON document.
pub(crate) fn value_at_path<'a>(document: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}
