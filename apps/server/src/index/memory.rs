//! In-memory `DocumentIndex` implementation
//!
//! Executes searches in-process (useful for tests and single-node setups).
//! Sorting follows the same semantics as the Postgres backend: directives are
//! applied in priority order, comparisons are type-aware for JSON scalars,
//! and the sort is stable so equal keys keep insertion order.

use super::{value_at_path, DocumentIndex, StoredDocument};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use fathom_ordering::SortDirective;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::RwLock;

pub struct MemoryIndex {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
    next_seq: AtomicI64,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_seq: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn add(&self, collection: &str, document: JsonValue) -> Result<StoredDocument> {
        let stored = StoredDocument {
            seq: self.next_seq.fetch_add(1, AtomicOrdering::Relaxed),
            document,
            indexed_at: Utc::now(),
        };
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn search(
        &self,
        collection: &str,
        sort: &[SortDirective],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredDocument>> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut documents: Vec<StoredDocument> = collections
            .get(collection)
            .map(|docs| docs.to_vec())
            .unwrap_or_default();

        if !sort.is_empty() {
            // Stable sort: documents equal under every directive keep their
            // insertion order.
            documents.sort_by(|a, b| compare_documents(&a.document, &b.document, sort));
        }

        Ok(documents.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections.get(collection).map_or(0, |docs| docs.len()) as u64)
    }

    async fn clear(&self, collection: &str) -> Result<u64> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections.remove(collection).map_or(0, |docs| docs.len()) as u64)
    }
}

fn compare_documents(a: &JsonValue, b: &JsonValue, sort: &[SortDirective]) -> Ordering {
    for directive in sort {
        let left = value_at_path(a, &directive.field);
        let right = value_at_path(b, &directive.field);
        let ordering = compare_values(left, right);
        let ordering = if directive.direction.is_descending() {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Type-aware comparison of JSON scalar values.
///
/// Missing values and nulls sort first; across types the order is
/// null < bool < number < string, matching jsonb comparison in the Postgres
/// backend closely enough for homogeneous fields.
fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    fn rank(v: Option<&JsonValue>) -> u8 {
        match v {
            None | Some(JsonValue::Null) => 0,
            Some(JsonValue::Bool(_)) => 1,
            Some(JsonValue::Number(_)) => 2,
            Some(JsonValue::String(_)) => 3,
            Some(JsonValue::Array(_)) => 4,
            Some(JsonValue::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
