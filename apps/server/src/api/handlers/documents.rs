//! Collection document handlers
//!
//! Listing is where the `ordering` query-string contract lives: the raw
//! expression is resolved against the collection's declared allow-list and
//! the resulting directives are attached to the index query. Unrecognized
//! fields never fail the request; they simply contribute no directive.

use crate::{state::AppState, Error, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    /// Comma-separated field names, each optionally prefixed with `-` for
    /// descending order, e.g. `?ordering=title,-id`.
    pub ordering: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// List the documents of a collection, optionally ordered.
pub async fn list_documents(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(q): Query<ListDocumentsQuery>,
) -> Result<Response> {
    let declared = state
        .config
        .collection(&collection)
        .ok_or_else(|| Error::UnknownCollection(collection.clone()))?;

    let sort = match q.ordering.as_deref() {
        Some(raw) => {
            let fields = declared.ordering_fields();
            for token in fields.dropped_tokens(raw) {
                tracing::debug!(
                    collection = %collection,
                    ordering = raw,
                    field = token,
                    "Dropped ordering token naming no declared field"
                );
            }
            fields.resolve(raw)
        }
        None => Vec::new(),
    };

    let limit = q
        .limit
        .unwrap_or(state.config.search.default_limit)
        .clamp(1, state.config.search.max_limit);
    // Offsets beyond i64::MAX would wrap negative at the database bind site;
    // cap them here so an absurd page request stays a well-formed query.
    let offset = q.offset.unwrap_or(0).min(i64::MAX as usize);

    let results = state.index.search(&collection, &sort, limit, offset).await?;
    let total = state.index.count(&collection).await?;

    let results: Vec<JsonValue> = results.into_iter().map(|doc| doc.document).collect();

    Ok((
        StatusCode::OK,
        Json(json!({
            "count": total,
            "results": results,
        })),
    )
        .into_response())
}

/// Index one document into a collection.
pub async fn add_document(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(document): Json<JsonValue>,
) -> Result<Response> {
    if state.config.collection(&collection).is_none() {
        return Err(Error::UnknownCollection(collection));
    }

    let stored = state.index.add(&collection, document).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "seq": stored.seq,
            "indexedAt": stored.indexed_at,
            "document": stored.document,
        })),
    )
        .into_response())
}

/// Remove every document in a collection (explicit index rebuild hook).
pub async fn clear_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Response> {
    if state.config.collection(&collection).is_none() {
        return Err(Error::UnknownCollection(collection));
    }

    let removed = state.index.clear(&collection).await?;

    Ok((StatusCode::OK, Json(json!({ "removed": removed }))).into_response())
}
