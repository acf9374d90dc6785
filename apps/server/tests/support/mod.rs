//! Shared test harness
//!
//! Builds the full router over an in-memory index so tests exercise the real
//! HTTP surface without external services. Seeding and clearing go through
//! the same `DocumentIndex` handle the handlers use; there is no global
//! fixture state.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fathom::{
    api::create_router,
    config::Config,
    state::{AppState, AppStateOptions, IndexBackendKind},
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> anyhow::Result<Self> {
        let config = test_config()?;
        let state = AppState::new_with_options(
            config,
            AppStateOptions {
                backend: IndexBackendKind::Memory,
                run_migrations: false,
            },
        )
        .await?;
        let router = create_router(state.clone());
        Ok(Self { router, state })
    }

    /// Issue one request against the router and return status plus parsed
    /// JSON body (or `Null` for empty bodies).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> anyhow::Result<(StatusCode, JsonValue)> {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value)?)
            }
            None => Body::empty(),
        };
        let response = self.router.clone().oneshot(builder.body(body)?).await?;

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, JsonValue)> {
        self.request(Method::GET, path, None).await
    }
}

/// Default test configuration: a single `books` collection sortable by
/// `id`, `title`, `year`, and `author` (the latter via the nested
/// `author.name` sort key), backed by the in-memory index.
fn test_config() -> anyhow::Result<Config> {
    let config: Config = serde_json::from_value(json!({
        "search": { "backend": "memory" },
        "collections": [
            {
                "name": "books",
                "ordering_fields": {
                    "id": "id",
                    "title": "title",
                    "year": "year",
                    "author": "author.name"
                }
            }
        ]
    }))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid test config: {e}"))?;
    Ok(config)
}

const TITLES: [&str; 20] = [
    "Midnight Ledger",
    "A Field Guide to Salt",
    "The Glass Harbour",
    "Winter Counting",
    "Ninety Days North",
    "Ash and Aperture",
    "The Quiet Auction",
    "Paper Lanterns",
    "Every Closed Door",
    "Signal Fires",
    "The Borrowed Coast",
    "Ultramarine",
    "Hollow Kingdom Road",
    "Cartographer's Debt",
    "The Last Ferry Out",
    "Orchard of Wires",
    "Driftwood Arithmetic",
    "Vanishing Tables",
    "Zero Moon Rising",
    "Kelp and Kerosene",
];

const AUTHORS: [&str; 5] = ["Ibarra", "Okafor", "Lindqvist", "Tanaka", "Moreau"];

/// Index `n` books with distinct titles (up to 20), sequential ids, and a
/// small set of repeating years so multi-key ordering has ties to break.
pub async fn seed_books(app: &TestApp, n: usize) -> anyhow::Result<()> {
    assert!(n <= TITLES.len(), "only {} distinct titles", TITLES.len());
    for i in 1..=n {
        let book = json!({
            "id": i,
            "title": TITLES[i - 1],
            "year": 1990 + (i % 4) as i64,
            "author": { "name": AUTHORS[i % AUTHORS.len()] },
        });
        let (status, _) = app
            .request(Method::POST, "/collections/books/documents", Some(book))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "seeding book {i}");
    }
    Ok(())
}

pub fn results(body: &JsonValue) -> &Vec<JsonValue> {
    body["results"].as_array().expect("results array")
}

pub fn field_values<'a>(body: &'a JsonValue, field: &str) -> Vec<&'a JsonValue> {
    results(body).iter().map(|doc| &doc[field]).collect()
}

pub fn ids(body: &JsonValue) -> Vec<i64> {
    results(body)
        .iter()
        .map(|doc| doc["id"].as_i64().expect("numeric id"))
        .collect()
}

pub fn titles(body: &JsonValue) -> Vec<String> {
    results(body)
        .iter()
        .map(|doc| doc["title"].as_str().expect("string title").to_string())
        .collect()
}

/// Assert every adjacent pair satisfies `ordered(prev, next)`.
pub fn assert_adjacent_pairs<T: std::fmt::Debug>(
    values: &[T],
    ordered: impl Fn(&T, &T) -> bool,
    context: &str,
) {
    for window in values.windows(2) {
        assert!(
            ordered(&window[0], &window[1]),
            "{context}: {:?} should precede {:?}",
            window[0],
            window[1]
        );
    }
}
