//! Ordering-parameter resolution for search endpoints.
//!
//! Clients order list results with a comma-separated `ordering` query-string
//! parameter (`?ordering=title,-id`), each token optionally prefixed with `-`
//! for descending order. A collection declares which fields may be sorted on
//! via an [`OrderingFields`] allow-list, mapping each public field name to the
//! sort-key path the backing index actually sorts by (the exposed name may
//! differ from the index's sort key, e.g. a keyword sub-field of a text
//! field).
//!
//! Resolution is deliberately permissive: tokens that name an undeclared
//! field are dropped without an error, so an ordering expression can never
//! fail a request. An expression that resolves to no directives leaves the
//! query's default ordering in effect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of a single sort directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Asc
    }
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

/// One resolved ordering directive: a backend sort-key path plus a direction.
///
/// `field` holds the *resolved* sort key from the allow-list, not the public
/// name the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub field: String,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// The declared set of sortable fields for a collection.
///
/// An ordered map from public field name to the sort-key path the index sorts
/// by. Built from configuration at startup and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingFields {
    fields: BTreeMap<String, String>,
}

impl OrderingFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a sortable field whose sort key equals its public name.
    pub fn field(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let key = name.clone();
        self.mapped_field(name, key)
    }

    /// Declare a sortable field whose index sort key differs from the public
    /// name (e.g. `author` sorting by `author.name`).
    pub fn mapped_field(mut self, name: impl Into<String>, sort_key: impl Into<String>) -> Self {
        self.fields.insert(name.into(), sort_key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Sort-key path declared for a public field name, if any.
    pub fn sort_key(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Iterate over `(public name, sort key)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, k)| (n.as_str(), k.as_str()))
    }

    /// Resolve a raw comma-separated ordering expression into sort directives.
    ///
    /// Tokens are taken in the order given (primary key first, later tokens
    /// as tie-breakers). A leading `-` marks descending order. Tokens that
    /// are empty after trimming, or that name an undeclared field, are
    /// dropped without error. An empty result means the caller should leave
    /// the query's existing ordering unchanged.
    ///
    /// Resolution is pure and idempotent: the same expression against the
    /// same declared fields always yields the same directives.
    pub fn resolve(&self, raw: &str) -> Vec<SortDirective> {
        self.tokens(raw)
            .filter_map(|(name, direction)| {
                self.sort_key(name).map(|key| SortDirective {
                    field: key.to_string(),
                    direction,
                })
            })
            .collect()
    }

    /// The bare field names in a raw expression that name no declared field
    /// and would therefore be dropped by [`resolve`](Self::resolve).
    ///
    /// Resolution itself stays silent about these; callers that want to log
    /// or report near-miss tokens use this to enumerate them.
    pub fn dropped_tokens<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        self.tokens(raw)
            .filter(|(name, _)| self.sort_key(name).is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// Non-empty `(bare name, direction)` pairs of a raw expression, in
    /// token order.
    fn tokens<'a>(&self, raw: &'a str) -> impl Iterator<Item = (&'a str, SortDirection)> + 'a {
        raw.split(',').filter_map(|token| {
            let token = token.trim();
            let (direction, name) = match token.strip_prefix('-') {
                Some(bare) => (SortDirection::Desc, bare),
                None => (SortDirection::Asc, token),
            };
            if name.is_empty() {
                None
            } else {
                Some((name, direction))
            }
        })
    }
}

impl FromIterator<(String, String)> for OrderingFields {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for OrderingFields {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(n, k)| (n.to_string(), k.to_string()))
                .collect(),
        }
    }
}
