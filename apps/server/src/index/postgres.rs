//! PostgreSQL-backed `DocumentIndex` implementation

use super::{DocumentIndex, StoredDocument};
use crate::Result;
use async_trait::async_trait;
use fathom_ordering::SortDirective;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgIndex {
    pool: PgPool,
}

impl PgIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentIndex for PgIndex {
    async fn add(&self, collection: &str, document: JsonValue) -> Result<StoredDocument> {
        let row = sqlx::query(
            "INSERT INTO documents (collection, document)
             VALUES ($1, $2)
             RETURNING seq, document, indexed_at",
        )
        .bind(collection)
        .bind(&document)
        .fetch_one(&self.pool)
        .await?;

        Ok(StoredDocument {
            seq: row.get("seq"),
            document: row.get("document"),
            indexed_at: row.get("indexed_at"),
        })
    }

    async fn search(
        &self,
        collection: &str,
        sort: &[SortDirective],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredDocument>> {
        // Note: sort-key paths are interpolated, but they come from validated
        // configuration, never from the client.
        let order_by = order_by_clause(sort);
        let sql = format!(
            "SELECT seq, document, indexed_at
             FROM documents
             WHERE collection = $1
             {order_by}
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| StoredDocument {
                seq: r.get("seq"),
                document: r.get("document"),
                indexed_at: r.get("indexed_at"),
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.get("total");
        Ok(total as u64)
    }

    async fn clear(&self, collection: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Build the ORDER BY clause for a sort specification.
///
/// Each dotted sort-key path becomes a jsonb path extraction
/// (`document #> '{author,name}'`), so numbers compare numerically and
/// strings lexicographically. A trailing `seq ASC` keeps equal keys in
/// insertion order and pagination deterministic. With no directives the
/// default ordering is plain insertion order.
fn order_by_clause(sort: &[SortDirective]) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|directive| {
            let path = directive.field.split('.').collect::<Vec<_>>().join(",");
            format!("document #> '{{{path}}}' {}", directive.direction.as_sql())
        })
        .collect();
    keys.push("seq ASC".to_string());
    format!("ORDER BY {}", keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_ordering::OrderingFields;

    #[test]
    fn empty_sort_orders_by_insertion() {
        assert_eq!(order_by_clause(&[]), "ORDER BY seq ASC");
    }

    #[test]
    fn directives_become_jsonb_extractions_in_priority_order() {
        let fields = OrderingFields::new().field("title").field("id");
        let sort = fields.resolve("title,-id");
        assert_eq!(
            order_by_clause(&sort),
            "ORDER BY document #> '{title}' ASC, document #> '{id}' DESC, seq ASC"
        );
    }

    #[test]
    fn dotted_sort_keys_become_jsonb_paths() {
        let fields = OrderingFields::new().mapped_field("author", "author.name");
        let sort = fields.resolve("-author");
        assert_eq!(
            order_by_clause(&sort),
            "ORDER BY document #> '{author,name}' DESC, seq ASC"
        );
    }
}
