//! PostgreSQL product store.
//!
//! Text predicates use native `simple` text search:
//! `to_tsvector('simple', attrs->>'style') @@ plainto_tsquery('simple', $1)`.
//! The total matching-row count comes from `count(*) OVER()` in the same
//! statement, so it always describes exactly the filtered set that was paged.
//!
//! Only the ORDER BY clause is assembled dynamically, and only from the
//! constant column expressions of a validated [`SortOrder`]. Every
//! client-supplied value is bound as a parameter.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, trace};

use vault_core::{Error, ProductQuery, ProductStore, RawProductRow, Result, RowSink, SortOrder};

/// Style and mill predicates; `$1`/`$2` of an empty string match every row.
const MATCH_PREDICATE: &str = "(to_tsvector('simple', attrs->>'style') @@ plainto_tsquery('simple', $1) OR $1 = '')
      AND (to_tsvector('simple', attrs->>'mill') @@ plainto_tsquery('simple', $2) OR $2 = '')";

/// Product storage backed by the `products` table.
#[derive(Clone)]
pub struct PgProductStore {
    pool: Pool<Postgres>,
}

impl PgProductStore {
    /// Create a new PgProductStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn order_clause(sort: SortOrder) -> String {
    format!(
        "ORDER BY {} {}, id ASC",
        sort.field.column_expr(),
        sort.direction.as_sql()
    )
}

/// Build the search statement. Parameters: `$1` style, `$2` mill, `$3` limit,
/// `$4` offset.
pub(crate) fn build_search_sql(query: &ProductQuery<'_>) -> String {
    let order = order_clause(query.sort);

    if query.distinct_by_style {
        // One representative per style: the lowest id within each group.
        format!(
            r#"
            SELECT count(*) OVER() AS total_count, p.id, p.type, p.attrs::text AS attrs_json
            FROM (
                SELECT DISTINCT ON (attrs->>'style') id, type, attrs
                FROM products
                WHERE {}
                ORDER BY attrs->>'style', id ASC
            ) p
            {}
            LIMIT $3 OFFSET $4
            "#,
            MATCH_PREDICATE, order
        )
    } else {
        format!(
            r#"
            SELECT count(*) OVER() AS total_count, id, type, attrs::text AS attrs_json
            FROM products
            WHERE {}
            {}
            LIMIT $3 OFFSET $4
            "#,
            MATCH_PREDICATE, order
        )
    }
}

fn raw_row(row: &PgRow) -> Result<RawProductRow> {
    let attrs: String = row.try_get("attrs_json").map_err(Error::Database)?;
    Ok(RawProductRow {
        total_count: row.try_get("total_count").map_err(Error::Database)?,
        id: row.try_get("id").map_err(Error::Database)?,
        product_type: row.try_get("type").map_err(Error::Database)?,
        attrs: attrs.into_bytes(),
    })
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn scan_products(&self, query: &ProductQuery<'_>, sink: RowSink<'_>) -> Result<()> {
        let sql = build_search_sql(query);
        debug!(
            subsystem = "database",
            component = "products",
            op = "scan",
            sort = %query.sort.field,
            direction = query.sort.direction.as_sql(),
            distinct_by_style = query.distinct_by_style,
            "Executing product search"
        );

        // Dropping the stream on any early return releases the cursor.
        let mut rows = sqlx::query(&sql)
            .bind(query.style)
            .bind(query.mill)
            .bind(query.limit)
            .bind(query.offset)
            .fetch(&self.pool);

        while let Some(row) = rows.try_next().await.map_err(Error::Database)? {
            let raw = raw_row(&row)?;
            trace!(product_id = raw.id, "Product row fetched");
            sink(raw)?;
        }

        Ok(())
    }

    async fn insert_product(
        &self,
        id: Option<i64>,
        product_type: &str,
        attrs: &[u8],
    ) -> Result<i64> {
        let attrs = std::str::from_utf8(attrs)
            .map_err(|e| Error::Serialization(format!("attribute document is not UTF-8: {}", e)))?;

        let id: i64 = match id {
            Some(id) => sqlx::query_scalar(
                "INSERT INTO products (id, type, attrs) VALUES ($1, $2, $3::jsonb) RETURNING id",
            )
            .bind(id)
            .bind(product_type)
            .bind(attrs)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?,
            None => sqlx::query_scalar(
                "INSERT INTO products (type, attrs) VALUES ($1, $2::jsonb) RETURNING id",
            )
            .bind(product_type)
            .bind(attrs)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?,
        };

        Ok(id)
    }
}
