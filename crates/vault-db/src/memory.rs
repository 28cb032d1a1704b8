//! In-process product store.
//!
//! Implements the same contract as [`crate::PgProductStore`] without a
//! database: simple-mode text matching via [`vault_core::simple_match`],
//! `attrs->>'field'` ordering with PostgreSQL null placement (nulls last when
//! ascending, first when descending), an `id ASC` tie-break, and a windowed
//! count over the filtered set. Assigned ids follow a `BIGSERIAL`-style
//! sequence that explicit ids never advance, so a later assigned id can
//! collide with one and fail like a unique violation.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use vault_core::{
    simple_match, Error, ProductQuery, ProductStore, RawProductRow, Result, RowSink,
    SortDirection, SortField, SortOrder,
};

#[derive(Debug, Clone)]
struct StoredProduct {
    id: i64,
    product_type: String,
    raw: Vec<u8>,
    doc: JsonValue,
}

impl StoredProduct {
    /// Equivalent of `attrs->>'key'`: strings as-is, null/missing as `None`,
    /// other scalars and containers rendered as JSON text.
    fn text_field(&self, key: &str) -> Option<String> {
        match self.doc.get(key) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    fn sort_value(&self, field: SortField) -> SortValue {
        match field {
            SortField::Id => SortValue::Int(self.id),
            other => SortValue::Text(self.text_field(other.key())),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SortValue {
    Int(i64),
    Text(Option<String>),
}

/// Ascending comparison with NULL sorting after every value.
fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
        (SortValue::Text(a), SortValue::Text(b)) => match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        },
        // Every row yields the same variant for a given field.
        _ => Ordering::Equal,
    }
}

fn compare_products(a: &StoredProduct, b: &StoredProduct, sort: SortOrder) -> Ordering {
    let primary = compare_values(&a.sort_value(sort.field), &b.sort_value(sort.field));
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<StoredProduct>,
    next_id: i64,
}

/// Product storage held in memory.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    state: RwLock<State>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn evaluate(rows: &[StoredProduct], query: &ProductQuery<'_>) -> Vec<StoredProduct> {
    let mut matched: Vec<&StoredProduct> = rows
        .iter()
        .filter(|p| simple_match(&p.text_field("style").unwrap_or_default(), query.style))
        .filter(|p| simple_match(&p.text_field("mill").unwrap_or_default(), query.mill))
        .collect();

    if query.distinct_by_style {
        // Keep the lowest id per style value; NULL styles form one group.
        matched.sort_by(|a, b| {
            compare_values(
                &SortValue::Text(a.text_field("style")),
                &SortValue::Text(b.text_field("style")),
            )
            .then_with(|| a.id.cmp(&b.id))
        });
        matched.dedup_by(|later, earlier| {
            later.text_field("style") == earlier.text_field("style")
        });
    }

    matched.sort_by(|a, b| compare_products(a, b, query.sort));
    matched.into_iter().cloned().collect()
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn scan_products(&self, query: &ProductQuery<'_>, sink: RowSink<'_>) -> Result<()> {
        let matched = {
            let state = self.state.read().await;
            evaluate(&state.rows, query)
        };

        let total_count = matched.len() as i64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(0);

        for product in matched.into_iter().skip(offset).take(limit) {
            sink(RawProductRow {
                total_count,
                id: product.id,
                product_type: product.product_type,
                attrs: product.raw,
            })?;
        }

        Ok(())
    }

    async fn insert_product(
        &self,
        id: Option<i64>,
        product_type: &str,
        attrs: &[u8],
    ) -> Result<i64> {
        let doc: JsonValue = serde_json::from_slice(attrs)
            .map_err(|e| Error::Storage(format!("invalid attribute document: {}", e)))?;

        let mut state = self.state.write().await;
        let id = match id {
            Some(id) => {
                if state.rows.iter().any(|p| p.id == id) {
                    return Err(Error::Storage(format!(
                        "duplicate key value violates unique constraint: id={}",
                        id
                    )));
                }
                id
            }
            None => {
                // The sequence value is consumed even when the insert fails.
                state.next_id += 1;
                let next = state.next_id;
                if state.rows.iter().any(|p| p.id == next) {
                    return Err(Error::Storage(format!(
                        "duplicate key value violates unique constraint: id={}",
                        next
                    )));
                }
                next
            }
        };

        state.rows.push(StoredProduct {
            id,
            product_type: product_type.to_string(),
            raw: attrs.to_vec(),
            doc,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::Filters;

    async fn store_with(docs: &[serde_json::Value]) -> MemoryProductStore {
        let store = MemoryProductStore::new();
        for doc in docs {
            let bytes = serde_json::to_vec(doc).unwrap();
            store.insert_product(None, "test", &bytes).await.unwrap();
        }
        store
    }

    async fn scan_ids(store: &MemoryProductStore, query: &ProductQuery<'_>) -> (Vec<i64>, i64) {
        let mut ids = Vec::new();
        let mut total = 0;
        let mut sink = |row: RawProductRow| -> Result<()> {
            total = row.total_count;
            ids.push(row.id);
            Ok(())
        };
        store.scan_products(query, &mut sink).await.unwrap();
        (ids, total)
    }

    #[tokio::test]
    async fn test_assigns_sequential_ids() {
        let store = MemoryProductStore::new();
        assert_eq!(store.insert_product(None, "t", b"{}").await.unwrap(), 1);
        assert_eq!(store.insert_product(None, "t", b"{}").await.unwrap(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_sequence_collides_with_explicit_id() {
        let store = MemoryProductStore::new();
        assert_eq!(store.insert_product(Some(2), "t", b"{}").await.unwrap(), 2);
        assert_eq!(store.insert_product(None, "t", b"{}").await.unwrap(), 1);

        let err = store.insert_product(None, "t", b"{}").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        // The failed attempt consumed 2; the next value is free.
        assert_eq!(store.insert_product(None, "t", b"{}").await.unwrap(), 3);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryProductStore::new();
        store.insert_product(Some(5), "t", b"{}").await.unwrap();
        let err = store.insert_product(Some(5), "t", b"{}").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let store = MemoryProductStore::new();
        assert!(store.insert_product(None, "t", b"not json").await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_nulls_last_ascending_first_descending() {
        let store = store_with(&[
            serde_json::json!({"map_pricing": "20.00"}),
            serde_json::json!({"map_pricing": null}),
            serde_json::json!({"map_pricing": "10.00"}),
        ])
        .await;

        let asc = Filters::new(1, 20, "map_pricing").validate().unwrap();
        let (ids, _) = scan_ids(&store, &ProductQuery::new("", "", &asc)).await;
        assert_eq!(ids, vec![3, 1, 2]);

        let desc = Filters::new(1, 20, "-map_pricing").validate().unwrap();
        let (ids, _) = scan_ids(&store, &ProductQuery::new("", "", &desc)).await;
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_count_ignores_paging() {
        let docs: Vec<_> = (0..5)
            .map(|i| serde_json::json!({"style": format!("S{}", i)}))
            .collect();
        let store = store_with(&docs).await;

        let validated = Filters::new(2, 2, "id").validate().unwrap();
        let (ids, total) = scan_ids(&store, &ProductQuery::new("", "", &validated)).await;
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_distinct_keeps_lowest_id_per_style() {
        let store = store_with(&[
            serde_json::json!({"style": "PC54", "color_name": "Red"}),
            serde_json::json!({"style": "K500", "color_name": "Navy"}),
            serde_json::json!({"style": "PC54", "color_name": "Blue"}),
        ])
        .await;

        let validated = Filters::default().validate().unwrap();
        let query = ProductQuery::new("", "", &validated).distinct_by_style();
        let (ids, total) = scan_ids(&store, &query).await;
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_sink_error_stops_scan() {
        let store = store_with(&[serde_json::json!({}), serde_json::json!({})]).await;
        let validated = Filters::default().validate().unwrap();

        let mut seen = 0;
        let mut sink = |_row: RawProductRow| -> Result<()> {
            seen += 1;
            Err(Error::Storage("stop".to_string()))
        };
        let result = store
            .scan_products(&ProductQuery::new("", "", &validated), &mut sink)
            .await;
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }
}
