//! Query engine behavior over the in-memory store.
//!
//! Covers text matching, ordering with the id tie-break, pagination metadata,
//! distinct-by-style browsing, validation short-circuiting, decode failures,
//! deadlines, and sequential import.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vault_db::test_fixtures::{memory_catalog, AttrsBuilder};
use vault_db::{
    CatalogConfig, Error, ErrorKind, Filters, MemoryProductStore, Metadata, NullString,
    ProductCatalog, ProductQuery, ProductStore, RawProductRow, Result, RowSink,
};

async fn seeded_catalog() -> ProductCatalog {
    let catalog = memory_catalog();
    let docs = vec![
        AttrsBuilder::new("Port Authority Tee")
            .mill("SanMar")
            .title("Essential Tee")
            .msrp("12.00")
            .build(),
        AttrsBuilder::new("Sport-Tek Polo")
            .mill("SanMar")
            .title("Racer Polo")
            .msrp("20.00")
            .build(),
        AttrsBuilder::new("Gildan Heavy Tee")
            .mill("Gildan")
            .title("Heavy Cotton Tee")
            .msrp("12.00")
            .build(),
        AttrsBuilder::new("Port Authority Tee")
            .mill("SanMar")
            .title("Essential Tee Tall")
            .msrp("15.00")
            .build(),
    ];
    catalog.import("sanmar", docs).await.unwrap();
    catalog
}

fn ids(page: &vault_db::SearchPage) -> Vec<i64> {
    page.products.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_single_tee_scenario() {
    let catalog = memory_catalog();
    catalog
        .insert(
            "sanmar",
            AttrsBuilder::new("Port Authority Tee").mill("SanMar").build(),
        )
        .await
        .unwrap();

    let page = catalog
        .search("tee", "", &Filters::new(1, 20, "id"))
        .await
        .unwrap();

    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].attrs.style, "Port Authority Tee");
    assert_eq!(page.products[0].product_type, "sanmar");
    assert_eq!(
        page.metadata,
        Metadata {
            page: 1,
            page_size: 20,
            total_records: 1,
            total_pages: 1,
        }
    );
}

#[tokio::test]
async fn test_no_match_returns_empty_and_zero_metadata() {
    let catalog = seeded_catalog().await;

    let page = catalog
        .search("nomatch", "", &Filters::default())
        .await
        .unwrap();

    assert!(page.products.is_empty());
    assert_eq!(page.metadata, Metadata::default());
}

#[tokio::test]
async fn test_empty_text_matches_everything() {
    let catalog = seeded_catalog().await;

    let page = catalog.search("", "", &Filters::default()).await.unwrap();

    assert_eq!(page.metadata.total_records, 4);
    assert_eq!(ids(&page), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_style_and_mill_predicates_are_anded() {
    let catalog = seeded_catalog().await;

    let page = catalog
        .search("tee", "sanmar", &Filters::default())
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1, 4]);

    let page = catalog
        .search("", "gildan", &Filters::default())
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![3]);
}

#[tokio::test]
async fn test_match_is_tokenized_not_substring() {
    let catalog = seeded_catalog().await;

    let page = catalog.search("te", "", &Filters::default()).await.unwrap();
    assert!(page.products.is_empty());

    let page = catalog
        .search("port tee", "", &Filters::default())
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1, 4]);
}

#[tokio::test]
async fn test_descending_sort_breaks_ties_by_id_ascending() {
    let catalog = seeded_catalog().await;

    let page = catalog
        .search("", "", &Filters::new(1, 20, "-msrp"))
        .await
        .unwrap();
    // msrp: 1=12.00, 2=20.00, 3=12.00, 4=15.00
    assert_eq!(ids(&page), vec![2, 4, 1, 3]);

    let page = catalog
        .search("", "", &Filters::new(1, 20, "msrp"))
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1, 3, 4, 2]);
}

#[tokio::test]
async fn test_repeated_queries_are_stable() {
    let catalog = seeded_catalog().await;
    let filters = Filters::new(1, 20, "mill");

    let first = catalog.search("", "", &filters).await.unwrap();
    for _ in 0..5 {
        let again = catalog.search("", "", &filters).await.unwrap();
        assert_eq!(ids(&again), ids(&first));
    }
}

#[tokio::test]
async fn test_pages_never_duplicate_or_skip_rows() {
    let catalog = seeded_catalog().await;

    let mut seen = Vec::new();
    for page in 1..=4 {
        let result = catalog
            .search("", "", &Filters::new(page, 1, "mill"))
            .await
            .unwrap();
        assert_eq!(result.metadata.total_pages, 4);
        seen.extend(ids(&result));
    }

    let full = catalog
        .search("", "", &Filters::new(1, 20, "mill"))
        .await
        .unwrap();
    assert_eq!(seen, ids(&full));
}

#[tokio::test]
async fn test_metadata_reports_total_pages() {
    let catalog = seeded_catalog().await;

    let page = catalog
        .search("", "", &Filters::new(2, 3, "id"))
        .await
        .unwrap();

    assert_eq!(ids(&page), vec![4]);
    assert_eq!(
        page.metadata,
        Metadata {
            page: 2,
            page_size: 3,
            total_records: 4,
            total_pages: 2,
        }
    );
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let catalog = seeded_catalog().await;

    let page = catalog
        .search("", "", &Filters::new(9, 20, "id"))
        .await
        .unwrap();

    assert!(page.products.is_empty());
    assert_eq!(page.metadata, Metadata::default());
}

#[tokio::test]
async fn test_distinct_by_style_collapses_styles() {
    let catalog = seeded_catalog().await;

    let page = catalog
        .search_distinct_by_style("", "", &Filters::default())
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1, 2, 3]);
    assert_eq!(page.metadata.total_records, 3);

    let page = catalog
        .search_distinct_by_style("tee", "sanmar", &Filters::new(1, 20, "-id"))
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1]);
    assert_eq!(page.metadata.total_records, 1);
}

#[tokio::test]
async fn test_nullable_fields_round_trip() {
    let catalog = memory_catalog();
    catalog
        .insert(
            "sanmar",
            AttrsBuilder::new("K500")
                .map_pricing(NullString::absent())
                .pms_color(NullString::present(""))
                .build(),
        )
        .await
        .unwrap();

    let page = catalog.search("k500", "", &Filters::default()).await.unwrap();
    let attrs = &page.products[0].attrs;

    assert!(attrs.map_pricing.is_absent());
    assert!(attrs.companion_style.is_absent());
    assert_eq!(attrs.pms_color.as_deref(), Some(""));
}

#[tokio::test]
async fn test_source_id_is_used_as_identity() {
    let catalog = memory_catalog();

    let product = catalog
        .insert("sanmar", AttrsBuilder::new("PC54").id(4410).build())
        .await
        .unwrap();

    assert_eq!(product.id, 4410);
}

// =============================================================================
// STORE DOUBLES
// =============================================================================

/// Counts storage calls and returns nothing.
#[derive(Default)]
struct CountingStore {
    scans: AtomicUsize,
}

#[async_trait]
impl ProductStore for CountingStore {
    async fn scan_products(&self, _query: &ProductQuery<'_>, _sink: RowSink<'_>) -> Result<()> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_product(&self, _id: Option<i64>, _t: &str, _attrs: &[u8]) -> Result<i64> {
        Ok(1)
    }
}

/// Never answers within any reasonable deadline.
struct StalledStore;

#[async_trait]
impl ProductStore for StalledStore {
    async fn scan_products(&self, _query: &ProductQuery<'_>, _sink: RowSink<'_>) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn insert_product(&self, _id: Option<i64>, _t: &str, _attrs: &[u8]) -> Result<i64> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(1)
    }
}

/// Streams a good row, then a corrupt one, then another good one.
#[derive(Default)]
struct CorruptRowStore {
    delivered: AtomicUsize,
}

#[async_trait]
impl ProductStore for CorruptRowStore {
    async fn scan_products(&self, _query: &ProductQuery<'_>, sink: RowSink<'_>) -> Result<()> {
        let rows = [
            br#"{"style": "PC54"}"#.to_vec(),
            br#"{"style": 54}"#.to_vec(),
            br#"{"style": "PC55"}"#.to_vec(),
        ];
        for (i, attrs) in rows.into_iter().enumerate() {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            sink(RawProductRow {
                total_count: 3,
                id: i as i64 + 1,
                product_type: "sanmar".to_string(),
                attrs,
            })?;
        }
        Ok(())
    }

    async fn insert_product(&self, _id: Option<i64>, _t: &str, _attrs: &[u8]) -> Result<i64> {
        Ok(1)
    }
}

/// Accepts a fixed number of inserts, then fails.
struct FailingAfterStore {
    inner: MemoryProductStore,
    remaining: AtomicUsize,
}

#[async_trait]
impl ProductStore for FailingAfterStore {
    async fn scan_products(&self, query: &ProductQuery<'_>, sink: RowSink<'_>) -> Result<()> {
        self.inner.scan_products(query, sink).await
    }

    async fn insert_product(&self, id: Option<i64>, t: &str, attrs: &[u8]) -> Result<i64> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(Error::Storage("connection reset".to_string()));
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        self.inner.insert_product(id, t, attrs).await
    }
}

// =============================================================================
// FAILURE PATHS
// =============================================================================

#[tokio::test]
async fn test_invalid_sort_never_reaches_store() {
    let store = Arc::new(CountingStore::default());
    let catalog = ProductCatalog::new(store.clone());

    let err = catalog
        .search("", "", &Filters::new(1, 20, "dropstyle; --"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        Error::Validation(errors) => assert_eq!(errors.get("sort"), Some("invalid sort value")),
        other => panic!("Expected Validation error, got {:?}", other),
    }
    assert_eq!(store.scans.load(Ordering::SeqCst), 0);

    catalog
        .search_distinct_by_style("", "", &Filters::new(0, 20, "id"))
        .await
        .unwrap_err();
    assert_eq!(store.scans.load(Ordering::SeqCst), 0);

    catalog.search("", "", &Filters::default()).await.unwrap();
    assert_eq!(store.scans.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_corrupt_row_aborts_whole_search() {
    let store = Arc::new(CorruptRowStore::default());
    let catalog = ProductCatalog::new(store.clone());

    let err = catalog
        .search("", "", &Filters::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(matches!(err, Error::Decode { product_id: 2, .. }));
    // Iteration stopped at the corrupt row.
    assert_eq!(store.delivered.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_search_times_out() {
    let catalog = ProductCatalog::with_config(
        Arc::new(StalledStore),
        CatalogConfig {
            query_timeout: Duration::from_secs(3),
        },
    );

    let err = catalog
        .search("", "", &Filters::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(3)));
}

#[tokio::test(start_paused = true)]
async fn test_insert_times_out() {
    let catalog = ProductCatalog::new(Arc::new(StalledStore));

    let err = catalog
        .insert("sanmar", AttrsBuilder::new("PC54").build())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_import_failure_keeps_earlier_records() {
    let store = Arc::new(FailingAfterStore {
        inner: MemoryProductStore::new(),
        remaining: AtomicUsize::new(2),
    });
    let catalog = ProductCatalog::new(store.clone());

    let docs = vec![
        AttrsBuilder::new("A1").build(),
        AttrsBuilder::new("A2").build(),
        AttrsBuilder::new("A3").build(),
        AttrsBuilder::new("A4").build(),
    ];
    let err = catalog.import("sanmar", docs).await.unwrap_err();

    match &err {
        Error::Import {
            index, imported, ..
        } => {
            assert_eq!(*index, 2);
            assert_eq!(*imported, 2);
        }
        other => panic!("Expected Import error, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(store.inner.len().await, 2);
}

#[tokio::test]
async fn test_import_returns_ids_in_order() {
    let catalog = memory_catalog();

    let ids = catalog
        .import(
            "sanmar",
            vec![
                AttrsBuilder::new("A1").build(),
                AttrsBuilder::new("A2").id(50).build(),
                AttrsBuilder::new("A3").build(),
            ],
        )
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 50, 2]);
}
