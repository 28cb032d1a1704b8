//! Storage traits for the product catalog.
//!
//! These traits define the interface that concrete backends must satisfy,
//! enabling a PostgreSQL store in production and an in-process store for
//! tests and embedded use.

use async_trait::async_trait;

use crate::error::Result;
use crate::filters::{SortOrder, ValidatedFilters};

/// A fully-resolved product search, built only from validated filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductQuery<'a> {
    /// Simple-mode text matched against `attrs.style`; empty matches all.
    pub style: &'a str,
    /// Simple-mode text matched against `attrs.mill`; empty matches all.
    pub mill: &'a str,
    /// Primary ordering; `id ASC` is always the secondary key.
    pub sort: SortOrder,
    pub limit: i64,
    pub offset: i64,
    /// Collapse to one row per distinct style before counting and paging.
    pub distinct_by_style: bool,
}

impl<'a> ProductQuery<'a> {
    pub fn new(style: &'a str, mill: &'a str, filters: &ValidatedFilters) -> Self {
        Self {
            style,
            mill,
            sort: filters.sort(),
            limit: filters.limit(),
            offset: filters.offset(),
            distinct_by_style: false,
        }
    }

    /// Enable the one-row-per-style pre-aggregation step.
    pub fn distinct_by_style(mut self) -> Self {
        self.distinct_by_style = true;
        self
    }
}

/// One row as returned by a store, before the attribute document is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProductRow {
    /// Windowed count of all rows matching the query (ignores limit/offset).
    pub total_count: i64,
    pub id: i64,
    pub product_type: String,
    /// Serialized attribute document.
    pub attrs: Vec<u8>,
}

/// Receives rows one at a time; returning an error stops the scan.
pub type RowSink<'a> = &'a mut (dyn FnMut(RawProductRow) -> Result<()> + Send);

/// Backend for product storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Execute `query` once and feed matching rows to `sink` in order.
    ///
    /// Implementations must release any cursor on every exit path, including
    /// when `sink` returns an error partway through.
    async fn scan_products(&self, query: &ProductQuery<'_>, sink: RowSink<'_>) -> Result<()>;

    /// Insert one product and return its identity.
    ///
    /// `id` of `None` lets the store assign the next identity.
    async fn insert_product(&self, id: Option<i64>, product_type: &str, attrs: &[u8])
        -> Result<i64>;
}
