//! Catalog query engine.
//!
//! [`ProductCatalog`] validates paging and sort input, executes exactly one
//! storage query per search under a hard deadline, decodes every attribute
//! document, and derives pagination metadata from the query's own windowed
//! count. A single undecodable row fails the whole search: a malformed
//! document means upstream corruption and is never silently dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use vault_core::{
    defaults, Error, Filters, Metadata, Product, ProductAttrs, ProductQuery, ProductStore,
    RawProductRow, Result, SearchPage, ValidatedFilters,
};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Deadline applied to every storage execution.
    pub query_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(defaults::QUERY_TIMEOUT_SECS),
        }
    }
}

/// Search and import over a [`ProductStore`].
#[derive(Clone)]
pub struct ProductCatalog {
    store: Arc<dyn ProductStore>,
    config: CatalogConfig,
}

impl ProductCatalog {
    /// Create a catalog with the default configuration.
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self::with_config(store, CatalogConfig::default())
    }

    pub fn with_config(store: Arc<dyn ProductStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    /// Search products whose style and mill match the given text.
    ///
    /// Empty text matches every row. Filters are validated before anything
    /// is executed; violations are returned as [`Error::Validation`].
    #[instrument(skip_all, fields(
        subsystem = "catalog",
        component = "query_engine",
        op = "search",
        style = %style,
        mill = %mill,
        sort = %filters.sort,
    ))]
    pub async fn search(&self, style: &str, mill: &str, filters: &Filters) -> Result<SearchPage> {
        let validated = filters.validate()?;
        self.execute(ProductQuery::new(style, mill, &validated), &validated)
            .await
    }

    /// Same as [`search`](Self::search), keeping one representative product
    /// per distinct style before counting, sorting and paging.
    #[instrument(skip_all, fields(
        subsystem = "catalog",
        component = "query_engine",
        op = "search_distinct_by_style",
        style = %style,
        mill = %mill,
        sort = %filters.sort,
    ))]
    pub async fn search_distinct_by_style(
        &self,
        style: &str,
        mill: &str,
        filters: &Filters,
    ) -> Result<SearchPage> {
        let validated = filters.validate()?;
        let query = ProductQuery::new(style, mill, &validated).distinct_by_style();
        self.execute(query, &validated).await
    }

    async fn execute(
        &self,
        query: ProductQuery<'_>,
        filters: &ValidatedFilters,
    ) -> Result<SearchPage> {
        let start = Instant::now();
        let mut total_records = 0_i64;
        let mut products = Vec::new();

        let mut sink = |row: RawProductRow| -> Result<()> {
            total_records = row.total_count;
            products.push(decode_row(row)?);
            Ok(())
        };
        self.bounded(self.store.scan_products(&query, &mut sink))
            .await?;

        let metadata = Metadata::calculate(total_records, filters.page(), filters.page_size());
        debug!(
            result_count = products.len(),
            total_records,
            duration_ms = start.elapsed().as_millis() as u64,
            "Product search complete"
        );

        Ok(SearchPage { products, metadata })
    }

    /// Store one attribute document as a new product.
    ///
    /// A positive `attrs.id` is used as the product identity; otherwise the
    /// store assigns one.
    pub async fn insert(&self, product_type: &str, attrs: ProductAttrs) -> Result<Product> {
        let raw = serde_json::to_vec(&attrs)?;
        let id = self
            .bounded(self.store.insert_product(attrs.source_id(), product_type, &raw))
            .await?;

        Ok(Product {
            id,
            product_type: product_type.to_string(),
            attrs,
        })
    }

    /// Insert documents one at a time, in order.
    ///
    /// There is no transaction: on failure the records before the failing
    /// one stay committed and the error names the failing index.
    #[instrument(skip_all, fields(
        subsystem = "catalog",
        component = "import",
        op = "import",
        product_type = %product_type,
        input_count = documents.len(),
    ))]
    pub async fn import(
        &self,
        product_type: &str,
        documents: Vec<ProductAttrs>,
    ) -> Result<Vec<i64>> {
        let start = Instant::now();
        let mut ids = Vec::with_capacity(documents.len());

        for (index, attrs) in documents.into_iter().enumerate() {
            match self.insert(product_type, attrs).await {
                Ok(product) => ids.push(product.id),
                Err(source) => {
                    warn!(
                        index,
                        imported = ids.len(),
                        error = %source,
                        "Product import aborted"
                    );
                    return Err(Error::Import {
                        index,
                        imported: ids.len(),
                        source: Box::new(source),
                    });
                }
            }
        }

        info!(
            imported = ids.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Product import complete"
        );
        Ok(ids)
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.config.query_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = self.config.query_timeout.as_millis() as u64,
                    "Storage call exceeded its deadline"
                );
                Err(Error::Timeout(self.config.query_timeout))
            }
        }
    }
}

fn decode_row(row: RawProductRow) -> Result<Product> {
    let attrs = serde_json::from_slice::<ProductAttrs>(&row.attrs).map_err(|e| Error::Decode {
        product_id: row.id,
        reason: e.to_string(),
    })?;

    Ok(Product {
        id: row.id,
        product_type: row.product_type,
        attrs,
    })
}
