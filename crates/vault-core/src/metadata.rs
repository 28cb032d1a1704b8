//! Pagination metadata derived from a windowed count.

use serde::{Deserialize, Serialize};

/// Pagination summary for one page of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub page: i64,
    pub page_size: i64,
    pub total_records: i64,
    pub total_pages: i64,
}

impl Metadata {
    /// Compute metadata from the total matching-row count.
    ///
    /// A zero total yields all-zero metadata rather than "page 1 of 0".
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }

        Self {
            page,
            page_size,
            total_records,
            total_pages: (total_records + page_size - 1) / page_size,
        }
    }
}
