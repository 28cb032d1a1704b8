//! Centralized default constants for the vault catalog.
//!
//! **This module is the single source of truth** for shared default values.
//! The API layer, the engine and the storage backends reference these
//! constants instead of defining their own magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Page returned when the client does not ask for one.
pub const PAGE: i64 = 1;

/// Default page size for product listings.
pub const PAGE_SIZE: i64 = 20;

/// Hard upper bound for `page_size`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Hard upper bound for `page`. Keeps `(page - 1) * page_size` far from overflow.
pub const MAX_PAGE: i64 = 10_000_000;

// =============================================================================
// SORTING
// =============================================================================

/// Sort key applied when the client does not send one.
pub const SORT: &str = "id";

/// Leading marker that selects descending order.
pub const SORT_DESC_MARKER: char = '-';

// =============================================================================
// QUERY EXECUTION
// =============================================================================

/// Per-call deadline for a storage execution, in seconds.
pub const QUERY_TIMEOUT_SECS: u64 = 3;

// =============================================================================
// IMPORT
// =============================================================================

/// Type tag stamped on every product created through the import endpoint.
pub const IMPORT_PRODUCT_TYPE: &str = "sanmar";
