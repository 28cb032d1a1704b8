//! # vault-core
//!
//! Core types, traits, and abstractions for the vault product catalog.
//!
//! This crate provides the product data model, the filter/sort validator,
//! pagination metadata, the simple-mode text matcher, and the storage trait
//! that the `vault-db` backends implement.

pub mod defaults;
pub mod error;
pub mod filters;
pub mod metadata;
pub mod models;
pub mod text_match;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result, ValidationErrors};
pub use filters::{
    Filters, SortDirection, SortField, SortOrder, ValidatedFilters, DEFAULT_SORT_SAFELIST,
};
pub use metadata::Metadata;
pub use models::*;
pub use text_match::{simple_match, simple_tokens};
pub use traits::*;
