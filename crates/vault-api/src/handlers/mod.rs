//! HTTP handlers for vault-api.

pub mod health;
pub mod products;
