//! Product HTTP handlers.
//!
//! Search endpoints read their inputs from the query string:
//!
//! | Parameter       | Default | Notes                              |
//! |-----------------|---------|------------------------------------|
//! | `attrs->>style` | `""`    | simple-mode text match on style    |
//! | `attrs->>mill`  | `""`    | simple-mode text match on mill     |
//! | `page`          | `1`     | integer, 1..=10 000 000            |
//! | `page_size`     | `20`    | integer, 1..=100                   |
//! | `sort`          | `id`    | safelisted key, `-` for descending |

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use vault_core::{defaults, Filters, ProductAttrs, SearchPage, ValidationErrors};

use crate::{ApiError, AppState};

/// Query-string key for the style text match.
pub const STYLE_PARAM: &str = "attrs->>style";
/// Query-string key for the mill text match.
pub const MILL_PARAM: &str = "attrs->>mill";

/// Request body for a bulk import.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportRequest {
    pub products: Vec<ProductAttrs>,
}

/// Parsed search inputs.
#[derive(Debug)]
struct SearchParams {
    style: String,
    mill: String,
    filters: Filters,
}

fn read_string(params: &HashMap<String, String>, key: &str, default: &str) -> String {
    match params.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

/// Integer parameter; unparsable values record an error and yield `default`.
fn read_int(
    params: &HashMap<String, String>,
    key: &str,
    default: i64,
    errors: &mut ValidationErrors,
) -> i64 {
    match params.get(key) {
        Some(value) if !value.is_empty() => value.parse().unwrap_or_else(|_| {
            errors.add(key, "must be an integer value");
            default
        }),
        _ => default,
    }
}

/// Collect search inputs, reporting parse and range violations together.
fn search_params(params: &HashMap<String, String>) -> Result<SearchParams, ApiError> {
    let mut errors = ValidationErrors::new();

    let style = read_string(params, STYLE_PARAM, "");
    let mill = read_string(params, MILL_PARAM, "");
    let page = read_int(params, "page", defaults::PAGE, &mut errors);
    let page_size = read_int(params, "page_size", defaults::PAGE_SIZE, &mut errors);
    let sort = read_string(params, "sort", defaults::SORT);

    let filters = Filters::new(page, page_size, sort);
    if let Err(filter_errors) = filters.validate() {
        errors.extend(filter_errors);
    }

    let params = errors.into_result(SearchParams {
        style,
        mill,
        filters,
    })?;
    Ok(params)
}

/// List products matching style and mill text.
///
/// # Returns
/// - 200 OK with `{"products": [...], "metadata": {...}}`
/// - 422 Unprocessable Entity with per-field messages
/// - 500 Internal Server Error on storage failure or timeout
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchPage>, ApiError> {
    let SearchParams {
        style,
        mill,
        filters,
    } = search_params(&params)?;

    let page = state.catalog.search(&style, &mill, &filters).await?;
    Ok(Json(page))
}

/// Like [`list_products`], keeping one product per distinct style.
pub async fn list_product_styles(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchPage>, ApiError> {
    let SearchParams {
        style,
        mill,
        filters,
    } = search_params(&params)?;

    let page = state
        .catalog
        .search_distinct_by_style(&style, &mill, &filters)
        .await?;
    Ok(Json(page))
}

/// Import attribute documents in order, one product per document.
///
/// # Returns
/// - 200 OK with an empty body once every record is stored
/// - 400 Bad Request when the body is not a valid import request
/// - 500 Internal Server Error with `imported` and `failed_record` when a
///   record fails; earlier records remain stored
pub async fn import_products(
    State(state): State<AppState>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    state
        .catalog
        .import(defaults::IMPORT_PRODUCT_TYPE, request.products)
        .await?;
    Ok(StatusCode::OK)
}
