//! Paging and sort validation for product listings.
//!
//! Client-supplied `page`, `page_size` and `sort` values are untrusted. They
//! are checked here against fixed bounds and a caller-supplied safelist, and
//! only a [`ValidatedFilters`] (which can only be produced by
//! [`Filters::validate`]) is accepted by the query engine. Sort keys are
//! resolved to a closed [`SortField`] enum whose column expressions are
//! compile-time constants, so no client text is ever formatted into SQL.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ValidationErrors;

/// Every sortable key in both ascending and descending form.
pub const DEFAULT_SORT_SAFELIST: &[&str] = &[
    "id",
    "product_title",
    "style",
    "category_name",
    "subcategory_name",
    "color_name",
    "size",
    "mill",
    "msrp",
    "suggested_price",
    "map_pricing",
    "piece_price",
    "dozens_price",
    "case_price",
    "price_group",
    "product_status",
    "inventory_key",
    "gtin",
    "-id",
    "-product_title",
    "-style",
    "-category_name",
    "-subcategory_name",
    "-color_name",
    "-size",
    "-mill",
    "-msrp",
    "-suggested_price",
    "-map_pricing",
    "-piece_price",
    "-dozens_price",
    "-case_price",
    "-price_group",
    "-product_status",
    "-inventory_key",
    "-gtin",
];

/// A sortable product field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    ProductTitle,
    Style,
    CategoryName,
    SubcategoryName,
    ColorName,
    Size,
    Mill,
    Msrp,
    SuggestedPrice,
    MapPricing,
    PiecePrice,
    DozensPrice,
    CasePrice,
    PriceGroup,
    ProductStatus,
    InventoryKey,
    Gtin,
}

impl SortField {
    pub const ALL: [SortField; 18] = [
        SortField::Id,
        SortField::ProductTitle,
        SortField::Style,
        SortField::CategoryName,
        SortField::SubcategoryName,
        SortField::ColorName,
        SortField::Size,
        SortField::Mill,
        SortField::Msrp,
        SortField::SuggestedPrice,
        SortField::MapPricing,
        SortField::PiecePrice,
        SortField::DozensPrice,
        SortField::CasePrice,
        SortField::PriceGroup,
        SortField::ProductStatus,
        SortField::InventoryKey,
        SortField::Gtin,
    ];

    /// Resolve an unmarked sort key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// The client-facing key (also the attribute document field name).
    pub fn key(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::ProductTitle => "product_title",
            SortField::Style => "style",
            SortField::CategoryName => "category_name",
            SortField::SubcategoryName => "subcategory_name",
            SortField::ColorName => "color_name",
            SortField::Size => "size",
            SortField::Mill => "mill",
            SortField::Msrp => "msrp",
            SortField::SuggestedPrice => "suggested_price",
            SortField::MapPricing => "map_pricing",
            SortField::PiecePrice => "piece_price",
            SortField::DozensPrice => "dozens_price",
            SortField::CasePrice => "case_price",
            SortField::PriceGroup => "price_group",
            SortField::ProductStatus => "product_status",
            SortField::InventoryKey => "inventory_key",
            SortField::Gtin => "gtin",
        }
    }

    /// SQL expression ordering by this field on the `products` table.
    pub fn column_expr(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::ProductTitle => "attrs->>'product_title'",
            SortField::Style => "attrs->>'style'",
            SortField::CategoryName => "attrs->>'category_name'",
            SortField::SubcategoryName => "attrs->>'subcategory_name'",
            SortField::ColorName => "attrs->>'color_name'",
            SortField::Size => "attrs->>'size'",
            SortField::Mill => "attrs->>'mill'",
            SortField::Msrp => "attrs->>'msrp'",
            SortField::SuggestedPrice => "attrs->>'suggested_price'",
            SortField::MapPricing => "attrs->>'map_pricing'",
            SortField::PiecePrice => "attrs->>'piece_price'",
            SortField::DozensPrice => "attrs->>'dozens_price'",
            SortField::CasePrice => "attrs->>'case_price'",
            SortField::PriceGroup => "attrs->>'price_group'",
            SortField::ProductStatus => "attrs->>'product_status'",
            SortField::InventoryKey => "attrs->>'inventory_key'",
            SortField::Gtin => "attrs->>'gtin'",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A resolved primary ordering. Identity ascending is always appended as the
/// tie-break by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Decode a sort key: a leading `-` selects descending order.
    pub fn parse(sort: &str) -> Option<Self> {
        let (key, direction) = match sort.strip_prefix(defaults::SORT_DESC_MARKER) {
            Some(rest) => (rest, SortDirection::Desc),
            None => (sort, SortDirection::Asc),
        };
        SortField::from_key(key).map(|field| SortOrder { field, direction })
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            direction: SortDirection::Asc,
        }
    }
}

/// Raw paging and sort parameters for a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: defaults::PAGE,
            page_size: defaults::PAGE_SIZE,
            sort: defaults::SORT.to_string(),
            sort_safelist: DEFAULT_SORT_SAFELIST
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }
}

impl Filters {
    /// Create filters with the default safelist.
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            ..Self::default()
        }
    }

    /// Replace the sort safelist.
    pub fn with_safelist<I, S>(mut self, safelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_safelist = safelist.into_iter().map(Into::into).collect();
        self
    }

    /// Check every field and collect all violations.
    pub fn validate(&self) -> Result<ValidatedFilters, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(self.page > 0, "page", "must be greater than zero");
        errors.check(
            self.page <= defaults::MAX_PAGE,
            "page",
            "must be a maximum of 10 million",
        );
        errors.check(self.page_size > 0, "page_size", "must be greater than zero");
        errors.check(
            self.page_size <= defaults::MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );

        let permitted = self.sort_safelist.iter().any(|s| *s == self.sort);
        let order = if permitted {
            SortOrder::parse(&self.sort)
        } else {
            None
        };
        errors.check(order.is_some(), "sort", "invalid sort value");

        match order {
            Some(sort) if errors.is_empty() => Ok(ValidatedFilters {
                page: self.page,
                page_size: self.page_size,
                sort,
            }),
            _ => Err(errors),
        }
    }
}

/// Paging and ordering that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedFilters {
    page: i64,
    page_size: i64,
    sort: SortOrder,
}

impl ValidatedFilters {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Rows per page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows skipped before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
