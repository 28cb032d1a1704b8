//! Product data model.

use serde::{Deserialize, Serialize};

// =============================================================================
// NULLABLE STRINGS
// =============================================================================

/// A string that may be explicitly absent.
///
/// Serializes as a JSON string when present and as `null` when absent, so a
/// field the source feed never provided stays distinguishable from a blank
/// one. A missing key decodes as absent when the field carries
/// `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NullString(Option<String>);

impl NullString {
    /// An absent value.
    pub fn absent() -> Self {
        Self(None)
    }

    /// A present value (possibly empty).
    pub fn present(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<Option<String>> for NullString {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl From<&str> for NullString {
    fn from(value: &str) -> Self {
        Self::present(value)
    }
}

impl From<String> for NullString {
    fn from(value: String) -> Self {
        Self::present(value)
    }
}

// =============================================================================
// ATTRIBUTE DOCUMENT
// =============================================================================

/// The per-product attribute document, stored as a single `jsonb` value.
///
/// Feed documents are sparse: missing string keys decode as `""` and missing
/// nullable keys decode as absent. A value of the wrong JSON type is a decode
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttrs {
    pub id: i64,
    pub product_title: String,
    pub product_description: String,
    pub style: String,
    pub available_sizes: String,
    pub brand_logo_image: String,
    pub thumbnail_image: String,
    pub color_swatch_image: String,
    pub product_image: String,
    pub spec_sheet: String,
    pub price_text: String,
    pub suggested_price: String,
    pub category_name: String,
    pub subcategory_name: String,
    pub color_name: String,
    pub color_square_image: String,
    pub color_product_image: String,
    pub color_product_image_thumbnail: String,
    pub size: String,
    pub piece_weight: String,
    pub piece_price: String,
    pub dozens_price: String,
    pub case_price: String,
    pub price_group: String,
    pub case_size: String,
    pub inventory_key: String,
    pub size_index: String,
    pub sanmar_mainframe_color: String,
    pub mill: String,
    pub product_status: String,
    pub companion_style: NullString,
    pub msrp: String,
    pub map_pricing: NullString,
    pub front_model_image_url: String,
    pub back_model_image_url: String,
    pub front_flat_image_url: String,
    pub back_flat_image_url: String,
    pub product_measurements: String,
    pub pms_color: NullString,
    pub gtin: String,
    pub decoration_spec_sheet: String,
}

impl ProductAttrs {
    /// Identity requested by the source feed, if it carries a usable one.
    pub fn source_id(&self) -> Option<i64> {
        (self.id > 0).then_some(self.id)
    }
}

// =============================================================================
// PRODUCT
// =============================================================================

/// A stored catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "type")]
    pub product_type: String,
    pub attrs: ProductAttrs,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub products: Vec<Product>,
    pub metadata: crate::metadata::Metadata,
}
