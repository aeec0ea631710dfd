use serde::Serialize;

/// Listing content attributes of a SKU (PostgreSQL `rca_sku_dim`).
///
/// Query Pattern: "Which SKUs of brand X on platform Y have weak listings"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuContent {
    pub sku_id: String,
    pub sku_name: String,
    pub brand: String,
    pub platform: String,
    pub image_count: Option<i32>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub has_description: Option<bool>,
}
