use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

// Distinguishes an absent field (outer None) from an explicit `null` (Some(None)).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Price in cents, must be non-negative.
    pub price: i64,
    pub category: String,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub fabric_options: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub customizable: Option<bool>,
    pub turnaround: String,
    pub car_seat_friendly: Option<bool>,
    /// Initial on-hand stock for the product's inventory row, default 0.
    pub initial_quantity: Option<i32>,
    /// Low-stock alert threshold, default 5.
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub fabric_options: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub customizable: Option<bool>,
    pub turnaround: Option<String>,
    /// Tri-state: absent leaves the flag untouched, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<bool>)]
    pub car_seat_friendly: Option<Option<bool>>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
