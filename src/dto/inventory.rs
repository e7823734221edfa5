use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Inventory;

/// Single bookkeeping action against a product's inventory row.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InventoryActionRequest {
    /// Hold stock against a pending order; fails when availability is short.
    Reserve { qty: i32 },
    /// Convert a reservation into a permanent depletion.
    Fulfill { qty: i32 },
    /// Return reserved stock to availability, floored at zero.
    Release { qty: i32 },
    /// Direct admin override of on-hand stock.
    SetQuantity { quantity: i32 },
    /// Direct admin override of the low-stock threshold.
    SetThreshold { threshold: i32 },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryItem {
    #[serde(flatten)]
    pub inventory: Inventory,
    pub product_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryList {
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Availability {
    pub product_id: Uuid,
    /// `quantity - reserved_quantity`, never negative.
    pub available: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryListQuery {
    /// When true, only rows at or below their low-stock threshold.
    pub low_stock: Option<bool>,
}
