use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

/// Public lead-capture form body. Creates a PENDING order for manual fulfilment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomOrderRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub child_size: String,
    pub product_type: String,
    pub fabric_preference: Option<String>,
    pub personalization: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub car_seat_friendly_requested: Option<bool>,
    pub image_url: Option<String>,
    /// Optional catalog product this request is based on; triggers a
    /// best-effort reservation of one unit.
    pub product_id: Option<Uuid>,
}

/// Admin-only direct order creation; same shape as the public form plus an
/// optional linked account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub order: CustomOrderRequest,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub child_size: Option<String>,
    pub product_type: Option<String>,
    pub fabric_preference: Option<String>,
    pub personalization: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub car_seat_friendly_requested: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub id: Uuid,
}
