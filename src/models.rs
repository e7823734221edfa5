use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in cents.
    pub price: i64,
    pub category: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub fabric_options: Vec<String>,
    pub sizes: Vec<String>,
    pub featured: bool,
    pub customizable: bool,
    pub turnaround: String,
    pub car_seat_friendly: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Inventory {
    pub product_id: Uuid,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub low_stock_threshold: i32,
    pub updated_at: DateTime<Utc>,
}

/// A lead-capture record, not a financial transaction. Created PENDING by the
/// public order form and mutated only by admins afterwards.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub child_size: String,
    pub product_type: String,
    pub fabric_preference: Option<String>,
    pub personalization: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub car_seat_friendly_requested: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}
