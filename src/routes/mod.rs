use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod auth;
pub mod custom_order;
pub mod doc;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod params;
pub mod products;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/inventory", inventory::router())
        .nest("/orders", orders::router())
        .nest("/custom-order", custom_order::router())
        .nest("/users", users::router())
        .nest("/analytics", analytics::router())
        .nest("/auth", auth::router())
}
