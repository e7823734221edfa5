pub mod analytics_service;
pub mod auth_service;
pub mod inventory_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;
