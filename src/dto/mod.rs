pub mod analytics;
pub mod auth;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod users;
