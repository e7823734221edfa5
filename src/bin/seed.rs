use axum_storefront_api::{
    config::AppConfig,
    db::create_pool,
    seed::{ensure_user, seed_products},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123!", "ADMIN").await?;
    let customer_id = ensure_user(&pool, "customer@example.com", "customer123!", "CUSTOMER").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}
