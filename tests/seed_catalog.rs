use axum_storefront_api::{
    db::create_pool,
    seed::{ensure_user, seed_products},
};

// Running the seed twice must leave exactly one copy of the catalog and one
// row per seeded account.
#[tokio::test]
async fn seeding_twice_does_not_duplicate_rows() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    sqlx::query(
        "TRUNCATE TABLE order_items, orders, inventory, audit_logs, products, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    seed_products(&pool).await?;
    seed_products(&pool).await?;

    let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    assert_eq!(products, 4);

    let (inventory_rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inventory")
        .fetch_one(&pool)
        .await?;
    assert_eq!(inventory_rows, 4);

    let first = ensure_user(&pool, "admin@example.com", "admin123!", "ADMIN").await?;
    let second = ensure_user(&pool, "admin@example.com", "admin123!", "ADMIN").await?;
    assert_eq!(first, second);

    let (admins,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = 'admin@example.com'")
            .fetch_one(&pool)
            .await?;
    assert_eq!(admins, 1);

    Ok(())
}
