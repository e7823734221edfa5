//! Development seed data: two accounts and a small starter catalog.
//! Safe to run repeatedly; existing rows are left in place.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn ensure_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(user_id)
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    category: &'static str,
    fabric_options: &'static [&'static str],
    sizes: &'static [&'static str],
    featured: bool,
    turnaround: &'static str,
    car_seat_friendly: Option<bool>,
}

fn catalog() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Hooded Fleece Poncho",
            description: "Cozy pull-over poncho that slips on without fuss",
            price: 4500,
            category: "poncho",
            fabric_options: &["fleece", "sherpa"],
            sizes: &["12m", "18m", "2T", "3T"],
            featured: true,
            turnaround: "2-3 weeks",
            car_seat_friendly: Some(true),
        },
        SeedProduct {
            name: "Two-Piece Cotton Pajamas",
            description: "Soft knit pajama set with envelope neckline",
            price: 3800,
            category: "pajamas",
            fabric_options: &["cotton", "bamboo"],
            sizes: &["18m", "2T", "3T", "4T"],
            featured: true,
            turnaround: "2 weeks",
            car_seat_friendly: None,
        },
        SeedProduct {
            name: "Lined Play Pants",
            description: "Double-layer knee pants for crawlers and climbers",
            price: 3200,
            category: "pants",
            fabric_options: &["cotton", "french terry"],
            sizes: &["12m", "18m", "2T"],
            featured: false,
            turnaround: "1-2 weeks",
            car_seat_friendly: None,
        },
        SeedProduct {
            name: "Knit Booties",
            description: "Stay-on booties with adjustable ankle snaps",
            price: 1800,
            category: "booties",
            fabric_options: &["wool", "fleece"],
            sizes: &["0-6m", "6-12m", "12-18m"],
            featured: false,
            turnaround: "1 week",
            car_seat_friendly: Some(true),
        },
    ]
}

/// Seed the starter catalog. Products are keyed by name; a rerun finds the
/// existing row instead of inserting a duplicate, and the inventory row is
/// created only when missing.
pub async fn seed_products(pool: &PgPool) -> anyhow::Result<()> {
    for product in catalog() {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE name = $1")
                .bind(product.name)
                .fetch_optional(pool)
                .await?;

        let product_id = match existing {
            Some((id,)) => id,
            None => {
                let (id,): (Uuid,) = sqlx::query_as(
                    r#"
                    INSERT INTO products
                        (id, name, description, price, category, fabric_options, sizes,
                         featured, turnaround, car_seat_friendly)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    RETURNING id
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(product.name)
                .bind(product.description)
                .bind(product.price)
                .bind(product.category)
                .bind(serde_json::json!(product.fabric_options))
                .bind(serde_json::json!(product.sizes))
                .bind(product.featured)
                .bind(product.turnaround)
                .bind(product.car_seat_friendly)
                .fetch_one(pool)
                .await?;
                id
            }
        };

        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, quantity, reserved_quantity, low_stock_threshold)
            VALUES ($1, $2, 0, 5)
            ON CONFLICT (product_id) DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(100)
        .execute(pool)
        .await?;
    }

    Ok(())
}
