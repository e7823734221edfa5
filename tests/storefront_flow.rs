use axum_storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        inventory::InventoryActionRequest,
        orders::CustomOrderRequest,
        products::CreateProductRequest,
        users::UpdateUserRequest,
    },
    entity::{order_items::ActiveModel as OrderItemActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    services::{inventory_service, order_service, product_service, user_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: admin creates a product with stock, a shopper submits a
// lead-capture order that reserves a unit, the admin works the reservation
// through fulfil/release, and user administration guards hold.
#[tokio::test]
async fn lead_capture_and_inventory_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
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

    let state = setup_state(&database_url).await?;

    let admin_id = create_user(&state, "ADMIN", "admin@example.com").await?;
    let customer_id = create_user(&state, "CUSTOMER", "customer@example.com").await?;

    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "ADMIN".into(),
    };
    let auth_customer = AuthUser {
        user_id: customer_id,
        role: "CUSTOMER".into(),
    };

    // Non-admins cannot touch the catalog.
    let denied = product_service::create_product(
        &state,
        &auth_customer,
        product_request("Denied Poncho", 10),
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    // Admin creates a product; the inventory row comes with it.
    let created = product_service::create_product(
        &state,
        &auth_admin,
        product_request("Hooded Fleece Poncho", 10),
    )
    .await?;
    let product = created.data.unwrap();
    assert_eq!(product.category, "poncho");
    assert_eq!(product.fabric_options, vec!["fleece".to_string()]);

    // Create-then-fetch round-trips the catalog fields.
    let fetched = product_service::get_product(&state, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched.name, product.name);
    assert_eq!(fetched.price, product.price);
    assert_eq!(fetched.sizes, product.sizes);

    let availability = inventory_service::get_availability(&state, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(availability.available, 10);

    // Lead capture reserves one unit against the linked product.
    let lead = order_service::create_lead_order(&state, custom_order(Some(product.id))).await?;
    let order_id = lead.data.unwrap().id;

    let availability = inventory_service::get_availability(&state, product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(availability.available, 9);

    // Reserving up to the available count succeeds; one past it fails.
    inventory_service::reserve(&state, product.id, 8).await?;
    let over = inventory_service::reserve(&state, product.id, 2).await;
    assert!(matches!(over, Err(AppError::BadRequest(_))));

    // Fulfilling more than the reserved count is rejected.
    let over_fulfill = inventory_service::fulfill(&state, product.id, 10).await;
    assert!(matches!(over_fulfill, Err(AppError::BadRequest(_))));

    let fulfilled = inventory_service::fulfill(&state, product.id, 9).await?;
    assert_eq!(fulfilled.quantity, 1);
    assert_eq!(fulfilled.reserved_quantity, 0);

    // Releasing with nothing reserved floors at zero instead of going negative.
    let released = inventory_service::release(&state, product.id, 5).await?;
    assert_eq!(released.reserved_quantity, 0);

    // A lead order against an unknown product is still recorded.
    let orphan = order_service::create_lead_order(&state, custom_order(Some(Uuid::new_v4()))).await?;
    assert!(orphan.data.is_some());

    // Status moves freely within the enumerated set, and nowhere outside it.
    let updated = order_service::update_order(
        &state,
        &auth_admin,
        order_id,
        status_update("CONFIRMED"),
    )
    .await?;
    assert_eq!(updated.data.unwrap().status, "CONFIRMED");

    let invalid = order_service::update_order(
        &state,
        &auth_admin,
        order_id,
        status_update("SHIPPED"),
    )
    .await;
    assert!(matches!(invalid, Err(AppError::BadRequest(_))));

    // Anonymous lead orders are admin-only reads.
    let forbidden = order_service::get_order(&state, &auth_customer, order_id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // A product with line items cannot be deleted.
    OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(product.id),
        quantity: Set(1),
        price: Set(4500),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    let blocked = product_service::delete_product(&state, &auth_admin, product.id).await;
    assert!(matches!(blocked, Err(AppError::BadRequest(_))));

    // An admin cannot strip their own admin role.
    let self_demotion = user_service::update_user(
        &state,
        &auth_admin,
        admin_id,
        UpdateUserRequest {
            name: None,
            role: Some("CUSTOMER".into()),
        },
    )
    .await;
    assert!(matches!(self_demotion, Err(AppError::BadRequest(_))));

    // Promoting another user is fine.
    let promoted = user_service::update_user(
        &state,
        &auth_admin,
        customer_id,
        UpdateUserRequest {
            name: Some("Store Helper".into()),
            role: Some("ADMIN".into()),
        },
    )
    .await?;
    let promoted = promoted.data.unwrap();
    assert_eq!(promoted.role, "ADMIN");
    assert_eq!(promoted.name.as_deref(), Some("Store Helper"));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, inventory, audit_logs, products, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: NotSet,
        role: Set(role.into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

fn product_request(name: &str, initial_quantity: i32) -> CreateProductRequest {
    CreateProductRequest {
        name: name.to_string(),
        description: "Cozy pull-over poncho".into(),
        price: 4500,
        category: "poncho".into(),
        images: None,
        tags: Some(vec!["winter".into()]),
        fabric_options: Some(vec!["fleece".into()]),
        sizes: Some(vec!["2T".into(), "3T".into()]),
        featured: Some(true),
        customizable: None,
        turnaround: "2-3 weeks".into(),
        car_seat_friendly: Some(true),
        initial_quantity: Some(initial_quantity),
        low_stock_threshold: None,
    }
}

fn custom_order(product_id: Option<Uuid>) -> CustomOrderRequest {
    CustomOrderRequest {
        name: "Jamie Parent".into(),
        email: "jamie@example.com".into(),
        phone: None,
        child_size: "2T".into(),
        product_type: "poncho".into(),
        fabric_preference: Some("fleece".into()),
        personalization: Some("Initials on the hood".into()),
        deadline: None,
        car_seat_friendly_requested: Some(true),
        image_url: None,
        product_id,
    }
}

fn status_update(status: &str) -> axum_storefront_api::dto::orders::UpdateOrderRequest {
    axum_storefront_api::dto::orders::UpdateOrderRequest {
        status: Some(status.to_string()),
        name: None,
        email: None,
        phone: None,
        child_size: None,
        product_type: None,
        fabric_preference: None,
        personalization: None,
        deadline: None,
        car_seat_friendly_requested: None,
        image_url: None,
    }
}
