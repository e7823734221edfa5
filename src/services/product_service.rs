use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    audit::log_audit_or_warn,
    entity::{
        inventory::ActiveModel as InventoryActive,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub const PRODUCT_CATEGORIES: [&str; 9] = [
    "poncho",
    "pajamas",
    "pants",
    "shirt",
    "booties",
    "gloves",
    "set",
    "accessory",
    "other",
];

pub fn validate_category(category: &str) -> Result<(), AppError> {
    if PRODUCT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid category".into()))
    }
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if query.featured.unwrap_or(false) {
        condition = condition.add(Column::Featured.eq(true));
    }

    let mut finder = Products::find().filter(condition);

    // The storefront default is featured items first, newest within each group.
    finder = match query.sort_by {
        None => finder
            .order_by_desc(Column::Featured)
            .order_by_desc(Column::CreatedAt),
        Some(sort_by) => {
            let sort_col = match sort_by {
                ProductSortBy::CreatedAt => Column::CreatedAt,
                ProductSortBy::Price => Column::Price,
                ProductSortBy::Name => Column::Name,
            };
            match query.sort_order.unwrap_or(SortOrder::Desc) {
                SortOrder::Asc => finder.order_by_asc(sort_col),
                SortOrder::Desc => finder.order_by_desc(sort_col),
            }
        }
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    validate_category(&payload.category)?;
    if payload.price < 0 {
        return Err(AppError::BadRequest("Price must be non-negative".into()));
    }
    let initial_quantity = payload.initial_quantity.unwrap_or(0);
    if initial_quantity < 0 {
        return Err(AppError::BadRequest(
            "Initial quantity must be non-negative".into(),
        ));
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category),
        images: Set(to_json_list(payload.images)),
        tags: Set(to_json_list(payload.tags)),
        fabric_options: Set(to_json_list(payload.fabric_options)),
        sizes: Set(to_json_list(payload.sizes)),
        featured: Set(payload.featured.unwrap_or(false)),
        customizable: Set(payload.customizable.unwrap_or(true)),
        turnaround: Set(payload.turnaround),
        car_seat_friendly: Set(payload.car_seat_friendly),
        created_at: NotSet,
        updated_at: NotSet,
    };

    // Product and its inventory row come into existence together.
    let txn = state.orm.begin().await?;
    let product = active.insert(&txn).await?;
    InventoryActive {
        product_id: Set(product.id),
        quantity: Set(initial_quantity),
        reserved_quantity: Set(0),
        low_stock_threshold: Set(payload.low_stock_threshold.unwrap_or(5)),
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Some(category) = payload.category.as_deref() {
        validate_category(category)?;
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("Price must be non-negative".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(images) = payload.images {
        active.images = Set(to_json_list(Some(images)));
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(to_json_list(Some(tags)));
    }
    if let Some(fabric_options) = payload.fabric_options {
        active.fabric_options = Set(to_json_list(Some(fabric_options)));
    }
    if let Some(sizes) = payload.sizes {
        active.sizes = Set(to_json_list(Some(sizes)));
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    if let Some(customizable) = payload.customizable {
        active.customizable = Set(customizable);
    }
    if let Some(turnaround) = payload.turnaround {
        active.turnaround = Set(turnaround);
    }
    if let Some(car_seat_friendly) = payload.car_seat_friendly {
        active.car_seat_friendly = Set(car_seat_friendly);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let referencing_items = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if referencing_items > 0 {
        return Err(AppError::BadRequest(
            "Product has order items and cannot be deleted".into(),
        ));
    }

    // Inventory row goes with the product (ON DELETE CASCADE).
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn to_json_list(values: Option<Vec<String>>) -> serde_json::Value {
    serde_json::Value::Array(
        values
            .unwrap_or_default()
            .into_iter()
            .map(serde_json::Value::String)
            .collect(),
    )
}

pub(crate) fn string_list(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category: model.category,
        images: string_list(model.images),
        tags: string_list(model.tags),
        fabric_options: string_list(model.fabric_options),
        sizes: string_list(model.sizes),
        featured: model.featured,
        customizable: model.customizable,
        turnaround: model.turnaround,
        car_seat_friendly: model.car_seat_friendly,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_set_accepts_known_values() {
        for category in PRODUCT_CATEGORIES {
            assert!(validate_category(category).is_ok());
        }
    }

    #[test]
    fn category_set_rejects_unknown_values() {
        assert!(validate_category("swimwear").is_err());
        assert!(validate_category("").is_err());
        assert!(validate_category("PONCHO").is_err());
    }

    #[test]
    fn string_list_tolerates_malformed_json() {
        assert_eq!(
            string_list(serde_json::json!(["cotton", "fleece"])),
            vec!["cotton".to_string(), "fleece".to_string()]
        );
        assert!(string_list(serde_json::json!({"not": "a list"})).is_empty());
    }
}
