use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{Availability, InventoryActionRequest, InventoryList, InventoryListQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Inventory,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/{product_id}", get(get_availability))
        .route("/{product_id}", put(apply_action))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    params(
        ("low_stock" = Option<bool>, Query, description = "Only rows at or below their threshold")
    ),
    responses(
        (status = 200, description = "List inventory with product names", body = ApiResponse<InventoryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InventoryListQuery>,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_inventory(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Available stock for a product", body = ApiResponse<Availability>),
        (status = 404, description = "No inventory row for this product"),
    ),
    tag = "Inventory"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = inventory_service::get_availability(&state, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = InventoryActionRequest,
    responses(
        (status = 200, description = "Apply a bookkeeping action", body = ApiResponse<Inventory>),
        (status = 400, description = "Insufficient stock or invalid quantity"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No inventory row for this product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn apply_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<InventoryActionRequest>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::apply_action(&state, &user, product_id, payload).await?;
    Ok(Json(resp))
}
