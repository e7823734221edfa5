use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::orders::{CustomOrderRequest, OrderCreated},
    error::AppResult,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit))
}

#[utoipa::path(
    post,
    path = "/api/custom-order",
    request_body = CustomOrderRequest,
    responses(
        (status = 200, description = "Lead captured as a PENDING order", body = ApiResponse<OrderCreated>),
        (status = 400, description = "Missing required fields"),
    ),
    tag = "Orders"
)]
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<CustomOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let resp = order_service::create_lead_order(&state, payload).await?;
    Ok(Json(resp))
}
