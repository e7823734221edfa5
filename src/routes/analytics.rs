use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::analytics::{AnalyticsQuery, AnalyticsReport},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_analytics))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    params(
        ("start_date" = Option<String>, Query, description = "Inclusive lower bound, YYYY-MM-DD"),
        ("end_date" = Option<String>, Query, description = "Inclusive upper bound, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Order and inventory statistics", body = ApiResponse<AnalyticsReport>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<ApiResponse<AnalyticsReport>>> {
    let resp = analytics_service::get_report(&state, &user, query).await?;
    Ok(Json(resp))
}
