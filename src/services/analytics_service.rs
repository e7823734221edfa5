use std::collections::BTreeMap;

use chrono::{NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter};

use crate::dto::analytics::{
    AnalyticsBreakdowns, AnalyticsQuery, AnalyticsReport, AnalyticsSummary,
};
use crate::{
    entity::{
        inventory::{Column as InvCol, Entity as InventoryEntity},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Back-office dashboard numbers. Order volume is small (lead capture, manual
/// fulfilment), so the breakdowns are computed over the filtered set in memory.
pub async fn get_report(
    state: &AppState,
    user: &AuthUser,
    query: AnalyticsQuery,
) -> AppResult<ApiResponse<AnalyticsReport>> {
    ensure_admin(user)?;

    let mut condition = Condition::all();
    if let Some(start) = query.start_date {
        let start = start.and_time(NaiveTime::MIN).and_utc();
        condition = condition.add(OrderCol::CreatedAt.gte(start));
    }
    if let Some(end) = query.end_date {
        let end = (end + chrono::Days::new(1)).and_time(NaiveTime::MIN).and_utc();
        condition = condition.add(OrderCol::CreatedAt.lt(end));
    }

    let orders = Orders::find().filter(condition).all(&state.orm).await?;

    let count_status = |status: &str| orders.iter().filter(|o| o.status == status).count() as i64;
    let total_orders = orders.len() as i64;
    let pending_orders = count_status("PENDING");
    let confirmed_orders = count_status("CONFIRMED");
    let in_progress_orders = count_status("IN_PROGRESS");
    let completed_orders = count_status("COMPLETED");
    let cancelled_orders = count_status("CANCELLED");

    let total_revenue = completed_revenue(state, &orders).await?;
    let average_order_value = if completed_orders > 0 {
        total_revenue / completed_orders
    } else {
        0
    };

    let total_products = Products::find().count(&state.orm).await? as i64;
    let low_stock_items = InventoryEntity::find()
        .filter(Expr::col(InvCol::Quantity).lte(Expr::col(InvCol::LowStockThreshold)))
        .count(&state.orm)
        .await? as i64;

    let mut by_product_type: BTreeMap<String, i64> = BTreeMap::new();
    let mut by_month: BTreeMap<String, i64> = BTreeMap::new();
    for order in &orders {
        *by_product_type
            .entry(order.product_type.clone())
            .or_insert(0) += 1;
        let month = order
            .created_at
            .with_timezone(&Utc)
            .format("%Y-%m")
            .to_string();
        *by_month.entry(month).or_insert(0) += 1;
    }

    let report = AnalyticsReport {
        summary: AnalyticsSummary {
            total_orders,
            pending_orders,
            confirmed_orders,
            in_progress_orders,
            completed_orders,
            cancelled_orders,
            total_revenue,
            average_order_value,
            total_products,
            low_stock_items,
        },
        breakdowns: AnalyticsBreakdowns {
            by_product_type,
            by_month,
        },
    };

    Ok(ApiResponse::success(
        "Analytics",
        report,
        Some(Meta::empty()),
    ))
}

/// Revenue only counts COMPLETED orders, and only through their line items;
/// pure lead-capture orders without items contribute nothing.
async fn completed_revenue(state: &AppState, orders: &[OrderModel]) -> AppResult<i64> {
    let completed_ids: Vec<_> = orders
        .iter()
        .filter(|o| o.status == "COMPLETED")
        .map(|o| o.id)
        .collect();
    if completed_ids.is_empty() {
        return Ok(0);
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(completed_ids))
        .all(&state.orm)
        .await?;

    Ok(items
        .iter()
        .map(|item| item.price * item.quantity as i64)
        .sum())
}
