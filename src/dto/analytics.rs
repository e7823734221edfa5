use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyticsQuery {
    /// Inclusive lower bound on order creation date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on order creation date.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub confirmed_orders: i64,
    pub in_progress_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    /// Sum of `price * quantity` over line items of completed orders, in cents.
    pub total_revenue: i64,
    pub average_order_value: i64,
    pub total_products: i64,
    pub low_stock_items: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsBreakdowns {
    pub by_product_type: BTreeMap<String, i64>,
    /// Keys are `YYYY-MM`.
    pub by_month: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    pub breakdowns: AnalyticsBreakdowns,
}
