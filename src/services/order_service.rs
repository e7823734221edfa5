use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::orders::{
    CreateOrderRequest, CustomOrderRequest, OrderCreated, OrderList, OrderWithItems,
    UpdateOrderRequest,
};
use crate::{
    audit::log_audit_or_warn,
    entity::{
        order_items::{
            Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::inventory_service,
    state::AppState,
};

pub const ORDER_STATUSES: [&str; 5] = [
    "PENDING",
    "CONFIRMED",
    "IN_PROGRESS",
    "COMPLETED",
    "CANCELLED",
];

pub fn validate_order_status(status: &str) -> Result<(), AppError> {
    if ORDER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid order status".into()))
    }
}

/// Public lead-capture entry point. The order is recorded even when the
/// inventory reservation fails; the miss is only logged. Custom-only products
/// carry no inventory row at all, so a hard failure here would lose leads.
pub async fn create_lead_order(
    state: &AppState,
    payload: CustomOrderRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    let order = insert_order(state, None, payload).await?;

    log_audit_or_warn(
        &state.pool,
        None,
        "custom_order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order request received",
        OrderCreated { id: order.id },
        Some(Meta::empty()),
    ))
}

/// Admin-side direct creation, used when an order arrives by phone or email.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = insert_order(state, payload.user_id, payload.order).await?;

    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

async fn insert_order(
    state: &AppState,
    user_id: Option<Uuid>,
    payload: CustomOrderRequest,
) -> AppResult<OrderModel> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("Name and email are required".into()));
    }
    if payload.child_size.trim().is_empty() || payload.product_type.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Child size and product type are required".into(),
        ));
    }

    if let Some(product_id) = payload.product_id {
        if let Err(err) = inventory_service::reserve(state, product_id, 1).await {
            tracing::warn!(%product_id, error = %err, "could not reserve inventory for order");
        }
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(payload.product_id),
        status: Set("PENDING".into()),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        child_size: Set(payload.child_size),
        product_type: Set(payload.product_type),
        fabric_preference: Set(payload.fabric_preference),
        personalization: Set(payload.personalization),
        deadline: Set(payload.deadline.map(Into::into)),
        car_seat_friendly_requested: Set(payload.car_seat_friendly_requested.unwrap_or(false)),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(order)
}

/// Admins see every order with filtering; customers only their own.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if user.is_admin() {
        if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
            condition = condition.add(OrderCol::Status.eq(status.clone()));
        }
    } else {
        condition = condition.add(OrderCol::UserId.eq(user.user_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if !user.is_admin() && order.user_id != Some(user.user_id) {
        return Err(AppError::Forbidden);
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Status moves freely between members of the enumerated set; there is no
/// transition table. Cancelling does not release any reservation.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    if let Some(status) = payload.status.as_deref() {
        validate_order_status(status)?;
    }

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let status_changed = payload.status.is_some();

    let mut active: OrderActive = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(child_size) = payload.child_size {
        active.child_size = Set(child_size);
    }
    if let Some(product_type) = payload.product_type {
        active.product_type = Set(product_type);
    }
    if let Some(fabric_preference) = payload.fabric_preference {
        active.fabric_preference = Set(Some(fabric_preference));
    }
    if let Some(personalization) = payload.personalization {
        active.personalization = Set(Some(personalization));
    }
    if let Some(deadline) = payload.deadline {
        active.deadline = Set(Some(deadline.into()));
    }
    if let Some(requested) = payload.car_seat_friendly_requested {
        active.car_seat_friendly_requested = Set(requested);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    let action = if status_changed {
        "order_status_update"
    } else {
        "order_update"
    };
    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        action,
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        status: model.status,
        name: model.name,
        email: model.email,
        phone: model.phone,
        child_size: model.child_size,
        product_type: model.product_type,
        fabric_preference: model.fabric_preference,
        personalization: model.personalization,
        deadline: model.deadline.map(|dt| dt.with_timezone(&Utc)),
        car_seat_friendly_requested: model.car_seat_friendly_requested,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_set_accepts_known_values() {
        for status in ORDER_STATUSES {
            assert!(validate_order_status(status).is_ok());
        }
    }

    #[test]
    fn status_set_rejects_unknown_values() {
        assert!(validate_order_status("SHIPPED").is_err());
        assert!(validate_order_status("pending").is_err());
        assert!(validate_order_status("").is_err());
    }
}
