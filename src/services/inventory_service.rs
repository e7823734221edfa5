use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use crate::dto::inventory::{
    Availability, InventoryActionRequest, InventoryItem, InventoryList, InventoryListQuery,
};
use crate::{
    audit::log_audit_or_warn,
    entity::{
        inventory::{
            ActiveModel as InventoryActive, Column as InvCol, Entity as InventoryEntity,
            Model as InventoryModel,
        },
        products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Inventory,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Stock still open to new reservations. Clamped so a row that drifted into
/// over-reservation reads as zero rather than a negative count.
pub fn available(quantity: i32, reserved_quantity: i32) -> i32 {
    (quantity - reserved_quantity).max(0)
}

pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
    query: InventoryListQuery,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_admin(user)?;

    let mut finder = InventoryEntity::find().find_also_related(products::Entity);
    finder = if query.low_stock.unwrap_or(false) {
        finder
            .filter(Expr::col(InvCol::Quantity).lte(Expr::col(InvCol::LowStockThreshold)))
            .order_by_asc(InvCol::Quantity)
    } else {
        finder.order_by_asc(products::Column::Name)
    };

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(inventory, product)| InventoryItem {
            inventory: inventory_from_entity(inventory),
            product_name: product.map(|p| p.name).unwrap_or_default(),
        })
        .collect();

    Ok(ApiResponse::success(
        "Inventory",
        InventoryList { items },
        Some(Meta::empty()),
    ))
}

/// Public availability check used by the storefront product page.
pub async fn get_availability(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<Availability>> {
    let inventory = InventoryEntity::find_by_id(product_id)
        .one(&state.orm)
        .await?;
    let inventory = match inventory {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let data = Availability {
        product_id,
        available: available(inventory.quantity, inventory.reserved_quantity),
    };
    Ok(ApiResponse::success("Availability", data, None))
}

pub async fn apply_action(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: InventoryActionRequest,
) -> AppResult<ApiResponse<Inventory>> {
    ensure_admin(user)?;

    let (action, updated) = match payload {
        InventoryActionRequest::Reserve { qty } => {
            ("inventory_reserve", reserve(state, product_id, qty).await?)
        }
        InventoryActionRequest::Fulfill { qty } => {
            ("inventory_fulfill", fulfill(state, product_id, qty).await?)
        }
        InventoryActionRequest::Release { qty } => {
            ("inventory_release", release(state, product_id, qty).await?)
        }
        InventoryActionRequest::SetQuantity { quantity } => (
            "inventory_set_quantity",
            set_quantity(state, product_id, quantity).await?,
        ),
        InventoryActionRequest::SetThreshold { threshold } => (
            "inventory_set_threshold",
            set_threshold(state, product_id, threshold).await?,
        ),
    };

    log_audit_or_warn(
        &state.pool,
        Some(user.user_id),
        action,
        Some("inventory"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        inventory_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Hold `qty` units against a pending order. Fails with BadRequest when the
/// available stock is short, NotFound when the product carries no inventory
/// row (custom-only products).
pub async fn reserve(
    state: &AppState,
    product_id: Uuid,
    qty: i32,
) -> AppResult<InventoryModel> {
    ensure_positive(qty)?;
    let txn = state.orm.begin().await?;
    let inventory = lock_row(&txn, product_id).await?;

    if available(inventory.quantity, inventory.reserved_quantity) < qty {
        return Err(AppError::BadRequest("Not enough stock available".into()));
    }

    let reserved = inventory.reserved_quantity + qty;
    let mut active: InventoryActive = inventory.into();
    active.reserved_quantity = Set(reserved);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Convert a reservation into a permanent depletion: both counters drop.
pub async fn fulfill(
    state: &AppState,
    product_id: Uuid,
    qty: i32,
) -> AppResult<InventoryModel> {
    ensure_positive(qty)?;
    let txn = state.orm.begin().await?;
    let inventory = lock_row(&txn, product_id).await?;

    if inventory.reserved_quantity < qty {
        return Err(AppError::BadRequest(
            "Cannot fulfill more than the reserved quantity".into(),
        ));
    }

    let quantity = inventory.quantity - qty;
    let reserved = inventory.reserved_quantity - qty;
    let mut active: InventoryActive = inventory.into();
    active.quantity = Set(quantity);
    active.reserved_quantity = Set(reserved);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Return reserved stock to availability. Floors at zero instead of failing,
/// so releasing an already-released reservation is a no-op.
pub async fn release(
    state: &AppState,
    product_id: Uuid,
    qty: i32,
) -> AppResult<InventoryModel> {
    ensure_positive(qty)?;
    let txn = state.orm.begin().await?;
    let inventory = lock_row(&txn, product_id).await?;

    let reserved = (inventory.reserved_quantity - qty).max(0);
    let mut active: InventoryActive = inventory.into();
    active.reserved_quantity = Set(reserved);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

pub async fn set_quantity(
    state: &AppState,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<InventoryModel> {
    if quantity < 0 {
        return Err(AppError::BadRequest("Quantity must be non-negative".into()));
    }
    let txn = state.orm.begin().await?;
    let inventory = lock_row(&txn, product_id).await?;

    let mut active: InventoryActive = inventory.into();
    active.quantity = Set(quantity);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

pub async fn set_threshold(
    state: &AppState,
    product_id: Uuid,
    threshold: i32,
) -> AppResult<InventoryModel> {
    if threshold < 0 {
        return Err(AppError::BadRequest(
            "Threshold must be non-negative".into(),
        ));
    }
    let txn = state.orm.begin().await?;
    let inventory = lock_row(&txn, product_id).await?;

    let mut active: InventoryActive = inventory.into();
    active.low_stock_threshold = Set(threshold);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

async fn lock_row(txn: &DatabaseTransaction, product_id: Uuid) -> AppResult<InventoryModel> {
    let inventory = InventoryEntity::find_by_id(product_id)
        .lock(LockType::Update)
        .one(txn)
        .await?;
    match inventory {
        Some(i) => Ok(i),
        None => Err(AppError::NotFound),
    }
}

fn ensure_positive(qty: i32) -> Result<(), AppError> {
    if qty <= 0 {
        return Err(AppError::BadRequest("qty must be positive".into()));
    }
    Ok(())
}

pub(crate) fn inventory_from_entity(model: InventoryModel) -> Inventory {
    Inventory {
        product_id: model.product_id,
        quantity: model.quantity,
        reserved_quantity: model.reserved_quantity,
        low_stock_threshold: model.low_stock_threshold,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_is_quantity_minus_reserved() {
        assert_eq!(available(10, 3), 7);
        assert_eq!(available(5, 5), 0);
    }

    #[test]
    fn available_never_goes_negative() {
        assert_eq!(available(2, 5), 0);
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        assert!(ensure_positive(0).is_err());
        assert!(ensure_positive(-3).is_err());
        assert!(ensure_positive(1).is_ok());
    }
}
