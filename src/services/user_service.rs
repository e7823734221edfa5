use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::dto::users::{UpdateUserRequest, UserList, UserSummary};
use crate::{
    audit::log_audit_or_warn,
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        users,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_CUSTOMER, ensure_admin},
    response::{ApiResponse, Meta},
    routes::params::UserListQuery,
    state::AppState,
};

pub const USER_ROLES: [&str; 2] = [ROLE_CUSTOMER, ROLE_ADMIN];

pub fn validate_role(role: &str) -> Result<(), AppError> {
    if USER_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid role".into()))
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    role: String,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    order_count: i64,
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Users, UserCol::Email)).ilike(pattern.clone()))
                .add(Expr::col((Users, UserCol::Name)).ilike(pattern)),
        );
    }
    if let Some(role) = query.role.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::Role.eq(role.clone()));
    }

    let total = Users::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let rows = Users::find()
        .filter(condition)
        .column_as(OrderCol::Id.count(), "order_count")
        .join(JoinType::LeftJoin, users::Relation::Orders.def())
        .group_by(UserCol::Id)
        .order_by_desc(UserCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .into_model::<UserRow>()
        .all(&state.orm)
        .await?;

    let items = rows.into_iter().map(summary_from_row).collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(meta),
    ))
}

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserSummary>> {
    ensure_admin(user)?;

    let row = Users::find_by_id(id)
        .column_as(OrderCol::Id.count(), "order_count")
        .join(JoinType::LeftJoin, users::Relation::Orders.def())
        .group_by(UserCol::Id)
        .into_model::<UserRow>()
        .one(&state.orm)
        .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success("User", summary_from_row(row), None))
}

/// Admin update of name and/or role. An admin cannot strip their own ADMIN
/// role, which keeps at least the acting session in the admin set.
pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserSummary>> {
    ensure_admin(user)?;

    if let Some(role) = payload.role.as_deref() {
        validate_role(role)?;
        if id == user.user_id && role != ROLE_ADMIN {
            return Err(AppError::BadRequest(
                "Cannot remove your own admin role".into(),
            ));
        }
    }

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let old_role = existing.role.clone();
    let role_changed = payload
        .role
        .as_deref()
        .is_some_and(|role| role != old_role);

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(Some(name));
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    if role_changed {
        log_audit_or_warn(
            &state.pool,
            Some(user.user_id),
            "user_role_update",
            Some("users"),
            Some(serde_json::json!({
                "user_id": updated.id,
                "old_role": old_role,
                "new_role": updated.role,
            })),
        )
        .await;
    } else {
        log_audit_or_warn(
            &state.pool,
            Some(user.user_id),
            "user_update",
            Some("users"),
            Some(serde_json::json!({ "user_id": updated.id })),
        )
        .await;
    }

    let order_count = Orders::find()
        .filter(OrderCol::UserId.eq(updated.id))
        .count(&state.orm)
        .await? as i64;

    let summary = UserSummary {
        id: updated.id,
        email: updated.email,
        name: updated.name,
        role: updated.role,
        created_at: updated.created_at.with_timezone(&Utc),
        updated_at: updated.updated_at.with_timezone(&Utc),
        order_count,
    };

    Ok(ApiResponse::success(
        "User updated",
        summary,
        Some(Meta::empty()),
    ))
}

fn summary_from_row(row: UserRow) -> UserSummary {
    UserSummary {
        id: row.id,
        email: row.email,
        name: row.name,
        role: row.role,
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
        order_count: row.order_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_set_accepts_known_values() {
        assert!(validate_role("ADMIN").is_ok());
        assert!(validate_role("CUSTOMER").is_ok());
    }

    #[test]
    fn role_set_rejects_unknown_values() {
        assert!(validate_role("admin").is_err());
        assert!(validate_role("SUPERUSER").is_err());
    }
}
