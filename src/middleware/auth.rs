use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_CUSTOMER: &str = "CUSTOMER";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized);
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user_id =
            Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/orders")
            .body(())
            .unwrap()
            .into_parts();
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn non_bearer_credentials_are_unauthorized() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/orders")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts();
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn admin_guard_rejects_customer() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: ROLE_CUSTOMER.into(),
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    }

    #[test]
    fn admin_guard_accepts_admin() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: ROLE_ADMIN.into(),
        };
        assert!(ensure_admin(&user).is_ok());
    }
}
