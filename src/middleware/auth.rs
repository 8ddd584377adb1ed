use axum::{extract::FromRequestParts, http::header};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::TokenPurpose,
    entity::Users,
    error::{AppError, AppResult},
    models::Role,
    state::AppState,
};

/// The principal behind a request, resolved from its bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

fn bearer_token(parts: &axum::http::request::Parts) -> AppResult<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token, TokenPurpose::Session)?;
        let user_id = claims.user_id()?;

        // A token for a deleted account gets the same 401 as a bad token.
        let user = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(AppError::unauthenticated)?;

        Ok(AuthUser {
            user_id: user.id,
            role: Role::parse(&user.role).unwrap_or(Role::Customer),
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "someone@x.com".into(),
            role,
        }
    }

    #[test]
    fn admin_gate_only_passes_admins() {
        assert!(ensure_admin(&principal(Role::Admin)).is_ok());
        assert!(matches!(
            ensure_admin(&principal(Role::Customer)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn bearer_scheme_is_required() {
        let (mut parts, _) = axum::http::Request::builder()
            .header(header::AUTHORIZATION, "Token abc")
            .body(())
            .unwrap()
            .into_parts();
        assert!(matches!(bearer_token(&parts), Err(AppError::Unauthorized(_))));

        parts.headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&parts).unwrap(), "abc");

        parts.headers.remove(header::AUTHORIZATION);
        assert!(matches!(bearer_token(&parts), Err(AppError::Unauthorized(_))));
    }
}
