use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::jwt::{Claims, verify_jwt_token};
use crate::{error::ApiError, state::AuthConfig};

/// Name of the encrypted cookie that carries the token
pub const AUTH_COOKIE: &str = "auth_token";

/// Authenticated user extractor
///
/// Use this in route handlers to ensure the user is authenticated. The token
/// is read from the `Authorization: Bearer` header, falling back to the
/// private `auth_token` cookie.
///
/// # Example
/// ```
/// use axum::extract::State;
/// use dsa_api::{error::ApiError, auth::AuthUser, ApiState};
///
/// async fn protected_route(
///     auth_user: AuthUser,
///     State(state): State<ApiState>,
/// ) -> Result<(), ApiError> {
///     // auth_user.user_id and auth_user.email are available
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl AuthUser {
    fn from_claims(claims: Claims) -> Result<Self, ApiError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Auth("Invalid user ID in token".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }

    /// Make sure the user has a row before anything references it.
    pub async fn record_seen<'e, E>(&self, executor: E) -> Result<(), ApiError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        dsa_db::repositories::user::upsert_seen(
            executor,
            self.user_id,
            &self.email,
            self.name.as_deref(),
            &self.role,
        )
        .await
        .map_err(ApiError::Database)?;
        Ok(())
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);

        let token = match bearer_token(parts) {
            Some(token) => token,
            None => {
                let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::Auth("Failed to read cookies".to_string()))?;

                jar.get(AUTH_COOKIE)
                    .ok_or(ApiError::Auth("Not authenticated".to_string()))?
                    .value()
                    .to_owned()
            }
        };

        let claims = verify_jwt_token(&token, &auth_config.jwt_secret)?;
        Self::from_claims(claims)
    }
}

/// Authenticated user holding the `admin` role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != super::jwt::ROLE_ADMIN {
            tracing::warn!(user_id = %user.user_id, "non-admin attempted admin access");
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}
