use crate::api::ErrorResponse;
use crate::error::AppError;
use crate::models::{User, ROLE_ADMIN};
use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Extractor that validates the bearer token and provides the authenticated user.
///
/// Behind [`super::require_auth`] the user is already resolved and is taken
/// from the request extensions. Use `Option<AuthUser>` on public reads that
/// only personalize their output.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Like [`AuthUser`], but also requires the ADMIN role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    InvalidHeader,
    InvalidFormat,
    Rejected(AppError),
    NotAdmin,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHeader => (StatusCode::UNAUTHORIZED, "Missing Authorization header"),
            AuthError::InvalidHeader => (StatusCode::UNAUTHORIZED, "Invalid Authorization header"),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Administrator role required"),
            AuthError::Rejected(err) => return err.into_response(),
        };

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

pub(super) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;
    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

pub(super) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = bearer_token(headers)?;
    state.auth().resolve(token).map_err(AuthError::Rejected)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let state = AppState::from_ref(state);
        authenticate(&state, &parts.headers).map(AuthUser)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    /// No header means an anonymous caller. A header that does not resolve
    /// to a user is still rejected.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        if !user.has_role(ROLE_ADMIN) {
            tracing::info!(user_id = %user.id, "admin route refused");
            return Err(AuthError::NotAdmin);
        }
        Ok(AdminUser(user))
    }
}
