use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::{authenticate, AuthUser};

/// Middleware that requires a valid bearer token for all requests.
/// Apply this to routers whose every route is user-scoped; the resolved user
/// is stored in the request extensions for [`AuthUser`] to pick up.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match authenticate(&state, request.headers()) {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };

    request.extensions_mut().insert(AuthUser(user));
    next.run(request).await
}
