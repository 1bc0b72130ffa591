//! Auth Middleware
//!
//! Bearer-token extraction and the session gate for protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::ValidateTokenUseCase;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::JwtTokenService;

/// Token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthorizationFormat)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthorizationFormat);
    }
    Ok(token)
}

/// Require a valid session token
///
/// On success the `AuthenticatedAccount` is placed in request extensions.
pub async fn require_session(
    State(tokens): State<Arc<JwtTokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer(req.headers())?;
    let who = ValidateTokenUseCase::new(tokens).execute(token)?;

    req.extensions_mut().insert(who);
    Ok(next.run(req).await)
}
