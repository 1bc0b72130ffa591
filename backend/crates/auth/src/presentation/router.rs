//! Identity Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::IdentityStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_session;

/// Routes under `/api/auth`
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: IdentityStore + Sync + 'static,
{
    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/validate", post(handlers::validate_token::<R>))
        .route("/verify", get(handlers::verify_email::<R>))
        .with_state(state)
}

/// Routes under `/api/user`
///
/// Gated behind a session token when `protect_account_routes` is set.
pub fn account_router<R>(state: AuthAppState<R>) -> Router
where
    R: IdentityStore + Sync + 'static,
{
    let router = Router::new()
        .route("/", get(handlers::list_accounts::<R>))
        .route("/{id}", get(handlers::get_account::<R>))
        .route("/batch/{ids}", get(handlers::get_accounts_batch::<R>));

    let router = if state.config.protect_account_routes {
        router.route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_session,
        ))
    } else {
        router
    };

    router.with_state(state)
}

/// Full identity surface: `/api/auth` and `/api/user`
pub fn identity_router<R>(state: AuthAppState<R>) -> Router
where
    R: IdentityStore + Sync + 'static,
{
    Router::new()
        .nest("/api/auth", auth_router(state.clone()))
        .nest("/api/user", account_router(state))
}
