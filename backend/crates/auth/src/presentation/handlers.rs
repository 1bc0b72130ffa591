//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use kernel::error::app_error::AppError;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountQueryUseCase, ActivateAccountUseCase, LoginInput, LoginUseCase,
    NotificationDispatcher, RegisterInput, RegisterUseCase, ValidateTokenUseCase,
};
use crate::domain::notifier::VerificationMessage;
use crate::domain::repository::IdentityStore;
use crate::domain::services::CredentialHasher;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::JwtTokenService;
use crate::presentation::dto::{
    AccountResponse, LoginRequest, LoginResponse, MessageResponse, PagedResult, RegisterRequest,
    ValidateTokenResponse, VerifyQuery,
};
use crate::presentation::middleware::extract_bearer;

/// Shared state for identity handlers
pub struct AuthAppState<R>
where
    R: IdentityStore + Sync + 'static,
{
    pub store: Arc<R>,
    pub tokens: Arc<JwtTokenService>,
    pub hasher: CredentialHasher,
    pub config: Arc<AuthConfig>,
    pub notifications: NotificationDispatcher,
}

impl<R> AuthAppState<R>
where
    R: IdentityStore + Sync + 'static,
{
    pub fn new(store: Arc<R>, config: Arc<AuthConfig>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            tokens: Arc::new(JwtTokenService::from_config(&config)),
            hasher: CredentialHasher::new(config.pepper(), config.hash_timeout),
            config,
            notifications,
        }
    }
}

impl<R> Clone for AuthAppState<R>
where
    R: IdentityStore + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
            hasher: self.hasher.clone(),
            config: Arc::clone(&self.config),
            notifications: self.notifications.clone(),
        }
    }
}

fn bad_body(rejection: JsonRejection) -> AuthError {
    AuthError::InvalidInput(AppError::bad_request(rejection.body_text()))
}

fn bad_query(rejection: QueryRejection) -> AuthError {
    AuthError::InvalidInput(AppError::bad_request(rejection.body_text()))
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<MessageResponse>)>
where
    R: IdentityStore + Sync + 'static,
{
    let Json(req) = payload.map_err(bad_body)?;

    let use_case = RegisterUseCase::new(
        state.store.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            profile_image: req.profile_image,
            role: req.role,
        })
        .await?;

    // Fire and forget; the account exists regardless of delivery
    state.notifications.dispatch(VerificationMessage {
        address: output.email,
        account_id: output.account_id,
        token: output.verification_token,
    });

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered, please verify email")),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<LoginResponse>>
where
    R: IdentityStore + Sync + 'static,
{
    let Json(req) = payload.map_err(bad_body)?;

    let use_case = LoginUseCase::new(
        state.store.clone(),
        state.tokens.clone(),
        state.hasher.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        id: output.account_id.to_string(),
        access_token: output.session_token,
    }))
}

// ============================================================================
// Validate / Verify
// ============================================================================

/// POST /api/auth/validate
pub async fn validate_token<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<ValidateTokenResponse>>
where
    R: IdentityStore + Sync + 'static,
{
    let token = extract_bearer(&headers)?;
    let who = ValidateTokenUseCase::new(state.tokens.clone()).execute(token)?;
    Ok(Json(who.into()))
}

/// GET /api/auth/verify?token=..&user_id=..
pub async fn verify_email<R>(
    State(state): State<AuthAppState<R>>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> AuthResult<Json<MessageResponse>>
where
    R: IdentityStore + Sync + 'static,
{
    let Query(query) = query.map_err(bad_query)?;

    let use_case = ActivateAccountUseCase::new(
        state.store.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );
    use_case
        .execute(&query.token, query.user_id.as_deref())
        .await?;

    Ok(Json(MessageResponse::new("Account activated")))
}

// ============================================================================
// Accounts
// ============================================================================

/// GET /api/user
pub async fn list_accounts<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<PagedResult<AccountResponse>>>
where
    R: IdentityStore + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.store.clone(), state.config.clone());
    let accounts = use_case.list_active().await?;
    Ok(Json(PagedResult::new(
        accounts.into_iter().map(AccountResponse::from).collect(),
    )))
}

/// GET /api/user/{id}
pub async fn get_account<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<String>,
) -> AuthResult<Json<AccountResponse>>
where
    R: IdentityStore + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.store.clone(), state.config.clone());
    let account = use_case.get(&id).await?;
    Ok(Json(account.into()))
}

/// GET /api/user/batch/{ids}
pub async fn get_accounts_batch<R>(
    State(state): State<AuthAppState<R>>,
    Path(ids): Path<String>,
) -> AuthResult<Json<PagedResult<AccountResponse>>>
where
    R: IdentityStore + Sync + 'static,
{
    let use_case = AccountQueryUseCase::new(state.store.clone(), state.config.clone());
    let accounts = use_case.get_many(&ids).await?;
    Ok(Json(PagedResult::new(
        accounts.into_iter().map(AccountResponse::from).collect(),
    )))
}
