use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::auth::password;
use crate::database::models::user;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::serializers::user::{user_response, UserResponse};
use crate::state::AppState;
use crate::validators::user::{
    validate_login, validate_register, validate_update, LoginRequest, RegisterRequest,
    UpdateUserRequest,
};
use crate::validators::ValidationErrors;

/// POST /api/users - Register a new account
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(RegisterRequest { user: req }) = payload?;
    validate_register(&state.pool, &req).await?;

    let hash = password::hash_password(&req.password, state.config.security.bcrypt_cost)?;
    let created = user::create_user(&state.pool, &req.username, &req.email, &hash).await?;

    let token = state.tokens.issue(created.id)?;
    tracing::info!("registered account {}", created.username);

    Ok(ApiResponse::created(user_response(&created, token)))
}

/// POST /api/users/login - Exchange credentials for a fresh token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(LoginRequest { user: req }) = payload?;
    validate_login(&req)?;

    let account = user::find_user_by_email(&state.pool, &req.email).await?;
    let verified = account
        .as_ref()
        .map(|u| password::verify_password(&req.password, &u.password_hash))
        .unwrap_or(false);

    let Some(account) = account.filter(|_| verified) else {
        // One message for unknown email and wrong password alike
        let mut errors = ValidationErrors::new();
        errors.add("email or password", "is invalid");
        return Err(errors.into());
    };

    let token = state.tokens.issue(account.id)?;
    Ok(ApiResponse::success(user_response(&account, token)))
}

/// GET /api/user - Current account, with a re-issued token
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
) -> ApiResult<UserResponse> {
    let token = state.tokens.issue(account.id)?;
    Ok(ApiResponse::success(user_response(&account, token)))
}

/// PUT /api/user - Update the current account; absent fields stay untouched
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(account): AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(UpdateUserRequest { user: req }) = payload?;
    validate_update(&state.pool, account.id, &req).await?;

    let mut changed = account;
    if let Some(username) = req.username {
        changed.username = username;
    }
    if let Some(email) = req.email {
        changed.email = email;
    }
    if let Some(plaintext) = req.password {
        changed.password_hash =
            password::hash_password(&plaintext, state.config.security.bcrypt_cost)?;
    }
    if let Some(bio) = req.bio {
        changed.bio = bio;
    }
    if let Some(image) = req.image {
        changed.image = Some(image);
    }

    let updated = user::update_user(&state.pool, &changed).await?;
    let token = state.tokens.issue(updated.id)?;

    Ok(ApiResponse::success(user_response(&updated, token)))
}
