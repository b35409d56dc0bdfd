//! Authentication endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use obra_auth_core::Role;
use obra_common::parse_uuid_lenient;
use obra_common::TenantId;
use obra_errors::AppError;
use obra_cqrs_core::{CommandHandler, QueryHandler};
use serde::{Deserialize, Serialize};

use crate::api::extract::AuthClaims;
use crate::api::AppState;
use crate::application::auth::{
    ConfirmPasswordResetCommand, CreateUserCommand, LoginCommand, MeQuery,
    RefreshTokenCommand, RequestPasswordResetCommand,
};
use crate::domain::entities::{User, UserStatus};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub tenant_id: Option<String>,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

/// User representation that never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub tenant_id: Option<String>,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            tenant_id: user.tenant_id.map(|t| t.to_string()),
            email: user.email.to_string(),
            display_name: user.display_name,
            role: user.role,
            active: user.status == UserStatus::Active,
            last_login_at: user.last_login_at,
            created_at: user.audit_info.created_at,
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state
        .auth
        .handle(LoginCommand {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state
        .auth
        .handle(RefreshTokenCommand {
            refresh_token: body.refresh_token,
        })
        .await?;

    Ok(Json(tokens))
}

pub async fn me(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth
        .execute(MeQuery {
            actor: claims.actor()?,
        })
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .handle(RequestPasswordResetCommand { email: body.email })
        .await?;

    // always 200: the response must not reveal whether the email exists
    Ok(Json(serde_json::json!({
        "message": "If the email is registered, a reset link has been sent"
    })))
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetConfirm>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .handle(ConfirmPasswordResetCommand {
            token: body.token,
            new_password: body.new_password,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_user(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = body
        .tenant_id
        .as_deref()
        .and_then(parse_uuid_lenient)
        .map(TenantId::from_uuid);

    let user = state
        .auth
        .handle(CreateUserCommand {
            actor: claims.actor()?,
            tenant_id,
            email: body.email,
            password: body.password,
            display_name: body.display_name,
            role: body.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
