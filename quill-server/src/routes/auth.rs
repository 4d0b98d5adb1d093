use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use quill_core::{Account, AuthToken, Email, NewAccount, ProfileUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::routes::rfc3339;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
}

impl AuthResponse {
    fn new(account: Account, token: AuthToken) -> Self {
        Self {
            id: account.id.get(),
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            token: token.value,
        }
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: String,
}

impl ProfileResponse {
    fn new(account: Account) -> Self {
        Self {
            id: account.id.get(),
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            date_joined: rfc3339(account.created_at),
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let email = Email::parse(&body.email)?;
    let (account, token) = state
        .accounts
        .register(NewAccount {
            email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(account, token))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (account, token) = state.accounts.login(&body.email, &body.password).await?;
    Ok(Json(AuthResponse::new(account, token)))
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = state.accounts.account(user).await?;
    Ok(Json(ProfileResponse::new(account)))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = state
        .accounts
        .update_profile(
            user,
            ProfileUpdate {
                first_name: body.first_name,
                last_name: body.last_name,
            },
        )
        .await?;
    Ok(Json(ProfileResponse::new(account)))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .accounts
        .change_password(user, &body.old_password, &body.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password changed successfully." })))
}

/// POST /api/auth/delete-account
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<DeleteAccountRequest>,
) -> ApiResult<Json<Value>> {
    state.accounts.delete_account(user, &body.password).await?;
    Ok(Json(json!({ "message": "Account deleted successfully." })))
}
