use crate::config::auth::AuthConfig;
use crate::domain::{Officer, ReportingUser, Role};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthSession;
use crate::repository::Storage;
use crate::response::ApiResponse;
use crate::services::account::{Account, AccountService, UserRegistration};
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::timestamp;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserRequest {
    /// Full name
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    /// Email address (case-insensitive, unique)
    #[validate(email)]
    pub email: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
    /// Phone number
    #[validate(length(min = 1, max = 30))]
    pub phone: String,
    pub address: Option<String>,
    /// Date of birth, `YYYY-MM-DD`
    #[serde(alias = "dateOfBirth")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(alias = "emergencyContact")]
    pub emergency_contact: Option<String>,
    #[serde(alias = "emergencyPhone")]
    pub emergency_phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterOfficerRequest {
    /// Badge number (unique)
    #[serde(alias = "badgeNumber")]
    #[validate(length(min = 1, max = 50))]
    pub badge_number: String,
    /// Police station
    #[validate(length(min = 1, max = 100))]
    pub station: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginOfficerRequest {
    #[serde(alias = "badgeNumber")]
    pub badge_number: String,
    pub station: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub created_at: String,
}

impl From<ReportingUser> for UserResponse {
    fn from(u: ReportingUser) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            address: u.address,
            date_of_birth: u.date_of_birth.map(|d| d.to_string()),
            emergency_contact: u.emergency_contact,
            emergency_phone: u.emergency_phone,
            created_at: timestamp(u.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OfficerResponse {
    pub id: i32,
    pub badge_number: String,
    pub station: String,
    /// Whether the account may log in
    pub approved: bool,
    pub approved_at: Option<String>,
    pub created_at: String,
}

impl From<Officer> for OfficerResponse {
    fn from(o: Officer) -> Self {
        Self {
            id: o.id,
            badge_number: o.badge_number,
            station: o.station,
            approved: o.approved,
            approved_at: o.approved_at.map(timestamp),
            created_at: timestamp(o.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    pub account_id: i32,
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub role: Role,
    pub user: Option<UserResponse>,
    pub officer: Option<OfficerResponse>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/users/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Email already registered", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register_user(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<AuthConfig>,
    Json(payload): Json<RegisterUserRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AccountService::new(storage, config);
    let user = service
        .register_user(UserRegistration {
            full_name: payload.full_name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            address: payload.address,
            date_of_birth: payload.date_of_birth,
            emergency_contact: payload.emergency_contact,
            emergency_phone: payload.emergency_phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            UserResponse::from(user),
            "Registration successful.".to_string(),
        ),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/users/login",
    request_body = LoginUserRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login_user(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<AuthConfig>,
    Json(payload): Json<LoginUserRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AccountService::new(storage, config);
    let (user, token) = service.login_user(&payload.email, &payload.password).await?;

    Ok(ApiResponse::ok(SessionResponse {
        token,
        account_id: user.id,
        role: Role::User,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/officers/register",
    request_body = RegisterOfficerRequest,
    responses(
        (status = 201, description = "Officer registered, pending approval", body = OfficerResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Badge number already registered", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register_officer(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<AuthConfig>,
    Json(payload): Json<RegisterOfficerRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AccountService::new(storage, config);
    let officer = service
        .register_officer(&payload.badge_number, &payload.station, &payload.password)
        .await?;

    let message = if officer.approved {
        "Officer registered.".to_string()
    } else {
        "Officer registered. Please wait for approval before logging in.".to_string()
    };

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(OfficerResponse::from(officer), message),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/officers/login",
    request_body = LoginOfficerRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
        (status = 403, description = "Account awaiting approval", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login_officer(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<AuthConfig>,
    Json(payload): Json<LoginOfficerRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AccountService::new(storage, config);
    let (officer, token) = service
        .login_officer(&payload.badge_number, &payload.station, &payload.password)
        .await?;

    Ok(ApiResponse::ok(SessionResponse {
        token,
        account_id: officer.id,
        role: Role::Officer,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current account", body = MeResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_account(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<AuthConfig>,
    session: AuthSession,
) -> AppResult<impl IntoResponse> {
    let service = AccountService::new(storage, config);
    let response = match service.current_account(&session).await? {
        Account::User(user) => MeResponse {
            role: Role::User,
            user: Some(user.into()),
            officer: None,
        },
        Account::Officer(officer) => MeResponse {
            role: Role::Officer,
            user: None,
            officer: Some(officer.into()),
        },
    };
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    put,
    path = "/api/v1/officers/{id}/approve",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Officer ID")),
    responses(
        (status = 200, description = "Officer approved", body = OfficerResponse),
        (status = 403, description = "Officer session required", body = AppError),
        (status = 404, description = "Officer not found", body = AppError),
    ),
    tag = "auth"
)]
pub async fn approve_officer(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<AuthConfig>,
    session: AuthSession,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let approver_id = session.require_officer()?;
    let service = AccountService::new(storage, config);
    let officer = service.approve_officer(approver_id, id).await?;
    Ok(ApiResponse::ok(OfficerResponse::from(officer)))
}
