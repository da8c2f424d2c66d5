use crate::{
    domain::Role,
    error::{AppError, AppResult},
    repository::Storage,
    utils::jwt::decode_session_token,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSession {
    pub account_id: i32,
    pub role: Role,
}

impl AuthSession {
    /// Id of the calling officer, or `Forbidden` for a reporting-user session.
    pub fn require_officer(&self) -> AppResult<i32> {
        match self.role {
            Role::Officer => Ok(self.account_id),
            Role::User => Err(AppError::Forbidden(
                "Officer session required".to_string(),
            )),
        }
    }

    /// Id of the calling reporting user, or `Forbidden` for an officer session.
    pub fn require_reporting_user(&self) -> AppResult<i32> {
        match self.role {
            Role::User => Ok(self.account_id),
            Role::Officer => Err(AppError::Forbidden(
                "Reporting-user session required".to_string(),
            )),
        }
    }
}

/// Session middleware
///
/// Verifies the bearer token, then re-reads the account so that deleted
/// accounts and officers whose approval is missing lose access immediately.
pub async fn auth_middleware(
    Extension(storage): Extension<Storage>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = decode_session_token(&token).map_err(|_| AppError::Unauthorized)?;
    let account_id = claims.account_id().ok_or(AppError::Unauthorized)?;

    match claims.role {
        Role::User => {
            storage
                .accounts
                .find_user(account_id)
                .await?
                .ok_or(AppError::Unauthorized)?;
        }
        Role::Officer => {
            let officer = storage
                .accounts
                .find_officer(account_id)
                .await?
                .ok_or(AppError::Unauthorized)?;
            if !officer.approved {
                return Err(AppError::Forbidden(
                    "Officer account is awaiting approval".to_string(),
                ));
            }
        }
    }

    request.extensions_mut().insert(AuthSession {
        account_id,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}
