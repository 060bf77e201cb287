use auth::TokenAuthority;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::identity::errors::IdentityError;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::Role;

pub mod delete_identity;
pub mod google;
pub mod login;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod update_identity;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    BadGateway(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(_) => ApiError::NotFound(err.to_string()),
            IdentityError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            IdentityError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            IdentityError::ExternalProvider(_) => ApiError::BadGateway(err.to_string()),
            IdentityError::InvalidEmail(_)
            | IdentityError::InvalidIdentityId(_)
            | IdentityError::InvalidRole(_) => ApiError::UnprocessableEntity(err.to_string()),
            IdentityError::DatabaseError(_) | IdentityError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Client-facing identity representation.
///
/// Deliberately omits password_hash; handlers must never expose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityData {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityData {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            email: identity.email.as_str().to_string(),
            role: identity.role.as_str().to_string(),
            name: identity.name.clone(),
            picture: identity.picture.clone(),
            created_at: identity.created_at,
        }
    }
}

/// Response for flows that mint a fresh session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub identity: IdentityData,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

pub(crate) const REFRESH_COOKIE: &str = "refresh_token";

/// Accounts may act on their own record; admins may act on any.
pub(crate) fn authorize_account_access(
    current: &Identity,
    target: &IdentityId,
) -> Result<(), ApiError> {
    if current.id == *target || current.role == Role::Admin {
        return Ok(());
    }

    tracing::warn!(
        subject = %current.email,
        target = %target,
        "Rejected cross-account modification attempt"
    );
    Err(ApiError::Forbidden(
        "Not allowed to modify this identity".to_string(),
    ))
}

/// Issue both token classes for `identity` and set the refresh cookie.
///
/// The cookie Max-Age is derived from the refresh token TTL so the two
/// cannot drift apart.
pub(crate) fn mint_session(
    tokens: &TokenAuthority,
    jar: CookieJar,
    identity: &Identity,
) -> Result<(CookieJar, SessionData), ApiError> {
    let subject = identity.email.as_str();
    let role = identity.role.as_str();

    let access_token = tokens
        .issue_access(subject, Some(role))
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;
    let refresh_token = tokens
        .issue_refresh(subject, Some(role))
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    let cookie = Cookie::build((REFRESH_COOKIE, refresh_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(tokens.refresh_ttl().num_seconds()))
        .build();

    let session = SessionData {
        identity: identity.into(),
        access_token,
        refresh_token,
        token_type: "bearer",
    };

    Ok((jar.add(cookie), session))
}
