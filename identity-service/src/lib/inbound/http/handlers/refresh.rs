use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::REFRESH_COOKIE;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::inbound::http::router::AppState;

/// Exchange a valid refresh token for a new access token.
///
/// The refresh token is read from the Authorization header first, then
/// from the refresh cookie. A missing token is authentication-required;
/// an invalid or expired one is plain unauthorized.
pub async fn refresh<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    let token = refresh_token_from_request(&headers, &jar)
        .ok_or_else(|| ApiError::Unauthorized("Refresh token is missing".to_string()))?;

    let claims = state
        .tokens
        .verify_refresh(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    let access_token = state
        .tokens
        .issue_access(&claims.sub, claims.role.as_deref())
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RefreshResponseData {
            access_token,
            token_type: "bearer",
        },
    ))
}

fn refresh_token_from_request(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| jar.get(REFRESH_COOKIE).map(|cookie| cookie.value().to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
    pub token_type: &'static str,
}
