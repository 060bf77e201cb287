use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::mint_session;
use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionData>), ApiError>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    // Uniform rejection: the service folds unknown email and wrong
    // password into the same InvalidCredentials outcome
    let identity = state
        .identity_service
        .authenticate(&body.email, &body.password)
        .await
        .map_err(ApiError::from)?;

    let (jar, session) = mint_session(&state.tokens, jar, &identity)?;

    Ok((jar, ApiSuccess::new(StatusCode::OK, session)))
}

/// HTTP request body for login (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
