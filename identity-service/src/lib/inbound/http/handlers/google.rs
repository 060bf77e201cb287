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

/// Sign in with a Google ID token.
///
/// The bridge verifies the token with the provider, the service resolves
/// or creates the local identity, and local tokens are minted exactly as
/// the password flow does. The provider token is never stored.
pub async fn google_signin<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    jar: CookieJar,
    Json(body): Json<GoogleSigninRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionData>), ApiError>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    let identity = state
        .identity_service
        .signin_external(&body.id_token)
        .await
        .map_err(ApiError::from)?;

    let (jar, session) = mint_session(&state.tokens, jar, &identity)?;

    Ok((jar, ApiSuccess::new(StatusCode::OK, session)))
}

/// HTTP request body for Google sign-in (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleSigninRequest {
    id_token: String,
}
