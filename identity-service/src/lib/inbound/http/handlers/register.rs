use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use thiserror::Error;

use super::mint_session;
use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::RegisterIdentityCommand;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::identity::errors::EmailError;
use crate::inbound::http::router::AppState;

pub async fn register<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(CookieJar, ApiSuccess<SessionData>), ApiError>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    let command = body.try_into_command()?;

    let identity = state
        .identity_service
        .register(command)
        .await
        .map_err(ApiError::from)?;

    let (jar, session) = mint_session(&state.tokens, jar, &identity)?;

    Ok((jar, ApiSuccess::new(StatusCode::CREATED, session)))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    picture: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Name must not be empty")]
    EmptyName,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterIdentityCommand, ParseRegisterRequestError> {
        if self.name.trim().is_empty() {
            return Err(ParseRegisterRequestError::EmptyName);
        }
        let email = EmailAddress::new(self.email)?;
        Ok(RegisterIdentityCommand::new(
            self.name,
            email,
            self.password,
            self.picture,
        ))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
