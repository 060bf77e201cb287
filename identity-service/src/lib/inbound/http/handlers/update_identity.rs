use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::authorize_account_access;
use super::ApiError;
use super::ApiSuccess;
use super::IdentityData;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::UpdateIdentityCommand;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::identity::errors::IdentityError;
use crate::inbound::http::middleware::CurrentIdentity;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating an identity (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateIdentityRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
}

impl UpdateIdentityRequest {
    fn try_into_command(self) -> Result<UpdateIdentityCommand, IdentityError> {
        // Validation happens here - errors are automatically converted via #[from]
        let email = self.email.map(EmailAddress::new).transpose()?;

        Ok(UpdateIdentityCommand {
            name: self.name,
            email,
            password: self.password,
            picture: self.picture,
        })
    }
}

pub async fn update_identity<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    Extension(CurrentIdentity(current)): Extension<CurrentIdentity>,
    Path(id): Path<String>,
    Json(body): Json<UpdateIdentityRequest>,
) -> Result<ApiSuccess<IdentityData>, ApiError>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    // Parse identity ID and request at HTTP boundary
    let identity_id = IdentityId::from_string(&id).map_err(IdentityError::from)?;
    authorize_account_access(&current, &identity_id)?;
    let command = body.try_into_command()?;

    state
        .identity_service
        .update_identity(&identity_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref identity| ApiSuccess::new(StatusCode::OK, identity.into()))
}
