use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::authorize_account_access;
use super::ApiError;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::identity::errors::IdentityError;
use crate::inbound::http::middleware::CurrentIdentity;
use crate::inbound::http::router::AppState;

/// Delete an identity. Responds 204 with no body.
pub async fn delete_identity<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    Extension(CurrentIdentity(current)): Extension<CurrentIdentity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    let identity_id = IdentityId::from_string(&id).map_err(IdentityError::from)?;
    authorize_account_access(&current, &identity_id)?;

    state
        .identity_service
        .delete_identity(&identity_id)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}
