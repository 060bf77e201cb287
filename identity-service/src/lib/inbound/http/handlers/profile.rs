use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::IdentityData;
use crate::inbound::http::middleware::CurrentIdentity;

/// Return the authenticated account's own record.
///
/// The identity was already resolved by the middleware; this handler
/// only shapes the response (IdentityData carries no password hash).
pub async fn profile(
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
) -> Result<ApiSuccess<IdentityData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&identity).into()))
}
