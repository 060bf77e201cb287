use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the resolved identity for protected handlers.
///
/// Handlers decide field-level exposure; password_hash stays inside.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

/// Identity resolver middleware: extract -> verify -> load -> yield.
///
/// Each step fails closed; there are no retries. The loaded record is
/// stored in request extensions for the handler.
pub async fn resolve_identity<IR, EV>(
    State(state): State<AppState<IR, EV>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    // Extract
    let token = extract_bearer_token(&request)?;

    // Verify
    let claims = state.tokens.verify_access(token).map_err(|_| {
        tracing::warn!("Access token rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
    })?;

    // Load
    let identity = state
        .identity_service
        .resolve(&claims.sub)
        .await
        .map_err(|e| match e {
            IdentityError::NotFound(_) => {
                tracing::warn!(subject = %claims.sub, "Token subject has no identity record");
                ApiError::NotFound("Identity not found".to_string()).into_response()
            }
            other => ApiError::from(other).into_response(),
        })?;

    // Yield
    request.extensions_mut().insert(CurrentIdentity(identity));

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<&str, Response> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized("Authentication required".to_string()).into_response()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
    })?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
        .into_response()
    })
}
