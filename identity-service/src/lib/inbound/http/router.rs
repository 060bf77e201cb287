use std::sync::Arc;
use std::time::Duration;

use auth::TokenAuthority;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::delete_identity::delete_identity;
use super::handlers::google::google_signin;
use super::handlers::login::login;
use super::handlers::profile::profile;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::update_identity::update_identity;
use super::middleware::resolve_identity;
use crate::domain::identity::ports::ExternalVerifier;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::service::IdentityService;

pub struct AppState<IR, EV>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    pub identity_service: Arc<IdentityService<IR, EV>>,
    pub tokens: Arc<TokenAuthority>,
}

// Manual Clone: derive would require IR/EV themselves to be Clone
impl<IR, EV> Clone for AppState<IR, EV>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    fn clone(&self) -> Self {
        Self {
            identity_service: Arc::clone(&self.identity_service),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

pub fn create_router<IR, EV>(
    identity_service: Arc<IdentityService<IR, EV>>,
    tokens: Arc<TokenAuthority>,
) -> Router
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    let state = AppState {
        identity_service,
        tokens,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<IR, EV>))
        .route("/api/auth/login", post(login::<IR, EV>))
        .route("/api/auth/refresh", post(refresh::<IR, EV>))
        .route("/api/auth/google", post(google_signin::<IR, EV>));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(profile))
        .route("/api/identities/:identity_id", patch(update_identity::<IR, EV>))
        .route("/api/identities/:identity_id", delete(delete_identity::<IR, EV>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity::<IR, EV>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
