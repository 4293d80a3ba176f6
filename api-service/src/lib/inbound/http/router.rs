use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::create_user::create_user;
use super::handlers::find_user::find_user;
use super::handlers::healthcheck::healthcheck;
use super::handlers::me::me;
use super::handlers::root::api_root;
use super::handlers::root::root;
use super::handlers::ApiError;
use super::middleware::authenticate;
use super::middleware::user_context;
use super::openapi::ApiDoc;
use crate::domain::health::service::HealthService;
use crate::domain::user::ports::UserStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<dyn UserStore>,
    pub authenticator: Arc<Authenticator>,
}

/// REST API: the public root plus the token protected `/api/v1` scope.
pub fn create_router(user_store: Arc<dyn UserStore>, authenticator: Arc<Authenticator>) -> Router {
    let state = AppState {
        user_store,
        authenticator,
    };

    // Layered (not route-layered) so unknown paths under the scope are
    // rejected with 401 before they can 404.
    let protected_routes = Router::new()
        .route("/", get(api_root))
        .route("/me", get(me))
        .route("/users", get(find_user).post(create_user))
        .fallback(not_found)
        .layer(middleware::from_fn(user_context))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // A nested "/" only matches the bare prefix.
    let protected_root = get(api_root)
        .layer(middleware::from_fn(user_context))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

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
        .route("/", get(root))
        .route("/api/v1/", protected_root)
        .nest("/api/v1", protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}

/// Healthcheck listener router.
pub fn create_health_router(health: HealthService) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .with_state(health)
}

/// Swagger UI at `/swagger` serving the document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
