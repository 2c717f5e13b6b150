use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth;
use crate::AppState;

pub fn app_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/users/me", get(auth::auth_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/", get(auth::root))
        .route("/home", get(auth::home))
        .route("/health", get(health_check))
        // OAuth routes
        .route("/login", get(auth::auth_login))
        .route("/auth", get(auth::auth_callback))
        .route("/logout", get(auth::auth_logout))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(cors_allowed_origins)),
        )
        .with_state(state)
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Build CORS layer for the configured origins.
///
/// Falls back to permissive CORS when no origin parses (development only).
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "No usable CORS origins configured, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
