use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use crate::handlers::public::{oauth, status, webhooks};

    Router::new()
        .route("/", get(status::root_get))
        .route("/ping", get(status::ping_get))
        .route("/health", get(status::health_get))
        // Clio OAuth round-trip
        .route("/authorize", get(oauth::authorize_get))
        .route("/api/clio-callback", get(oauth::callback_get))
        // Webhooks
        .route("/api/ghl-webhook", post(webhooks::ghl_webhook_post))
        .route("/api/clio-webhook", post(webhooks::clio_webhook_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use crate::handlers::protected::{dashboard, mappings, settings, sync};

    Router::new()
        .route("/api/dashboard", get(dashboard::dashboard_get))
        .route("/api/transactions", get(dashboard::transactions_get))
        .route("/api/logs", get(dashboard::logs_get))
        .route("/api/logs/summary", get(dashboard::summary_get))
        .route("/api/settings", get(settings::settings_get))
        .route("/api/settings/:service", put(settings::settings_put))
        .route(
            "/api/data-mappings",
            get(mappings::mappings_get).post(mappings::mappings_post),
        )
        .route(
            "/api/data-mappings/:id",
            put(mappings::mapping_put).delete(mappings::mapping_delete),
        )
        .route("/api/sync-data", post(sync::sync_post))
        .route("/api/test-connection", post(sync::test_connection_post))
        .route("/api/add-test-transaction", post(sync::test_transaction_post))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
