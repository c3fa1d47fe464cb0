use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use mathlens_core::{Config, ProviderKind};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use super::gate;
use super::handlers;
use super::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the application router.
///
/// The solve routes sit behind the request gate and the body limit. When a
/// static directory is configured it is served as the fallback, otherwise
/// `GET /` answers with a banner.
pub fn create_router(state: AppState, config: &Config) -> Router {
    let body_limit = state
        .validator
        .max_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let solve_routes = Router::new()
        .route(
            ProviderKind::Perplexity.route(),
            post(handlers::solve_perplexity),
        )
        .route(ProviderKind::Gemini.route(), post(handlers::solve_gemini))
        .route(ProviderKind::OpenAi.route(), post(handlers::solve_openai))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::rate_limit,
        ))
        .layer(DefaultBodyLimit::max(body_limit));

    let app = Router::new()
        .merge(solve_routes)
        .route("/health", get(handlers::health));

    let app = match config.static_dir() {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static files");
            let index = ServeFile::new(dir.join("index.html"));
            app.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => app.route("/", get(handlers::root)),
    };

    app.layer(cors_layer(&config.server.cors_allow_origins))
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
