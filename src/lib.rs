pub mod assets;
pub mod auth;
pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod token;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use config::{AppEnv, Config};
use cookies::CookieTransport;
use db::DbPool;
use token::TokenCodec;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub tokens: TokenCodec,
    pub cookies: CookieTransport,
    pub env: AppEnv,
    pub api_prefix: Arc<String>,
    pub cors_allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    /// Cookie lifetime follows the token lifetime, so a browser never holds a
    /// cookie whose token has already expired, nor loses a still-valid one.
    pub fn new(db: DbPool, config: &Config) -> Self {
        Self {
            db,
            tokens: TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl),
            cookies: CookieTransport::new(
                config.cookie_secret.as_bytes(),
                config.app_env.is_production(),
                config.token_ttl,
            ),
            env: config.app_env,
            api_prefix: Arc::new(config.api_prefix.clone()),
            cors_allowed_origins: Arc::new(config.cors_allowed_origins.clone()),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookies.key().clone()
    }
}

pub fn create_app(state: AppState) -> Router {
    let api_prefix = state.api_prefix.clone();

    let protected = Router::new()
        .route(
            "/todos",
            get(handlers::todos::list_todos).post(handlers::todos::create_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::todos::get_todo)
                .patch(handlers::todos::update_todo)
                .delete(handlers::todos::delete_todo),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let api_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/health", get(handlers::health::health))
        .merge(protected);

    let shell = Router::new()
        .route("/", get(handlers::web::index))
        .route("/static/{*path}", get(handlers::web::static_file));

    let app = if api_prefix.is_empty() {
        shell.merge(api_routes)
    } else {
        shell
            .route("/health", get(handlers::health::health))
            .nest(&api_prefix, api_routes)
    };

    let app = with_response_layers(app.fallback(handlers::web::fallback), state);

    tracing::info!("api_prefix: {api_prefix:?}");

    app
}

/// Panics are caught innermost so the detail mapper sees their 500 the same
/// way it sees any other.
fn with_response_layers(app: Router<AppState>, state: AppState) -> Router {
    let mut app = app.layer(CatchPanicLayer::custom(error::panic_response));

    if !state.env.is_production() {
        app = app.layer(axum::middleware::map_response(error::expose_internal_detail));
    }

    app.layer(
        tower::ServiceBuilder::new()
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::compression::CompressionLayer::new())
            .layer(cors_layer(&state)),
    )
    .with_state(state)
}

/// Development: any origin, no credentials. Production: exact-match
/// allowlist with credentials, since the API authenticates by cookie.
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = if state.env.is_production() {
        let allowed: Vec<HeaderValue> = state
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_credentials(true)
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    .max_age(Duration::from_secs(60 * 10))
}
