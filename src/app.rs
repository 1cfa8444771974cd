//! Application state and router builder.
//!
//! `AppState` wires the concrete capabilities (Argon2 hashing, HS256 JWTs,
//! Postgres-backed stores) into the auth flow; `build_router` assembles the
//! axum router with tracing and CORS layers plus the JWT middleware on the
//! note routes.

use crate::{
    auth::{
        jwt::{JwtCodec, TokenCodec},
        middleware::AuthContext,
        password::Argon2Hasher,
        service::AuthService,
    },
    config::Config,
    error::ApiError,
    models::{note::NoteStore, refresh_token::RefreshTokenStore, user::CredentialStore},
    routes,
};
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned per request handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks; the stores hold their own
    /// handle)
    pub db: PgPool,

    pub config: Arc<Config>,

    /// The auth flow
    pub auth: AuthService,

    /// Token codec, also used by the JWT middleware
    pub codec: Arc<dyn TokenCodec>,

    /// Note store
    pub notes: Arc<dyn NoteStore>,
}

impl AppState {
    /// Creates state with Postgres-backed stores.
    pub fn new(db: PgPool, config: Config) -> Self {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtCodec::from_config(&config.jwt));
        let users: Arc<dyn CredentialStore> = Arc::new(db.clone());
        let refresh_tokens: Arc<dyn RefreshTokenStore> = Arc::new(db.clone());
        let notes: Arc<dyn NoteStore> = Arc::new(db.clone());

        Self::with_stores(db, config, codec, users, refresh_tokens, notes)
    }

    /// Creates state with explicit store implementations. Production code
    /// goes through [`AppState::new`]; tests substitute in-memory stores.
    pub fn with_stores(
        db: PgPool,
        config: Config,
        codec: Arc<dyn TokenCodec>,
        users: Arc<dyn CredentialStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        notes: Arc<dyn NoteStore>,
    ) -> Self {
        let auth = AuthService::new(Arc::new(Argon2Hasher), codec.clone(), users, refresh_tokens);

        Self {
            db,
            config: Arc::new(config),
            auth,
            codec,
            notes,
        }
    }
}

/// Builds the complete router.
///
/// ```text
/// /
/// ├── GET  /health               # public
/// ├── /auth/                     # public
/// │   ├── POST /register
/// │   ├── POST /login
/// │   └── POST /refresh-token
/// └── /notes/                    # JWT-protected
///     ├── POST   /
///     ├── GET    /
///     └── DELETE /{id}
/// ```
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh-token", post(routes::auth::refresh_token));

    let note_routes = Router::new()
        .route("/", post(routes::notes::create))
        .route("/", get(routes::notes::list))
        .route("/:id", delete(routes::notes::delete))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/notes", note_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware.
///
/// Validates the bearer access token and injects an [`AuthContext`] into the
/// request extensions. Refresh tokens are rejected here; they are only
/// accepted by the refresh endpoint.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = state.codec.validate_access_token(token)?;

    req.extensions_mut()
        .insert(AuthContext::from_subject(claims.sub));

    Ok(next.run(req).await)
}
