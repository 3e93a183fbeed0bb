/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use teamhub_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use teamhub_shared::auth::middleware::create_jwt_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to verify bearer tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                          public
/// └── /v1/                                 bearer JWT required
///     ├── GET, POST    /tasks
///     ├── GET, PATCH, DELETE /tasks/:id
///     ├── GET, POST    /tasks/:id/comments
///     ├── GET, POST    /campaigns
///     ├── GET          /campaigns/:id
///     ├── POST         /campaigns/:id/donations
///     ├── GET, POST    /teams
///     ├── GET, DELETE  /teams/:id
///     ├── POST, DELETE /teams/:id/members
///     ├── GET, POST    /files
///     ├── GET          /activities
///     └── GET          /dashboard
/// ```
///
/// Authentication runs before any route, so a request without a valid token
/// is answered 401 before its body is parsed or validated.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/tasks/:id/comments",
            get(routes::tasks::list_comments).post(routes::tasks::add_comment),
        )
        .route(
            "/campaigns",
            get(routes::campaigns::list_campaigns).post(routes::campaigns::create_campaign),
        )
        .route("/campaigns/:id", get(routes::campaigns::get_campaign))
        .route(
            "/campaigns/:id/donations",
            axum::routing::post(routes::campaigns::record_donation),
        )
        .route(
            "/teams",
            get(routes::teams::list_teams).post(routes::teams::create_team),
        )
        .route(
            "/teams/:id",
            get(routes::teams::get_team).delete(routes::teams::delete_team),
        )
        .route(
            "/teams/:id/members",
            axum::routing::post(routes::teams::add_member).delete(routes::teams::remove_member),
        )
        .route(
            "/files",
            get(routes::files::list_files).post(routes::files::register_file),
        )
        .route("/activities", get(routes::activities::list_activities))
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .layer(middleware::from_fn(create_jwt_middleware(state.jwt_secret().to_string())));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
