//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use auth::{AuthConfig, AuthMiddlewareState, PgAuthRepository, auth_router};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use chat::{
    AssistantConfig, ChatAppState, ChatConfig, OpenAiAssistant, PdfRenderer, PgChatRepository,
    PollConfig, chat_router,
};
use platform::rate_limit::{
    REMAINING_HEADER, RateLimitPolicy, RateLimiter, SWEEP_INTERVAL, spawn_sweeper,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,chat=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let max_connections: u32 = env_or("DATABASE_MAX_CONNECTIONS", 5)?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections, "Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration
    let auth_config = match env::var("AUTH_SESSION_SECRET") {
        Ok(encoded) => AuthConfig {
            session_secret: AuthConfig::decode_secret(&encoded)?,
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_SESSION_SECRET not set, using a random development secret");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("AUTH_SESSION_SECRET must be set in production"),
    };
    let auth_config = match env::var("AUTH_SESSION_COOKIE") {
        Ok(name) if !name.trim().is_empty() => auth_config.with_cookie_name(name.trim()),
        _ => auth_config,
    };

    // Assistant configuration
    let mut assistant_config = AssistantConfig::new(
        env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set in environment")?,
        env::var("OPENAI_ASSISTANT_ID").context("OPENAI_ASSISTANT_ID must be set in environment")?,
    );
    if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
        assistant_config.base_url = base_url;
    }

    let defaults = ChatConfig::default();
    let chat_config = ChatConfig {
        poll: PollConfig::new(
            Duration::from_millis(env_or(
                "ASSISTANT_POLL_INTERVAL_MS",
                defaults.poll.interval.as_millis() as u64,
            )?),
            env_or("ASSISTANT_MAX_POLL_ATTEMPTS", defaults.poll.max_attempts)?,
        ),
        ..defaults
    };

    tracing::info!(
        poll_interval_ms = chat_config.poll.interval.as_millis() as u64,
        max_poll_attempts = chat_config.poll.max_attempts,
        base_url = %assistant_config.base_url,
        "Assistant configured"
    );

    // Rate limiting: one limiter shared by every router, swept periodically
    let limiter = Arc::new(RateLimiter::new(RateLimitPolicy::default()));
    spawn_sweeper(limiter.clone(), SWEEP_INTERVAL);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers([
            header::RETRY_AFTER,
            header::CONTENT_DISPOSITION,
            http::HeaderName::from_static(REMAINING_HEADER),
        ])
        .allow_credentials(true);

    // Build router
    let auth_repo = PgAuthRepository::new(pool.clone());
    let auth_gate = AuthMiddlewareState::new(Arc::new(auth_repo.clone()), Arc::new(auth_config));

    let chat_state = ChatAppState::new(
        PgChatRepository::new(pool.clone()),
        OpenAiAssistant::new(assistant_config)?,
        Arc::new(PdfRenderer::new(chat_config.export_footer.clone())),
        chat_config,
    );

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_router(auth_repo, limiter.clone()))
        .merge(chat_router(chat_state, limiter, auth_gate));

    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 31113)))?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Parse an optional environment variable, falling back to `default`
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key}: {e}")),
        _ => Ok(default),
    }
}
