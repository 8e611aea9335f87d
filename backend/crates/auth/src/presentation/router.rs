//! Auth Router

use axum::{Router, middleware, routing::post};
use platform::rate_limit::{RateLimiter, RouteRateLimit, enforce_rate_limit};
use std::sync::Arc;

use crate::domain::repository::AllowListRepository;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Route name used for rate limiting (IP-keyed: there is no session yet)
pub const VERIFY_EMAIL_ROUTE: &str = "/api/auth/verify-email";

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, limiter: Arc<RateLimiter>) -> Router {
    auth_router_generic(repo, limiter)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, limiter: Arc<RateLimiter>) -> Router
where
    R: AllowListRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .route(
            "/verify-email",
            post(handlers::verify_email::<R>).layer(middleware::from_fn_with_state(
                RouteRateLimit::new(limiter, VERIFY_EMAIL_ROUTE),
                enforce_rate_limit,
            )),
        )
        .with_state(state)
}
