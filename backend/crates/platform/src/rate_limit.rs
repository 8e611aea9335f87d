//! Rate Limiting Infrastructure
//!
//! In-process fixed-window request counters keyed by `(identifier, route)`.
//!
//! ## Algorithm
//! Each `(identifier, route)` pair owns one window. The first request opens
//! the window (`count = 1`, `reset_at = now + window`), later requests
//! increment the counter until `max_requests` is reached, and the first
//! request at or after `reset_at` replaces the entry with a fresh window.
//!
//! This is a fixed window, not a sliding one: a burst of `max_requests` at
//! the end of one window followed by `max_requests` at the start of the
//! next is admitted (up to `2 × max_requests` in a short span).
//!
//! ## Scope
//! State is process-local. Under several instances each one enforces its
//! own limit; there is no shared coordination store.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;

use crate::client::{AuthenticatedSubject, rate_limit_identifier};

/// Interval of the background sweep started by the API binary
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Response header carrying the remaining budget of the current window
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

// ============================================================================
// Clock
// ============================================================================

/// Millisecond wall clock used by the limiter
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// System clock (Unix epoch milliseconds)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Route table: route name → window configuration, with a fallback
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    routes: HashMap<String, RateLimitConfig>,
    fallback: RateLimitConfig,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::empty(RateLimitConfig::default())
            .with_route("/api/chat", RateLimitConfig::new(20, 60))
            .with_route("/api/upload", RateLimitConfig::new(10, 60))
            .with_route("/api/chat/export", RateLimitConfig::new(5, 60))
    }
}

impl RateLimitPolicy {
    /// Policy without any route entries
    pub fn empty(fallback: RateLimitConfig) -> Self {
        Self {
            routes: HashMap::new(),
            fallback,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>, config: RateLimitConfig) -> Self {
        self.routes.insert(route.into(), config);
        self
    }

    /// Configuration for a route; unlisted routes use the fallback
    pub fn config_for(&self, route: &str) -> RateLimitConfig {
        self.routes.get(route).copied().unwrap_or(self.fallback)
    }
}

// ============================================================================
// Limiter
// ============================================================================

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub ms_remaining_in_window: i64,
}

impl RateLimitDecision {
    /// Seconds until the window resets, rounded up (at least 1)
    pub fn retry_after_secs(&self) -> u64 {
        let ms = self.ms_remaining_in_window.max(0) as u64;
        ms.div_ceil(1000).max(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at_ms: i64,
}

impl RateLimitEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        self.reset_at_ms <= now_ms
    }
}

/// In-memory fixed-window rate limiter
pub struct RateLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<(String, String), RateLimitEntry>>,
}

impl RateLimiter {
    /// Limiter backed by the system clock
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Check and count one request for `identifier` on `route`
    ///
    /// Never fails. Denied requests are not counted.
    pub fn check(&self, identifier: &str, route: &str) -> RateLimitDecision {
        let config = self.policy.config_for(route);
        let now_ms = self.clock.now_ms();

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (identifier.to_string(), route.to_string());

        match entries.get_mut(&key) {
            Some(entry) if !entry.is_expired(now_ms) => {
                let ms_remaining_in_window = entry.reset_at_ms - now_ms;

                if entry.count >= config.max_requests {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        ms_remaining_in_window,
                    };
                }

                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: config.max_requests - entry.count,
                    ms_remaining_in_window,
                }
            }
            _ => {
                entries.insert(
                    key,
                    RateLimitEntry {
                        count: 1,
                        reset_at_ms: now_ms + config.window_ms(),
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: config.max_requests.saturating_sub(1),
                    ms_remaining_in_window: config.window_ms(),
                }
            }
        }
    }

    /// Remove expired windows; returns how many were removed
    ///
    /// Only bounds memory: `check` already treats expired entries as absent.
    pub fn sweep_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now_ms));
        before - entries.len()
    }

    /// Number of tracked windows (expired ones included until swept)
    pub fn tracked_windows(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Run [`RateLimiter::sweep_expired`] on a fixed interval
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired();
            if removed > 0 {
                tracing::debug!(
                    removed = removed,
                    remaining = limiter.tracked_windows(),
                    "Swept expired rate limit windows"
                );
            }
        }
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware state: the shared limiter plus the route name it guards
#[derive(Clone)]
pub struct RouteRateLimit {
    pub limiter: Arc<RateLimiter>,
    pub route: &'static str,
}

impl RouteRateLimit {
    pub fn new(limiter: Arc<RateLimiter>, route: &'static str) -> Self {
        Self { limiter, route }
    }
}

/// Middleware that enforces the route's rate limit
///
/// Keys on [`AuthenticatedSubject`] when an outer auth layer has set it,
/// otherwise on the client address. Rejections are 429 with `Retry-After`
/// and `X-RateLimit-Remaining` headers.
pub async fn enforce_rate_limit(
    State(guard): State<RouteRateLimit>,
    req: Request,
    next: Next,
) -> Response {
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    let subject = req.extensions().get::<AuthenticatedSubject>().cloned();
    let identifier = rate_limit_identifier(
        subject.as_ref().map(|s| s.0.as_str()),
        req.headers(),
        direct_ip,
    );

    let decision = guard.limiter.check(&identifier, guard.route);

    if !decision.allowed {
        tracing::warn!(
            identifier = %identifier,
            route = guard.route,
            retry_after_ms = decision.ms_remaining_in_window,
            "Rate limit exceeded"
        );

        let mut response = AppError::too_many_requests("Too many requests")
            .with_action("Please wait a moment before trying again")
            .with_retry_after(decision.retry_after_secs())
            .into_response();
        response
            .headers_mut()
            .insert(REMAINING_HEADER, HeaderValue::from(0u32));
        return response;
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_MS: i64 = 1_700_000_000_000;

    fn limiter_with(policy: RateLimitPolicy) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START_MS));
        (RateLimiter::with_clock(policy, clock.clone()), clock)
    }

    fn small_policy() -> RateLimitPolicy {
        RateLimitPolicy::empty(RateLimitConfig::new(30, 60))
            .with_route("/api/chat", RateLimitConfig::new(3, 60))
            .with_route("/api/upload", RateLimitConfig::new(2, 60))
    }

    #[test]
    fn test_default_policy_routes() {
        let policy = RateLimitPolicy::default();

        assert_eq!(policy.config_for("/api/chat"), RateLimitConfig::new(20, 60));
        assert_eq!(policy.config_for("/api/upload"), RateLimitConfig::new(10, 60));
        assert_eq!(
            policy.config_for("/api/chat/export"),
            RateLimitConfig::new(5, 60)
        );
        assert_eq!(policy.config_for("/api/unknown"), RateLimitConfig::new(30, 60));
    }

    #[test]
    fn test_first_request_opens_window() {
        let (limiter, _clock) = limiter_with(small_policy());

        let decision = limiter.check("user:1", "/api/chat");
        assert_eq!(
            decision,
            RateLimitDecision {
                allowed: true,
                remaining: 2,
                ms_remaining_in_window: 60_000,
            }
        );
    }

    #[test]
    fn test_rejects_after_max_requests() {
        let (limiter, clock) = limiter_with(small_policy());

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("user:1", "/api/chat");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
            clock.advance(Duration::from_secs(1));
        }

        let denied = limiter.check("user:1", "/api/chat");
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.ms_remaining_in_window, 57_000);

        // Denials are not counted: still denied, same window.
        let denied_again = limiter.check("user:1", "/api/chat");
        assert!(!denied_again.allowed);
    }

    #[test]
    fn test_window_reset() {
        let (limiter, clock) = limiter_with(small_policy());

        for _ in 0..3 {
            assert!(limiter.check("user:1", "/api/chat").allowed);
        }
        assert!(!limiter.check("user:1", "/api/chat").allowed);

        // Exactly at reset_at the old window is over.
        clock.advance(Duration::from_secs(60));
        let decision = limiter.check("user:1", "/api/chat");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
        assert_eq!(decision.ms_remaining_in_window, 60_000);
    }

    #[test]
    fn test_boundary_burst_is_admitted() {
        let (limiter, clock) = limiter_with(small_policy());

        assert!(limiter.check("user:1", "/api/chat").allowed);
        clock.advance(Duration::from_millis(59_900));
        assert!(limiter.check("user:1", "/api/chat").allowed);
        assert!(limiter.check("user:1", "/api/chat").allowed);

        clock.advance(Duration::from_millis(200));
        for _ in 0..3 {
            assert!(limiter.check("user:1", "/api/chat").allowed);
        }
    }

    #[test]
    fn test_identifiers_are_independent() {
        let (limiter, _clock) = limiter_with(small_policy());

        for _ in 0..3 {
            assert!(limiter.check("user:a", "/api/chat").allowed);
        }
        assert!(!limiter.check("user:a", "/api/chat").allowed);

        let other = limiter.check("user:b", "/api/chat");
        assert!(other.allowed);
        assert_eq!(other.remaining, 2);
    }

    #[test]
    fn test_routes_are_independent() {
        let (limiter, _clock) = limiter_with(small_policy());

        for _ in 0..3 {
            assert!(limiter.check("user:a", "/api/chat").allowed);
        }
        assert!(!limiter.check("user:a", "/api/chat").allowed);

        let upload = limiter.check("user:a", "/api/upload");
        assert!(upload.allowed);
        assert_eq!(upload.remaining, 1);
    }

    #[test]
    fn test_unlisted_route_uses_fallback_and_empty_identifier_is_usable() {
        let (limiter, _clock) = limiter_with(small_policy());

        let decision = limiter.check("", "/api/something-else");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 29);
    }

    #[test]
    fn test_sweep_removes_only_expired_windows() {
        let (limiter, clock) = limiter_with(small_policy());

        limiter.check("user:old", "/api/chat");
        clock.advance(Duration::from_secs(30));
        limiter.check("user:new", "/api/chat");
        assert_eq!(limiter.tracked_windows(), 2);

        clock.advance(Duration::from_secs(31));
        assert_eq!(limiter.sweep_expired(), 1);
        assert_eq!(limiter.tracked_windows(), 1);

        // The surviving window keeps its count.
        let decision = limiter.check("user:new", "/api/chat");
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn test_expired_but_unswept_entry_is_treated_as_expired() {
        let (limiter, clock) = limiter_with(small_policy());

        for _ in 0..3 {
            limiter.check("user:1", "/api/chat");
        }
        clock.advance(Duration::from_secs(120));
        assert_eq!(limiter.tracked_windows(), 1);
        assert!(limiter.check("user:1", "/api/chat").allowed);
    }

    #[test]
    fn test_retry_after_secs_rounds_up() {
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            ms_remaining_in_window: 1_001,
        };
        assert_eq!(decision.retry_after_secs(), 2);

        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            ms_remaining_in_window: 0,
        };
        assert_eq!(decision.retry_after_secs(), 1);
    }

    mod middleware {
        use super::*;
        use axum::Router;
        use axum::body::Body;
        use axum::http::{Request as HttpRequest, StatusCode, header};
        use axum::routing::post;
        use tower::ServiceExt;

        fn app(limiter: Arc<RateLimiter>) -> Router {
            Router::new().route(
                "/api/upload",
                post(|| async { "ok" }).layer(axum::middleware::from_fn_with_state(
                    RouteRateLimit::new(limiter, "/api/upload"),
                    enforce_rate_limit,
                )),
            )
        }

        fn request(ip: &'static str) -> HttpRequest<Body> {
            HttpRequest::post("/api/upload")
                .header("x-forwarded-for", ip)
                .body(Body::empty())
                .unwrap()
        }

        #[tokio::test]
        async fn test_middleware_rejects_with_headers() {
            let (limiter, _clock) = limiter_with(small_policy());
            let app = app(Arc::new(limiter));

            let first = app.clone().oneshot(request("198.51.100.1")).await.unwrap();
            assert_eq!(first.status(), StatusCode::OK);
            assert_eq!(first.headers().get(REMAINING_HEADER).unwrap(), "1");

            let second = app.clone().oneshot(request("198.51.100.1")).await.unwrap();
            assert_eq!(second.status(), StatusCode::OK);
            assert_eq!(second.headers().get(REMAINING_HEADER).unwrap(), "0");

            let third = app.clone().oneshot(request("198.51.100.1")).await.unwrap();
            assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(third.headers().get(header::RETRY_AFTER).unwrap(), "60");
            assert_eq!(third.headers().get(REMAINING_HEADER).unwrap(), "0");

            // Another client address has its own window.
            let other = app.oneshot(request("198.51.100.2")).await.unwrap();
            assert_eq!(other.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn test_middleware_keys_on_authenticated_subject() {
            let (limiter, _clock) = limiter_with(small_policy());
            let limiter = Arc::new(limiter);
            let app = app(limiter.clone());

            let mut req = request("198.51.100.1");
            req.extensions_mut()
                .insert(AuthenticatedSubject("user-7".to_string()));
            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            // The user's window was counted, not the address's.
            assert_eq!(limiter.check("user:user-7", "/api/upload").remaining, 0);
            assert_eq!(
                limiter.check("ip:198.51.100.1", "/api/upload").remaining,
                1
            );
        }
    }
}
