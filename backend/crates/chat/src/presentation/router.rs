//! Chat Router
//!
//! Layering, outermost first: session and allow-list gate, then the
//! route's rate limit, then the handler.

use auth::domain::repository::{AllowListRepository, AuthSessionRepository};
use auth::{AuthMiddlewareState, PgAuthRepository, require_allowed_session};
use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, post},
};
use platform::rate_limit::{RateLimiter, RouteRateLimit, enforce_rate_limit};
use std::sync::Arc;

use crate::domain::assistant::AssistantApi;
use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::infra::openai::OpenAiAssistant;
use crate::infra::postgres::PgChatRepository;
use crate::presentation::handlers::{self, ChatAppState};

// Rate-limit route names. Aliases share their route's window.
pub const CHAT_ROUTE: &str = "/api/chat";
pub const THREAD_ROUTE: &str = "/api/chat/thread";
pub const MESSAGES_ROUTE: &str = "/api/chat/messages";
pub const CONVERSATIONS_ROUTE: &str = "/api/chat/conversations";
pub const CONVERSATION_ROUTE: &str = "/api/chat/conversation";
pub const EXPORT_ROUTE: &str = "/api/chat/export";
pub const UPLOAD_ROUTE: &str = "/api/upload";

/// Create the Chat router with PostgreSQL repositories and the Assistants API
///
/// Paths are relative to `/api`.
pub fn chat_router(
    state: ChatAppState<PgChatRepository, OpenAiAssistant>,
    limiter: Arc<RateLimiter>,
    auth: AuthMiddlewareState<PgAuthRepository>,
) -> Router {
    chat_router_generic(state, limiter, auth)
}

/// Create a generic Chat router for any repository / assistant implementation
pub fn chat_router_generic<R, A, G>(
    state: ChatAppState<R, A>,
    limiter: Arc<RateLimiter>,
    auth: AuthMiddlewareState<G>,
) -> Router
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
    G: AuthSessionRepository + AllowListRepository + Clone + Send + Sync + 'static,
{
    let limited = |route: &'static str, method_router: MethodRouter<ChatAppState<R, A>>| {
        method_router.layer(middleware::from_fn_with_state(
            RouteRateLimit::new(limiter.clone(), route),
            enforce_rate_limit,
        ))
    };

    let upload_limit = DefaultBodyLimit::max(state.config.upload_body_limit());

    Router::new()
        .route(
            "/chat/thread",
            limited(THREAD_ROUTE, post(handlers::create_thread::<R, A>)),
        )
        .route(
            "/chat",
            limited(CHAT_ROUTE, post(handlers::send_message::<R, A>)),
        )
        .route(
            "/chat/mensajes",
            limited(CHAT_ROUTE, post(handlers::send_message::<R, A>)),
        )
        .route(
            "/chat/messages",
            limited(MESSAGES_ROUTE, get(handlers::list_messages::<R, A>)),
        )
        .route(
            "/chat/conversations",
            limited(CONVERSATIONS_ROUTE, get(handlers::list_conversations::<R, A>)),
        )
        .route(
            "/chat/conversation/{id}",
            limited(CONVERSATION_ROUTE, delete(handlers::delete_conversation::<R, A>)),
        )
        .route(
            "/chat/conversacion/{id}",
            limited(CONVERSATION_ROUTE, delete(handlers::delete_conversation::<R, A>)),
        )
        .route(
            "/chat/export",
            limited(EXPORT_ROUTE, post(handlers::export_conversation::<R, A>)),
        )
        .route(
            "/upload",
            limited(
                UPLOAD_ROUTE,
                post(handlers::upload_file::<R, A>).layer(upload_limit),
            ),
        )
        .route_layer(middleware::from_fn_with_state(
            auth,
            require_allowed_session::<G>,
        ))
        .with_state(state)
}
