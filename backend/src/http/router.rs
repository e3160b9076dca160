//! Router configuration for the HTTP API.
//!
//! The route table is fixed and built once at startup. Everything below
//! `/questions/` and `/answers/` is dispatched lexically on the remainder of
//! the path, so a malformed id is a 400 and a wrong verb a 405 rather than an
//! unmatched route. `/questions` and `/answers` redirect to their
//! slash-terminated form.

use axum::{
    http::StatusCode,
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::config::ServerSettings;

/// Create the application router with all routes and request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Questions
        .route(
            "/questions/",
            get(handlers::list_questions).post(handlers::create_question),
        )
        // Question items and their answer collections
        .route("/questions/{*rest}", any(handlers::question_subtree))
        // Answers
        .route("/answers/", any(handlers::answer_root))
        .route("/answers/{*rest}", any(handlers::answer_subtree))
        .route("/questions", any(handlers::add_trailing_slash))
        .route("/answers", any(handlers::add_trailing_slash))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bound request body reads and whole-request handling by the configured timeouts.
pub fn with_timeouts(router: Router, settings: &ServerSettings) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                settings.write_timeout(),
            ))
            .layer(RequestBodyTimeoutLayer::new(settings.read_timeout())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let state = AppState::new(repo);
        let _router = with_timeouts(create_router(state), &ServerSettings::default());
    }
}
