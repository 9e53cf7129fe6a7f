pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::course_view::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/courses/:course_id/curriculum",
            get(handlers::handle_get_curriculum),
        )
        // Course player views
        .route("/api/v1/views", post(handlers::handle_open_view))
        .route(
            "/api/v1/views/:view_id",
            get(handlers::handle_get_view)
                .put(handlers::handle_rebind_view)
                .delete(handlers::handle_close_view),
        )
        .route(
            "/api/v1/views/:view_id/lessons/:lesson_id/complete",
            post(handlers::handle_complete_lesson),
        )
        .route(
            "/api/v1/views/:view_id/progress/refresh",
            post(handlers::handle_refresh_progress),
        )
        .route(
            "/api/v1/views/:view_id/reviews",
            post(handlers::handle_submit_review),
        )
        .with_state(state)
}
