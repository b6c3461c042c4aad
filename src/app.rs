use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/auth", get(handlers::auth_status))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/theme", get(handlers::get_theme))
        .route("/api/theme/toggle", post(handlers::toggle_theme))
        .route(
            "/api/runners",
            get(handlers::list_runners).post(handlers::add_runner),
        )
        .route(
            "/api/runners/:id",
            get(handlers::get_runner).delete(handlers::delete_runner),
        )
        .route("/api/runners/:id/distance", post(handlers::log_distance))
        .route("/api/runners/:id/cheer", post(handlers::cheer_runner))
        .route("/api/wheel", get(handlers::get_wheel))
        .route("/api/wheel/spin", post(handlers::spin_wheel))
        .route("/api/wheel/reset", post(handlers::reset_wheel))
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/api/events/draft", get(handlers::event_draft))
        .route(
            "/api/events/:id",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .with_state(state)
}
