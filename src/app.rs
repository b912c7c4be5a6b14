use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits", post(handlers::create_habit_form))
        .route("/habits/:id/edit", post(handlers::edit_habit_form))
        .route("/habits/:id/delete", post(handlers::delete_habit_form))
        .route("/habits/:id/commit", post(handlers::commit_habit_form))
        .route("/api/health", get(handlers::health))
        .route("/api/stats", get(handlers::get_stats))
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route(
            "/api/commits",
            get(handlers::list_commits).post(handlers::create_commit),
        )
        .route("/api/commits/habit/:habit_id", get(handlers::habit_commits))
        .route("/api/commits/today/:date", get(handlers::commits_on))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
