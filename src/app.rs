use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/weights",
            get(handlers::list_weights).post(handlers::add_weight),
        )
        .route(
            "/api/weights/:id",
            put(handlers::edit_weight).delete(handlers::delete_weight),
        )
        .route(
            "/api/workouts",
            get(handlers::list_workouts).post(handlers::add_workout),
        )
        .route(
            "/api/workouts/:id",
            put(handlers::replace_workout).delete(handlers::delete_workout),
        )
        .route("/api/exercises/:kind", get(handlers::suggested_exercises))
        .route("/api/stats/weight", get(handlers::weight_stats))
        .route("/api/stats/workouts", get(handlers::workout_stats))
        .route("/api/charts/weight", get(handlers::weight_chart))
        .route("/api/charts/frequency", get(handlers::frequency_chart))
        .route("/api/charts/types", get(handlers::type_chart))
        .route("/api/charts/weekly", get(handlers::weekly_chart))
        .route("/api/charts/summary", get(handlers::chart_summary))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/profile", get(handlers::profile))
        .route("/api/export", get(handlers::export))
        .route("/api/import", post(handlers::import))
        .route("/api/data", delete(handlers::clear_data))
        .with_state(state)
}
