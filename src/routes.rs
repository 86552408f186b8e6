// src/routes.rs

use axum::{
    Router, http::Method,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, attempts, exams},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (exams, attempts, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, lifecycle service, pool).
///
/// Authentication and role checks live in the upstream gateway; handlers
/// receive already-vetted user identifiers.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let exam_routes = Router::new()
        .route("/", get(exams::list_exams))
        .route("/{id}", get(exams::get_exam));

    let attempt_routes = Router::new()
        .route("/", post(attempts::start_attempt).get(attempts::list_attempts))
        .route("/{id}", get(attempts::get_attempt))
        .route("/{id}/answers", post(attempts::record_answer))
        .route("/{id}/finalize", post(attempts::finalize_attempt));

    let admin_routes = Router::new()
        .route("/exams", post(admin::create_exam))
        .route(
            "/exams/{id}",
            put(admin::update_exam).delete(admin::delete_exam),
        )
        .route("/exams/{id}/areas", post(admin::create_area))
        .route("/areas/{id}/items", post(admin::create_item))
        .route("/items/{id}/questions", post(admin::create_question))
        .route("/questions/{id}", delete(admin::delete_question));

    Router::new()
        .nest("/api/exams", exam_routes)
        .nest("/api/attempts", attempt_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
