use crate::auth::session::load_session;
use crate::handlers::{
    health::health_check,
    home::home,
    login::{login_page, login_submit, logout, logout_page},
    students::{logentry_create, logentry_form, student_dashboard},
    supervisors::{log_comment, log_detail, supervisor_dashboard},
};
use crate::schemas::AppState;
use axum::{middleware, routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Landing page and authentication
        .route("/", get(home))
        .route("/login/", get(login_page).post(login_submit))
        .route("/logout/", get(logout_page).post(logout))
        // Student pages
        .route("/dashboard/", get(student_dashboard))
        .route("/log/add/", get(logentry_form).post(logentry_create))
        // Supervisor pages
        .route("/supervisor/dashboard/", get(supervisor_dashboard))
        .route("/log/:log_id/", get(log_detail).post(log_comment))
        // Health check
        .route("/health", get(health_check))
        // Resolve the session cookie before any handler runs
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
        .with_state(state)
}
