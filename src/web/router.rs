use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, admin, auth, landing, library};

const ROBOTS_TXT_BODY: &str = "User-agent: *\nDisallow: /\n";

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/", get(landing::landing_page))
        .route("/login", post(auth::process_login))
        .route("/logout", post(auth::logout))
        .route("/admin/upload", post(admin::upload_resource))
        .route("/admin/delete", post(admin::delete_file))
        .route("/admin/delete-category", post(admin::delete_category))
        .route("/download/:id", get(library::download_resource))
        .route("/api/categories", get(library::list_library))
        .route("/healthz", get(healthz))
        .route("/robots.txt", get(robots_txt))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ROBOTS_TXT_BODY,
    )
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
