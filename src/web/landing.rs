use axum::{
    extract::{Query, State},
    response::Html,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::debug;

use crate::{
    session::Page,
    web::{
        AppState, admin, auth, flash::{FlashContext, compose_flash_message}, library, templates::render_login_page,
    },
};

#[derive(Default, Deserialize)]
pub struct LandingQuery {
    pub status: Option<String>,
    pub error: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
}

/// Render whichever page the caller's session is on.
pub async fn landing_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LandingQuery>,
) -> (CookieJar, Html<String>) {
    let (jar, current) = auth::resolve_session(&state, jar).await;
    let flash = compose_flash_message(
        &FlashContext {
            status: params.status.as_deref(),
            error: params.error.as_deref(),
            name: params.name.as_deref(),
            category: params.category.as_deref(),
        },
        &state.config().allowed_extensions,
    );

    debug!(page = current.session.page().as_str(), "rendering page");

    let html = match current.session.page() {
        Page::Login => render_login_page(&flash),
        Page::Admin => admin::render_admin_page(&state, &flash, params.category.as_deref()).await,
        Page::User => library::render_library_page(&state, &flash).await,
    };

    (jar, Html(html))
}
