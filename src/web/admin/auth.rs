use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;

use crate::web::{
    AppState,
    auth::{CurrentSession, existing_session},
};

/// Admit only an administrator session; everyone else is sent back to `/`.
pub async fn require_admin_session(
    state: &AppState,
    jar: &CookieJar,
) -> Result<CurrentSession, Redirect> {
    match existing_session(state, jar).await {
        Some(current) if current.session.is_admin() => Ok(current),
        Some(current) if current.session.is_authenticated() => {
            Err(Redirect::to("/?error=not_authorized"))
        }
        _ => Err(Redirect::to("/")),
    }
}
