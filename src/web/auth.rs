use axum::{
    Json,
    extract::{Form, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    session::{LoginError, Session},
    web::{ApiMessage, AppState, json_error},
};

pub const SESSION_COOKIE: &str = "portal_session";

/// The caller's session token together with a snapshot of its state.
#[derive(Clone, Debug)]
pub struct CurrentSession {
    pub token: Uuid,
    pub session: Session,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Look up the session named by the cookie, if it is still known.
pub async fn existing_session(state: &AppState, jar: &CookieJar) -> Option<CurrentSession> {
    let token_cookie = jar.get(SESSION_COOKIE)?;
    let token = Uuid::parse_str(token_cookie.value()).ok()?;
    let session = state.sessions().get(token).await?;
    Some(CurrentSession { token, session })
}

/// Resolve the caller's session, starting a new one on first contact.
pub async fn resolve_session(state: &AppState, jar: CookieJar) -> (CookieJar, CurrentSession) {
    if let Some(current) = existing_session(state, &jar).await {
        return (jar, current);
    }

    let token = state.sessions().create().await;
    let jar = jar.add(session_cookie(token));
    (
        jar,
        CurrentSession {
            token,
            session: Session::new(),
        },
    )
}

fn session_cookie(token: Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> (CookieJar, Redirect) {
    let (jar, current) = resolve_session(&state, jar).await;
    let identifier = form.username.trim();

    let mut session = current.session;
    match session.login(state.credentials(), identifier, &form.password) {
        Ok(role) => {
            state.sessions().save(current.token, session).await;
            info!(identifier, role = role.as_str(), "login succeeded");
            (jar, Redirect::to("/"))
        }
        Err(LoginError::AlreadySignedIn) => (jar, Redirect::to("/")),
        Err(err) => {
            warn!(identifier, reason = err.code(), "login rejected");
            (jar, Redirect::to(&format!("/?error={}", err.code())))
        }
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    if let Some(current) = existing_session(&state, &jar).await {
        let role = current.session.role();
        state.sessions().update(current.token, Session::logout).await;
        info!(role = role.map(|r| r.as_str()), "signed out");
    }

    Redirect::to("/?status=logged_out")
}

/// Gate for JSON and download endpoints: any signed-in role is accepted.
pub async fn require_signed_in(
    state: &AppState,
    jar: &CookieJar,
) -> Result<CurrentSession, (StatusCode, Json<ApiMessage>)> {
    match existing_session(state, jar).await {
        Some(current) if current.session.is_authenticated() => Ok(current),
        _ => Err(json_error(StatusCode::UNAUTHORIZED, "Please sign in first.")),
    }
}
