use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use super::HOME_PATH;
use crate::auth::{
    password::{dummy_verify, verify_password},
    permissions::verify_csrf,
    session::{create_session, delete_session, removal_cookie, session_cookie},
    CurrentUser, Identity,
};
use crate::error::AppError;
use crate::schemas::AppState;
use crate::templates::{page_context, render};

pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Query string of the login page
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Page to return to after logging in
    pub next: Option<String>,
}

/// Login form body
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: &str) -> &str {
    let next = next.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        HOME_PATH
    }
}

fn render_login(
    state: &AppState,
    identity: Option<&Identity>,
    username: &str,
    next: &str,
    error: Option<&str>,
) -> Result<Response, AppError> {
    let mut context = page_context(identity);
    context.insert("username", username);
    context.insert("next", next);
    context.insert("error", &error);
    Ok(render(state, "login.html", &context)?.into_response())
}

/// Show the login form
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    trace!("Entering login_page function");
    let next = query.next.unwrap_or_default();
    render_login(&state, identity.as_ref(), "", &next, None)
}

/// Check credentials, open a session and hand its cookie to the browser
#[instrument(skip_all)]
pub async fn login_submit(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    trace!("Entering login_submit function");
    let username = form.username.trim();

    let candidate = if username.is_empty() || form.password.is_empty() {
        None
    } else {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&state.db)
            .await?
    };

    let authenticated = match candidate {
        Some(user) => {
            if verify_password(&form.password, &user.password_hash)? && user.is_active {
                Some(user)
            } else {
                None
            }
        }
        None => {
            if !username.is_empty() {
                dummy_verify(&form.password);
            }
            None
        }
    };

    let Some(user) = authenticated else {
        warn!("Failed login attempt for '{}'", username);
        return render_login(
            &state,
            identity.as_ref(),
            username,
            &form.next,
            Some(INVALID_LOGIN),
        );
    };

    // A fresh session on every login; the old one must not outlive it
    if let Some(previous) = identity {
        debug!("Replacing existing session of '{}'", previous.user.username);
        delete_session(&state.db, &previous.session_id).await?;
    }

    let session = create_session(&state.db, user.id, state.settings.session_ttl).await?;

    let user_id = user.id;
    let mut active: user::ActiveModel = user.into();
    active.last_login = Set(Some(Utc::now()));
    let user = active.update(&state.db).await?;

    info!("User '{}' (ID {}) logged in as {}", user.username, user_id, user.role);

    let cookie = session_cookie(
        &session.id,
        state.settings.session_ttl,
        state.settings.secure_cookies,
    );
    let target = safe_next(&form.next);
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(target),
    )
        .into_response())
}

/// Logout form body
#[derive(Debug, Default, Deserialize)]
pub struct LogoutForm {
    #[serde(default)]
    pub csrf_token: String,
}

/// Ask a signed-in user to confirm logging out. Nobody to log out goes home.
#[instrument(skip_all)]
pub async fn logout_page(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Response, AppError> {
    trace!("Entering logout_page function");
    match identity {
        Some(identity) => {
            let context = page_context(Some(&identity));
            Ok(render(&state, "logout.html", &context)?.into_response())
        }
        None => Ok(Redirect::to(HOME_PATH).into_response()),
    }
}

/// End the current session, if any, and go home.
/// A signed-in user must echo the session's CSRF token.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Form(form): Form<LogoutForm>,
) -> Result<Response, AppError> {
    trace!("Entering logout function");
    if let Some(identity) = identity {
        verify_csrf(&identity, &form.csrf_token)?;
        delete_session(&state.db, &identity.session_id).await?;
        info!("User '{}' logged out", identity.user.username);
    }

    let cookie = removal_cookie(state.settings.secure_cookies);
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(HOME_PATH),
    )
        .into_response())
}
