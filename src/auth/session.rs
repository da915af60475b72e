use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use cookie::{Cookie, SameSite};
use model::entities::{session, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::{Identity, RequestContext};
use crate::error::AppError;
use crate::schemas::AppState;

pub const SESSION_COOKIE: &str = "logbook_session";

/// Delete every session past its expiry, returning how many rows went.
pub async fn purge_expired_sessions(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = session::Entity::delete_many()
        .filter(session::Column::ExpiryDate.lte(Utc::now()))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        info!("Purged {} expired session(s)", result.rows_affected);
    }
    Ok(result.rows_affected)
}

/// Open a new session for `user_id` that expires after `ttl`.
/// Expired sessions of every user are purged first so abandoned rows do not pile up.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i32,
    ttl: Duration,
) -> Result<session::Model, DbErr> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| DbErr::Custom(format!("session lifetime out of range: {}", e)))?;

    purge_expired_sessions(db).await?;

    let new_session = session::ActiveModel {
        id: Set(Uuid::new_v4().simple().to_string()),
        user_id: Set(user_id),
        csrf_token: Set(Uuid::new_v4().simple().to_string()),
        expiry_date: Set(Utc::now() + ttl),
    };

    let created = new_session.insert(db).await?;
    info!("Opened session for user ID {}", user_id);
    Ok(created)
}

/// Resolve a session id into the identity it authenticates.
///
/// Expired sessions are deleted on sight. Sessions of inactive users resolve to
/// nobody but are left in place.
pub async fn load_identity(
    db: &DatabaseConnection,
    session_id: &str,
) -> Result<Option<Identity>, DbErr> {
    trace!("Looking up session");
    let found = session::Entity::find_by_id(session_id.to_string())
        .find_also_related(user::Entity)
        .one(db)
        .await?;

    let (session_row, user_row) = match found {
        Some((session_row, Some(user_row))) => (session_row, user_row),
        Some((session_row, None)) => {
            warn!("Session points at missing user ID {}", session_row.user_id);
            return Ok(None);
        }
        None => {
            debug!("Unknown session id presented");
            return Ok(None);
        }
    };

    if session_row.expiry_date <= Utc::now() {
        debug!("Session for user ID {} expired, removing it", session_row.user_id);
        session::Entity::delete_by_id(session_row.id).exec(db).await?;
        return Ok(None);
    }

    if !user_row.is_active {
        warn!("Ignoring session of inactive user '{}'", user_row.username);
        return Ok(None);
    }

    Ok(Some(Identity {
        user: user_row,
        session_id: session_row.id,
        csrf_token: session_row.csrf_token,
    }))
}

pub async fn delete_session(db: &DatabaseConnection, session_id: &str) -> Result<(), DbErr> {
    let result = session::Entity::delete_many()
        .filter(session::Column::Id.eq(session_id))
        .exec(db)
        .await?;
    debug!("Deleted {} session row(s)", result.rows_affected);
    Ok(())
}

/// Pull the session id out of the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// The `Set-Cookie` value that hands a session id to the browser.
pub fn session_cookie(session_id: &str, ttl: Duration, secure: bool) -> Cookie<'static> {
    let max_age = cookie::time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// The `Set-Cookie` value that makes the browser forget its session.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}

/// Middleware that turns the session cookie into a [`RequestContext`].
pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match session_id_from_headers(request.headers()) {
        Some(session_id) => load_identity(&state.db, &session_id).await?,
        None => None,
    };

    if let Some(identity) = &identity {
        trace!(
            "Request authenticated as '{}' ({})",
            identity.user.username,
            identity.user.role
        );
    }

    request.extensions_mut().insert(RequestContext { identity });
    Ok(next.run(request).await)
}
