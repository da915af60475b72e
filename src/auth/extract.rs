use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use model::{Role, SupervisorKind};
use tracing::{debug, warn};

use super::{Identity, RequestContext, LOGIN_PATH};

/// Whoever is signed in, if anyone. Never rejects.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<Identity>);

/// A signed-in student. Everyone else is sent to the login page.
#[derive(Clone, Debug)]
pub struct StudentUser(pub Identity);

/// A signed-in academic or industry supervisor.
#[derive(Clone, Debug)]
pub struct SupervisorUser {
    pub identity: Identity,
    pub kind: SupervisorKind,
}

fn identity_from_parts(parts: &Parts) -> Option<Identity> {
    parts
        .extensions
        .get::<RequestContext>()
        .and_then(|context| context.identity.clone())
}

/// Where to send a request that is not allowed through.
/// Anonymous visitors come back to the page they asked for after logging in.
fn login_redirect(parts: &Parts, identity: Option<&Identity>) -> Response {
    match identity {
        Some(identity) => {
            warn!(
                "User '{}' ({}) refused access to {}",
                identity.user.username,
                identity.user.role,
                parts.uri.path()
            );
            Redirect::to(LOGIN_PATH).into_response()
        }
        None => {
            debug!("Anonymous request to {} sent to login", parts.uri.path());
            let next = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            Redirect::to(&login_url_with_next(next)).into_response()
        }
    }
}

pub fn login_url_with_next(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{}?{}", LOGIN_PATH, query),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(identity_from_parts(parts)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StudentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity_from_parts(parts) {
            Some(identity) if identity.user.role == Role::Student => Ok(StudentUser(identity)),
            other => Err(login_redirect(parts, other.as_ref())),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SupervisorUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity_from_parts(parts) {
            Some(identity) => match identity.user.role.supervisor_kind() {
                Some(kind) => Ok(SupervisorUser { identity, kind }),
                None => Err(login_redirect(parts, Some(&identity))),
            },
            None => Err(login_redirect(parts, None)),
        }
    }
}
