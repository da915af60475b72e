//! Authentication, sessions and the authorization predicates layered on top.
//!
//! The session middleware resolves the cookie into a [`RequestContext`] once per
//! request; handlers then ask for the identity they need through the typed
//! extractors in [`extract`].

pub mod extract;
pub mod password;
pub mod permissions;
pub mod session;

use model::entities::user;

pub use extract::{CurrentUser, StudentUser, SupervisorUser};

/// A logged-in user together with the session that authenticated them.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user: user::Model,
    pub session_id: String,
    pub csrf_token: String,
}

/// Per-request authentication state inserted by the session middleware.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

pub const LOGIN_PATH: &str = "/login/";
