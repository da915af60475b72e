use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tera::Tera;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Compiled page templates
    pub templates: Arc<Tera>,
    /// Runtime settings read at startup
    pub settings: Arc<Settings>,
}

/// Runtime settings that are not part of the CLI surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// How long a login session stays valid.
    pub session_ttl: Duration,
    /// Mark the session cookie `Secure` (serve behind HTTPS only).
    pub secure_cookies: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            secure_cookies: false,
        }
    }
}

/// Two weeks, the usual web-framework session age.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1_209_600;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}
