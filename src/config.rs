use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{debug, info, warn};

use crate::schemas::{AppState, Settings, DEFAULT_SESSION_TTL_SECS};
use crate::templates::build_templates;

/// Initialize application state against the given database
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    dotenvy::dotenv().ok();

    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("failed to connect to database '{}'", database_url))?;

    let templates = build_templates().context("failed to compile page templates")?;
    let settings = settings_from_env();
    debug!("Loaded settings: {:?}", settings);

    Ok(AppState {
        db,
        templates: Arc::new(templates),
        settings: Arc::new(settings),
    })
}

/// Read runtime settings from the environment, falling back to defaults
pub fn settings_from_env() -> Settings {
    let session_ttl = match std::env::var("LOGBOOK_SESSION_TTL_SECS") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    "Ignoring invalid LOGBOOK_SESSION_TTL_SECS '{}', using {}",
                    raw, DEFAULT_SESSION_TTL_SECS
                );
                DEFAULT_SESSION_TTL_SECS
            }
        },
        Err(_) => DEFAULT_SESSION_TTL_SECS,
    };

    let secure_cookies = std::env::var("LOGBOOK_SECURE_COOKIES")
        .map(|raw| parse_flag(&raw))
        .unwrap_or(false);

    Settings {
        session_ttl: Duration::from_secs(session_ttl),
        secure_cookies,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags_accept_common_truthy_spellings() {
        for raw in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(raw), "{raw} should be true");
        }
        for raw in ["0", "false", "", "nope"] {
            assert!(!parse_flag(raw), "{raw} should be false");
        }
    }
}
