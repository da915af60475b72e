use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{debug, info, trace};

use crate::auth::session::purge_expired_sessions;

pub async fn clear_sessions(database_url: &str) -> Result<()> {
    trace!("Entering clear_sessions command");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("failed to connect to database '{}'", database_url))?;

    let removed = purge_expired_sessions(&db)
        .await
        .context("failed to delete expired sessions")?;
    info!("Removed {} expired session(s)", removed);
    Ok(())
}
