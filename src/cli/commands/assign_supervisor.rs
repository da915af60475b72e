use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{debug, error, info, trace};

use crate::roster;

pub async fn assign_supervisor(database_url: &str, student: &str, supervisor: &str) -> Result<()> {
    trace!("Entering assign_supervisor command");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("failed to connect to database '{}'", database_url))?;

    match roster::assign_supervisor(&db, student, supervisor).await {
        Ok(profile) => {
            info!(
                "Student '{}' now has academic supervisor {:?} and industry supervisor {:?}",
                student, profile.academic_supervisor_id, profile.industry_supervisor_id
            );
            Ok(())
        }
        Err(e) => {
            error!(
                "Failed to assign supervisor '{}' to student '{}': {}",
                supervisor, student, e
            );
            Err(e.into())
        }
    }
}
