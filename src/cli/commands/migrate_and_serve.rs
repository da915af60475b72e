use anyhow::Result;
use tracing::{debug, info, trace};

use super::initdb::apply_migrations;
use super::serve::serve;

pub async fn migrate_and_serve(database_url: &str, bind_address: &str) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", database_url);
    debug!("Bind address: {}", bind_address);

    // The migration connection is dropped before the server opens its own pool
    let db = apply_migrations(database_url).await?;
    drop(db);

    serve(database_url, bind_address).await
}
