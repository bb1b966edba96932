use anyhow::Result;
use tracing::{debug, info, trace};

use super::initdb::init_database;
use super::serve::run_server;
use crate::config::{build_app_state, Settings};

pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    // The migrated connection is reused for serving
    let db = init_database(&settings.database_url).await?;
    let state = build_app_state(db, settings);
    debug!("Application state initialized successfully");

    run_server(state, &settings.bind_address).await
}
