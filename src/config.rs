use anyhow::Result;
use compute::ProjectionEngine;
use compute::cache::AccountingConfigCache;
use compute::store::SeaOrmRecordStore;
use config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://depositboard.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Service settings.
///
/// Read from, in increasing priority: built-in defaults, an optional
/// `depositboard.toml`, `DEPOSITBOARD_*` environment variables and the
/// conventional `DATABASE_URL` / `BIND_ADDRESS` variables. A `.env` file is
/// loaded into the environment first.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Comma separated categories spread by the accounting views
    pub accounting_categories: String,
    /// Lifetime of cached monthly series
    pub cache_ttl_secs: u64,
    /// Maximum number of cached monthly series and cached configurations
    pub cache_capacity: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("accounting_categories", "project")?
            .set_default("cache_ttl_secs", 300)?
            .set_default("cache_capacity", 1000)?
            .add_source(File::with_name("depositboard").required(false))
            .add_source(Environment::with_prefix("DEPOSITBOARD"))
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("bind_address", std::env::var("BIND_ADDRESS").ok())?
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// The accounting categories as a list, blanks removed.
    pub fn categories(&self) -> Vec<String> {
        self.accounting_categories
            .split(',')
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        self
    }

    pub fn with_bind_address(mut self, bind_address: Option<String>) -> Self {
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            accounting_categories: "project".to_string(),
            cache_ttl_secs: 300,
            cache_capacity: 1000,
        }
    }
}

/// Initialize application configuration and state
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    // Connect to database
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    Ok(build_app_state(db, settings))
}

/// Builds the shared state on top of an open connection.
pub fn build_app_state(db: DatabaseConnection, settings: &Settings) -> AppState {
    let categories = settings.categories();
    let categories = if categories.is_empty() {
        compute::DEFAULT_ACCOUNTING_CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .collect()
    } else {
        categories
    };
    debug!(?categories, "Accounting categories");

    let engine = ProjectionEngine::with_cache(
        Arc::new(SeaOrmRecordStore::new(db.clone())),
        AccountingConfigCache::new(settings.cache_capacity as usize, settings.cache_ttl_secs),
        categories,
    );

    // Initialize cache
    let cache = Cache::builder()
        .max_capacity(settings.cache_capacity)
        .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
        .build();

    AppState::new(db, engine, cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_split_and_trimmed() {
        let settings = Settings {
            accounting_categories: " project, consulting ,,".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.categories(), vec!["project", "consulting"]);
    }

    #[test]
    fn test_cli_overrides() {
        let settings = Settings::default()
            .with_database_url(Some("sqlite::memory:".to_string()))
            .with_bind_address(None);
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
    }
}
