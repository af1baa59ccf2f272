use std::path::PathBuf;

use crate::error::Result;
use crate::services::AppServices;
use spool_db::Db;

/// Paths needed to run the tracker.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

/// Application state shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        let config = AppConfig { db_path };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        let mut db = Db::open(&self.config.db_path)?;
        db.migrate()?;
        Ok(())
    }

    /// Create tables if absent and load persisted settings into the
    /// in-memory mirror. Called once at startup.
    pub fn initialize(&self) -> Result<()> {
        self.setup_db()?;
        self.services.config.load()?;
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}
