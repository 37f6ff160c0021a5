//! Shared application state.
//!
//! `CoreState` is built once at startup, wrapped in `Arc` and handed to the
//! HTTP layer. It holds no open connection: handlers open one per request.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::config::AppConfig;
use crate::db::{self, SqliteStore};
use crate::scheduling::{AppointmentLifecycle, NoopNotifier, Notifier, WorkingHours};

pub struct CoreState {
    config: AppConfig,
    notifier: Arc<dyn Notifier>,
    started_at: Instant,
}

impl CoreState {
    pub fn new(config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier,
            started_at: Instant::now(),
        }
    }

    /// State that drops every notification.
    pub fn without_notifications(config: AppConfig) -> Self {
        Self::new(config, Arc::new(NoopNotifier))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db_path(&self) -> &Path {
        &self.config.database_path
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Open a database connection (migrations applied).
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(self.db_path()).map_err(CoreError::Database)
    }

    /// Open a connection wrapped as an entity store.
    pub fn open_store(&self) -> Result<SqliteStore, CoreError> {
        Ok(SqliteStore::new(self.open_db()?))
    }

    /// Lifecycle manager over `store` with the configured hours and limits.
    pub fn lifecycle<'a>(
        &'a self,
        store: &'a SqliteStore,
    ) -> AppointmentLifecycle<'a, SqliteStore, WorkingHours> {
        AppointmentLifecycle::new(
            store,
            self.config.working_hours,
            self.notifier.as_ref(),
            self.config.notes_max_chars,
        )
    }

    /// Current local calendar date.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Make sure the database directory exists and the schema is current.
    pub fn prepare_database(&self) -> Result<PathBuf, CoreError> {
        if let Some(parent) = self.db_path().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| CoreError::DataDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        self.open_db()?;
        Ok(self.db_path().to_path_buf())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },
}
