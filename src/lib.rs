/// Public library interface for the habit tracker
///
/// The tracker keeps habits in an in-memory store, decides which ones are
/// due each day, and saves a JSON snapshot to a durable key-value slot
/// after every change.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// Internal modules
mod domain;
pub mod commands;
pub mod persistence;
pub mod storage;
pub mod store;

// Re-export public modules and types
pub use domain::*;
pub use persistence::{PersistenceAdapter, Restore, DEFAULT_STORAGE_KEY};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError};
pub use store::{CategoryProgress, Clock, HabitStore, Lifecycle, ManualClock, Snapshot, SystemClock};

/// Errors that can occur while setting up or shutting down the tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Snapshot writer failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

/// Settings for a tracker instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Name of the durable slot holding the snapshot
    pub storage_key: String,
    /// How every-N-days habits count their days
    pub custom_schedule: CustomSchedule,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            custom_schedule: CustomSchedule::default(),
        }
    }
}

/// A habit store wired to durable storage
///
/// Construct it, optionally query right away (results are empty until
/// hydration finishes), then call [`HabitTracker::hydrate`]. Must be
/// created inside a tokio runtime because it spawns the snapshot writer.
pub struct HabitTracker {
    store: HabitStore,
    persistence: PersistenceAdapter,
    writer: JoinHandle<()>,
}

impl HabitTracker {
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: TrackerConfig) -> Self {
        Self::with_clock(storage, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn KeyValueStorage>,
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let persistence = PersistenceAdapter::new(storage, config.storage_key, Arc::clone(&clock));
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = persistence.spawn_writer(receiver);
        let store = HabitStore::new(clock, config.custom_schedule).with_snapshot_sink(sender);

        Self {
            store,
            persistence,
            writer,
        }
    }

    /// Open a tracker backed by the SQLite database at `db_path`
    pub async fn open(db_path: PathBuf, config: TrackerConfig) -> Result<Self, TrackerError> {
        tracing::info!("Opening habit tracker with database: {:?}", db_path);
        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::new(Arc::new(storage), config))
    }

    /// Restore saved habits and mark the store ready
    pub async fn hydrate(&mut self) {
        let restore = self.persistence.restore().await;
        self.store.finish_hydration(restore);
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HabitStore {
        &mut self.store
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }

    /// Wait for every pending snapshot to be written
    pub async fn shutdown(mut self) -> Result<(), TrackerError> {
        self.store.detach_snapshot_sink();
        self.writer.await?;
        tracing::debug!("Habit tracker shut down");
        Ok(())
    }
}
