/// Durable round-trip of the habit collection
///
/// The adapter restores the last snapshot at startup and writes a fresh
/// snapshot after every store mutation. Failures are logged and never
/// reach the store: if the disk is unusable the app keeps working as an
/// in-memory tracker for the session.

pub mod snapshot;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::domain::Habit;
use crate::storage::{KeyValueStorage, StorageError};
use crate::store::{Clock, Snapshot};

pub use snapshot::SnapshotError;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "habit-storage";

/// Outcome of reading the durable snapshot at startup
#[derive(Debug, Clone, PartialEq)]
pub enum Restore {
    /// A snapshot was found and decoded
    Restored(Vec<Habit>),
    /// Nothing has been saved yet
    Absent,
    /// The snapshot could not be read or decoded
    Failed(String),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Clone)]
pub struct PersistenceAdapter {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            key: key.into(),
            clock,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and decode the last saved snapshot
    pub async fn restore(&self) -> Restore {
        let text = match self.storage.get(&self.key).await {
            Ok(Some(text)) => text,
            Ok(None) => return Restore::Absent,
            Err(e) => {
                error!("Failed to read saved habits from '{}': {}", self.key, e);
                return Restore::Failed(e.to_string());
            }
        };

        match snapshot::decode(&text, self.clock.now()) {
            Ok(habits) => {
                info!("Restored {} habits from '{}'", habits.len(), self.key);
                Restore::Restored(habits)
            }
            Err(e) => {
                error!("Failed to decode saved habits from '{}': {}", self.key, e);
                Restore::Failed(e.to_string())
            }
        }
    }

    /// Encode and write one snapshot
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let text = snapshot::encode(&snapshot.habits)?;
        self.storage.set(&self.key, &text).await?;
        debug!("Saved {} habits to '{}'", snapshot.habits.len(), self.key);
        Ok(())
    }

    /// Write snapshots from `receiver` in order until every sender is gone
    ///
    /// Write errors are logged and the loop carries on with the next
    /// snapshot.
    pub fn spawn_writer(&self, mut receiver: mpsc::UnboundedReceiver<Snapshot>) -> JoinHandle<()> {
        let adapter = self.clone();
        tokio::spawn(async move {
            while let Some(snapshot) = receiver.recv().await {
                if let Err(e) = adapter.save(&snapshot).await {
                    error!("Failed to save habits to '{}': {}", adapter.key, e);
                }
            }
            debug!("Snapshot writer for '{}' stopped", adapter.key);
        })
    }
}
