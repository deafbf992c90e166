/// Save/restore round trips through the persistence adapter
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use habit_tracker::*;
use tempfile::tempdir;

struct UnavailableStorage;

#[async_trait]
impl KeyValueStorage for UnavailableStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("device locked".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("device locked".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("device locked".to_string()))
    }
}

/// Slot whose first read fails, as when the device is still locked at launch
struct FirstReadFails {
    inner: MemoryStorage,
    failed_once: AtomicBool,
}

impl FirstReadFails {
    fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            failed_once: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl KeyValueStorage for FirstReadFails {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Unavailable("device locked".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn test_round_trip_through_sqlite() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("habits.db");

    let mut tracker = HabitTracker::open(db_path.clone(), TrackerConfig::default())
        .await
        .expect("Failed to open tracker");
    tracker.hydrate().await;

    let store = tracker.store_mut();
    let read = store.add_habit(
        NewHabit::new("Read", "mental")
            .description("ten pages")
            .frequency(Frequency::weekly([1, 3, 5]).unwrap()),
    );
    let run = store.add_habit(NewHabit::new("Run", "physical").frequency(Frequency::every_n_days(2).unwrap()));
    store.toggle_habit_completion(&run.id);
    let saved: Vec<Habit> = store.habits().to_vec();
    tracker.shutdown().await.expect("Failed to flush writes");

    let mut reopened = HabitTracker::open(db_path, TrackerConfig::default())
        .await
        .expect("Failed to reopen tracker");
    assert!(!reopened.store().is_hydrated());
    assert_eq!(reopened.store().total_habits(), 0);

    reopened.hydrate().await;
    let restored = reopened.store().habits();
    assert_eq!(restored.len(), 2);

    for (before, after) in saved.iter().zip(restored) {
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, before.title);
        assert_eq!(after.description, before.description);
        assert_eq!(after.category_id, before.category_id);
        assert_eq!(after.completed, before.completed);
        assert_eq!(after.frequency, before.frequency);
        assert_eq!(
            after.created_at.timestamp_millis(),
            before.created_at.timestamp_millis()
        );
        assert_eq!(
            after.completed_at.map(|at| at.timestamp_millis()),
            before.completed_at.map(|at| at.timestamp_millis())
        );
    }
    assert_eq!(restored[0].id, read.id);
    reopened.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_fresh_install_hydrates_empty() {
    let storage = Arc::new(MemoryStorage::new());
    let mut tracker = HabitTracker::new(storage, TrackerConfig::default());
    let lifecycle = tracker.store().subscribe_lifecycle();

    tracker.hydrate().await;

    assert_eq!(*lifecycle.borrow(), Lifecycle::Ready);
    assert_eq!(tracker.store().total_habits(), 0);
    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_only_habits_are_persisted() {
    let storage = Arc::new(MemoryStorage::new());
    let mut tracker = HabitTracker::new(storage.clone(), TrackerConfig::default());
    tracker.hydrate().await;
    tracker.store_mut().add_habit(NewHabit::new("Pray", "spiritual"));
    tracker.shutdown().await.unwrap();

    let text = storage.get(DEFAULT_STORAGE_KEY).await.unwrap().expect("snapshot written");
    let payload: serde_json::Value = serde_json::from_str(&text).unwrap();
    let keys: Vec<&String> = payload.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["habits"]);
    assert_eq!(payload["habits"][0]["categoryId"], "spiritual");
    assert!(payload["habits"][0]["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_custom_storage_key() {
    let storage = Arc::new(MemoryStorage::new());
    let config = TrackerConfig {
        storage_key: "habits-v2".to_string(),
        ..TrackerConfig::default()
    };
    let mut tracker = HabitTracker::new(storage.clone(), config);
    tracker.hydrate().await;
    tracker.store_mut().add_habit(NewHabit::new("Pray", "spiritual"));
    tracker.shutdown().await.unwrap();

    assert!(storage.get("habits-v2").await.unwrap().is_some());
    assert!(storage.get(DEFAULT_STORAGE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_restores_payload_from_older_builds() {
    let payload = serde_json::json!({
        "state": {"habits": [
            {"id": "1712345678901k3j2h1g0f", "title": "Call mentor", "categoryId": "accountability",
             "completed": false, "createdAt": "2024-04-05T19:34:38.901Z"},
            {"id": "1712345679999a1b2c3d4e", "title": "Stretch", "categoryId": "physical",
             "completed": true, "createdAt": "garbled", "completedAt": "2024-04-06T07:00:00.000Z",
             "frequency": {"type": "weekly", "days": [0, 6]}}
        ]},
        "version": 0
    });
    let storage = Arc::new(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, &payload.to_string()));
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 7, 12, 0, 0).unwrap()));

    let mut tracker = HabitTracker::with_clock(storage, TrackerConfig::default(), clock.clone());
    tracker.hydrate().await;

    let store = tracker.store();
    assert_eq!(store.total_habits(), 2);
    assert_eq!(store.completed_habits(), 1);
    let stretch = &store.habits()[1];
    assert_eq!(stretch.created_at, clock.now());
    assert_eq!(stretch.frequency, Some(Frequency::weekends()));

    // 2024-04-07 is a Sunday: both habits are due
    assert_eq!(store.habits_for_today().len(), 2);
    tracker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unavailable_storage_degrades_to_memory() {
    let mut tracker = HabitTracker::new(Arc::new(UnavailableStorage), TrackerConfig::default());
    tracker.hydrate().await;
    assert!(tracker.store().is_hydrated());

    let store = tracker.store_mut();
    let habit = store.add_habit(NewHabit::new("Read", "mental"));
    store.toggle_habit_completion(&habit.id);
    assert_eq!(store.completed_habits(), 1);

    assert!(tracker.shutdown().await.is_ok());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_left_untouched() {
    let storage = Arc::new(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, "{\"habits\": 42}"));
    let mut tracker = HabitTracker::new(storage.clone(), TrackerConfig::default());
    tracker.hydrate().await;
    assert!(tracker.store().is_hydrated());
    assert_eq!(tracker.store().total_habits(), 0);

    tracker.store_mut().add_habit(NewHabit::new("Read", "mental"));
    assert_eq!(tracker.store().total_habits(), 1);
    tracker.shutdown().await.unwrap();

    let text = storage.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
    assert_eq!(text, "{\"habits\": 42}");
}

#[tokio::test]
async fn test_failed_read_does_not_overwrite_saved_habits() {
    let storage = Arc::new(MemoryStorage::new());
    let mut first = HabitTracker::new(storage.clone(), TrackerConfig::default());
    first.hydrate().await;
    first.store_mut().add_habit(NewHabit::new("A", "mental"));
    first.store_mut().add_habit(NewHabit::new("B", "physical"));
    first.shutdown().await.unwrap();
    let saved = storage.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();

    let flaky = Arc::new(FirstReadFails::new(MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, &saved)));
    let mut second = HabitTracker::new(flaky.clone(), TrackerConfig::default());
    second.hydrate().await;
    assert!(second.store().is_hydrated());
    assert_eq!(second.store().total_habits(), 0);
    second.store_mut().add_habit(NewHabit::new("C", "spiritual"));
    second.shutdown().await.unwrap();

    let mut third = HabitTracker::new(flaky, TrackerConfig::default());
    third.hydrate().await;
    let titles: Vec<&str> = third.store().habits().iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    third.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_habits_added_while_loading_are_saved() {
    let storage = Arc::new(MemoryStorage::new());
    let mut tracker = HabitTracker::new(storage.clone(), TrackerConfig::default());
    tracker.store_mut().add_habit(NewHabit::new("Early", "mental"));

    tracker.hydrate().await;
    assert_eq!(tracker.store().total_habits(), 1);
    tracker.shutdown().await.unwrap();

    let mut reopened = HabitTracker::new(storage, TrackerConfig::default());
    reopened.hydrate().await;
    assert_eq!(reopened.store().total_habits(), 1);
    assert_eq!(reopened.store().habits()[0].title, "Early");
    reopened.shutdown().await.unwrap();
}

#[test]
fn test_sqlite_storage_blocking_round_trip() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let storage = SqliteStorage::new(temp_dir.path().join("kv.db")).expect("Failed to open storage");

    tokio_test::block_on(storage.set("slot", "value")).unwrap();
    let value = tokio_test::block_on(storage.get("slot")).unwrap();
    assert_eq!(value.as_deref(), Some("value"));
}
