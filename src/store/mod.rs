/// In-memory habit store
///
/// The store is the single source of truth for habits. All reads and writes
/// go through it. It runs on one logical thread: callers hold it by value
/// or `&mut` and no locking is involved.
///
/// # Lifecycle
///
/// A store starts `Uninitialized` and becomes `Ready` once hydration from
/// durable storage has finished (successfully or not). Queries made before
/// then return empty results. Mutations before then still apply in memory
/// and are held back from persistence until the restore outcome is known:
/// a successful restore replaces them, a definitively absent snapshot
/// publishes them. A failed restore leaves the store volatile for the rest
/// of the session so the unread snapshot is never overwritten.

pub mod clock;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::domain::{
    is_due_on, CategoryId, CustomSchedule, Habit, HabitId, HabitUpdate, NewHabit,
};
use crate::persistence::Restore;

pub use clock::{Clock, ManualClock, SystemClock};

/// Whether the store has been hydrated from durable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
}

/// Full copy of the habit sequence taken right after a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub habits: Vec<Habit>,
}

/// Completion counts for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryProgress {
    pub completed: usize,
    pub total: usize,
    /// 0..=100, rounded half up; 0 when `total` is 0
    pub percentage: u8,
}

impl CategoryProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            // round(completed / total * 100) with halves rounded up, in integers
            ((completed.min(total) * 200 + total) / (total * 2)) as u8
        };
        Self { completed, total, percentage }
    }
}

pub struct HabitStore {
    habits: Vec<Habit>,
    clock: Arc<dyn Clock>,
    schedule: CustomSchedule,
    lifecycle: watch::Sender<Lifecycle>,
    snapshots: Option<mpsc::UnboundedSender<Snapshot>>,
}

impl HabitStore {
    /// Create an empty, uninitialized store
    pub fn new(clock: Arc<dyn Clock>, schedule: CustomSchedule) -> Self {
        let (lifecycle, _) = watch::channel(Lifecycle::Uninitialized);
        Self {
            habits: Vec::new(),
            clock,
            schedule,
            lifecycle,
            snapshots: None,
        }
    }

    /// A volatile store that is ready immediately and never persists
    pub fn in_memory() -> Self {
        let store = Self::new(Arc::new(SystemClock), CustomSchedule::default());
        store.lifecycle.send_replace(Lifecycle::Ready);
        store
    }

    /// Publish a snapshot to `sink` after every mutation made while ready
    pub fn with_snapshot_sink(mut self, sink: mpsc::UnboundedSender<Snapshot>) -> Self {
        self.snapshots = Some(sink);
        self
    }

    /// Drop the snapshot sink so a writer waiting on it can finish
    pub fn detach_snapshot_sink(&mut self) {
        self.snapshots = None;
    }

    pub fn custom_schedule(&self) -> CustomSchedule {
        self.schedule
    }

    // Lifecycle

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.borrow()
    }

    pub fn is_hydrated(&self) -> bool {
        self.lifecycle() == Lifecycle::Ready
    }

    /// Watch for the transition to `Ready`
    pub fn subscribe_lifecycle(&self) -> watch::Receiver<Lifecycle> {
        self.lifecycle.subscribe()
    }

    /// Apply the outcome of the startup restore and mark the store ready
    ///
    /// Only the first call has any effect.
    pub fn finish_hydration(&mut self, restore: Restore) {
        if self.is_hydrated() {
            warn!("Ignoring hydration: store is already ready");
            return;
        }

        let save_pending = matches!(restore, Restore::Absent) && !self.habits.is_empty();

        match restore {
            Restore::Restored(habits) => {
                info!("Hydrated store with {} habits", habits.len());
                self.habits = habits;
            }
            Restore::Absent => {
                info!("No saved habits found, starting fresh");
            }
            Restore::Failed(reason) => {
                warn!(
                    "Restore failed ({}), continuing with {} in-memory habits; changes will not be saved this session",
                    reason,
                    self.habits.len()
                );
                self.detach_snapshot_sink();
            }
        }

        self.lifecycle.send_replace(Lifecycle::Ready);

        // Habits added while loading have not been saved yet
        if save_pending {
            self.publish();
        }
    }

    // Mutations

    /// Create a habit and append it to the collection
    ///
    /// The title is not validated.
    pub fn add_habit(&mut self, data: NewHabit) -> Habit {
        let habit = Habit::create(data, self.clock.now());
        debug!("Added habit: {} ({})", habit.title, habit.id);
        self.habits.push(habit.clone());
        self.publish();
        habit
    }

    /// Merge `update` into the habit with `id`
    ///
    /// Returns false, changing nothing, when no habit has that id.
    pub fn update_habit(&mut self, id: &HabitId, update: HabitUpdate) -> bool {
        let Some(habit) = self.habits.iter_mut().find(|h| &h.id == id) else {
            debug!("Update ignored, unknown habit: {}", id);
            return false;
        };
        habit.apply(update);
        debug!("Updated habit: {} ({})", habit.title, habit.id);
        self.publish();
        true
    }

    /// Remove the habit with `id`; false if there was none
    pub fn delete_habit(&mut self, id: &HabitId) -> bool {
        let before = self.habits.len();
        self.habits.retain(|h| &h.id != id);
        if self.habits.len() == before {
            debug!("Delete ignored, unknown habit: {}", id);
            return false;
        }
        debug!("Deleted habit: {}", id);
        self.publish();
        true
    }

    /// Flip completion for the habit with `id`; false if there was none
    pub fn toggle_habit_completion(&mut self, id: &HabitId) -> bool {
        let now = self.clock.now();
        let Some(habit) = self.habits.iter_mut().find(|h| &h.id == id) else {
            debug!("Toggle ignored, unknown habit: {}", id);
            return false;
        };
        habit.toggle_completion(now);
        debug!("Toggled habit {} to completed={}", habit.id, habit.completed);
        self.publish();
        true
    }

    /// Remove every habit
    pub fn clear_all_habits(&mut self) {
        let removed = self.habits.len();
        self.habits.clear();
        info!("Cleared {} habits", removed);
        self.publish();
    }

    // Queries

    /// All habits in insertion order
    pub fn habits(&self) -> &[Habit] {
        if self.is_hydrated() {
            self.habits.as_slice()
        } else {
            &[]
        }
    }

    pub fn get_habit(&self, id: &HabitId) -> Option<&Habit> {
        self.habits().iter().find(|h| &h.id == id)
    }

    pub fn habits_by_category(&self, category_id: &CategoryId) -> Vec<Habit> {
        self.habits()
            .iter()
            .filter(|h| &h.category_id == category_id)
            .cloned()
            .collect()
    }

    pub fn is_habit_due_on(&self, habit: &Habit, date: NaiveDate) -> bool {
        self.is_hydrated() && is_due_on(habit, date, self.schedule)
    }

    pub fn is_habit_due_today(&self, habit: &Habit) -> bool {
        self.is_habit_due_on(habit, self.clock.today())
    }

    /// Habits due on the clock's current date
    pub fn habits_for_today(&self) -> Vec<Habit> {
        let today = self.clock.today();
        self.habits()
            .iter()
            .filter(|h| is_due_on(h, today, self.schedule))
            .cloned()
            .collect()
    }

    pub fn category_progress(&self, category_id: &CategoryId) -> CategoryProgress {
        let (completed, total) = self
            .habits()
            .iter()
            .filter(|h| &h.category_id == category_id)
            .fold((0, 0), |(done, total), h| (done + usize::from(h.completed), total + 1));
        CategoryProgress::new(completed, total)
    }

    pub fn total_habits(&self) -> usize {
        self.habits().len()
    }

    pub fn completed_habits(&self) -> usize {
        self.habits().iter().filter(|h| h.completed).count()
    }

    /// Send the current sequence to the snapshot sink, if ready
    fn publish(&mut self) {
        if !self.is_hydrated() {
            return;
        }
        let Some(sink) = &self.snapshots else {
            return;
        };
        let snapshot = Snapshot { habits: self.habits.clone() };
        if sink.send(snapshot).is_err() {
            warn!("Snapshot writer has stopped; changes will not be saved");
            self.snapshots = None;
        }
    }
}
