/// Habit entity and related functionality
///
/// This module defines the core Habit struct, the input used to create one
/// and the per-field update record applied by the store.

use chrono::{DateTime, Utc};

use crate::domain::{CategoryId, Frequency, HabitId};

/// A habit represents something the user wants to do regularly
///
/// Habits are created by the store, which assigns the id and creation time.
/// `completed_at` is only kept in step with `completed` by toggling; a
/// direct update may set either field on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display title (e.g. "Drink 8 glasses of water")
    pub title: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Category this habit belongs to
    pub category_id: CategoryId,
    /// Whether the habit is done for the current cycle
    pub completed: bool,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// When the habit was last marked complete
    pub completed_at: Option<DateTime<Utc>>,
    /// Recurrence rule; `None` means the habit is always due
    pub frequency: Option<Frequency>,
}

impl Habit {
    /// Create a fresh, uncompleted habit from caller-supplied data
    pub(crate) fn create(data: NewHabit, created_at: DateTime<Utc>) -> Self {
        Self {
            id: HabitId::new(),
            title: data.title,
            description: data.description,
            category_id: data.category_id,
            completed: false,
            created_at,
            completed_at: None,
            frequency: data.frequency,
        }
    }

    /// Create a habit from existing data (used when restoring a snapshot)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        title: String,
        description: Option<String>,
        category_id: CategoryId,
        completed: bool,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        frequency: Option<Frequency>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            category_id,
            completed,
            created_at,
            completed_at,
            frequency,
        }
    }

    /// Flip the completion flag, stamping or clearing `completed_at`
    pub(crate) fn toggle_completion(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }

    /// Merge the fields present in `update`, leaving the rest untouched
    pub(crate) fn apply(&mut self, update: HabitUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
    }
}

/// Caller-supplied data for a new habit
///
/// Title emptiness is not checked here; the caller owns that rule.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub frequency: Option<Frequency>,
}

impl NewHabit {
    pub fn new(title: impl Into<String>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            title: title.into(),
            description: None,
            category_id: category_id.into(),
            frequency: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }
}

/// Partial update for an existing habit
///
/// Each field is `None` when it should be left unchanged. Fields that are
/// themselves optional use a nested `Option` so they can be cleared.
/// Identity and creation time are not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<CategoryId>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub frequency: Option<Option<Frequency>>,
}

impl HabitUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn completed_at(mut self, completed_at: Option<DateTime<Utc>>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    pub fn frequency(mut self, frequency: Option<Frequency>) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
