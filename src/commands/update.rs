/// Commands that change existing habits: update, toggle, delete, clear
///
/// Unknown ids are not errors. The response reports `success: false` and
/// the store is left untouched.

use serde::{Deserialize, Serialize};

use crate::commands::{parse_frequency, validate_description, validate_title, CommandError};
use crate::domain::{HabitId, HabitUpdate};
use crate::store::HabitStore;

/// Parameters for updating an existing habit
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitParams {
    pub habit_id: String,
    pub title: Option<String>,
    /// An empty description clears it
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<String>,
}

/// Response from any command that targets one habit
#[derive(Debug, Serialize)]
pub struct HabitChangeResponse {
    pub success: bool,
    pub message: String,
}

impl HabitChangeResponse {
    fn not_found(habit_id: &str) -> Self {
        Self {
            success: false,
            message: format!("No habit with id '{}'", habit_id),
        }
    }
}

/// Apply the given fields to a habit
pub fn update_habit(
    store: &mut HabitStore,
    params: UpdateHabitParams,
) -> Result<HabitChangeResponse, CommandError> {
    let mut update = HabitUpdate::new();
    if let Some(title) = params.title {
        update = update.title(validate_title(&title)?);
    }
    if let Some(description) = params.description {
        update = update.description(validate_description(Some(description))?);
    }
    if let Some(category) = params.category {
        update = update.category(category.trim());
    }
    if let Some(frequency) = params.frequency {
        update = update.frequency(Some(parse_frequency(&frequency)?));
    }

    if update.is_empty() {
        return Ok(HabitChangeResponse {
            success: true,
            message: "Nothing to update".to_string(),
        });
    }

    let id = HabitId::from(params.habit_id.as_str());
    if !store.update_habit(&id, update) {
        return Ok(HabitChangeResponse::not_found(&params.habit_id));
    }

    let title = store.get_habit(&id).map(|h| h.title.clone()).unwrap_or_default();
    Ok(HabitChangeResponse {
        success: true,
        message: format!("Updated habit '{}'", title),
    })
}

/// Mark a habit done, or undo it
pub fn toggle_habit(store: &mut HabitStore, habit_id: &str) -> HabitChangeResponse {
    let id = HabitId::from(habit_id);
    if !store.toggle_habit_completion(&id) {
        return HabitChangeResponse::not_found(habit_id);
    }

    let message = match store.get_habit(&id) {
        Some(habit) if habit.completed => format!("Completed '{}'", habit.title),
        Some(habit) => format!("Marked '{}' as not done", habit.title),
        None => "Toggled habit".to_string(),
    };
    HabitChangeResponse { success: true, message }
}

pub fn delete_habit(store: &mut HabitStore, habit_id: &str) -> HabitChangeResponse {
    let id = HabitId::from(habit_id);
    let title = store.get_habit(&id).map(|h| h.title.clone());
    if !store.delete_habit(&id) {
        return HabitChangeResponse::not_found(habit_id);
    }
    HabitChangeResponse {
        success: true,
        message: format!("Deleted habit '{}'", title.unwrap_or_default()),
    }
}

pub fn clear_habits(store: &mut HabitStore) -> HabitChangeResponse {
    let removed = store.total_habits();
    store.clear_all_habits();
    HabitChangeResponse {
        success: true,
        message: format!("Removed {} habits", removed),
    }
}
