/// Commands for listing habits
///
/// This module implements the plain listing and the "due today" view.

use serde::{Deserialize, Serialize};

use crate::domain::{category_title, CategoryId, Habit};
use crate::store::HabitStore;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize)]
pub struct ListHabitsParams {
    /// Only habits in this category
    pub category: Option<String>,
}

/// One habit as shown to the user
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub frequency: String,
    pub completed: bool,
    pub due_today: bool,
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub message: String,
}

fn summarize(store: &HabitStore, habit: &Habit) -> HabitSummary {
    HabitSummary {
        id: habit.id.to_string(),
        title: habit.title.clone(),
        category: category_title(&habit.category_id),
        frequency: habit
            .frequency
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "Every day".to_string()),
        completed: habit.completed,
        due_today: store.is_habit_due_today(habit),
    }
}

fn render(summaries: &[HabitSummary]) -> String {
    summaries
        .iter()
        .map(|h| {
            format!(
                "[{}] {} ({}) - {} - {}",
                if h.completed { "x" } else { " " },
                h.title,
                h.category,
                h.frequency,
                h.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// List habits, optionally restricted to one category
pub fn list_habits(store: &HabitStore, params: ListHabitsParams) -> ListHabitsResponse {
    let habits = match params.category.as_deref() {
        Some(category) => store.habits_by_category(&CategoryId::new(category.trim())),
        None => store.habits().to_vec(),
    };
    let summaries: Vec<HabitSummary> = habits.iter().map(|h| summarize(store, h)).collect();

    let message = if !store.is_hydrated() {
        "Habits are still loading".to_string()
    } else if summaries.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        format!("{} habits\n\n{}", summaries.len(), render(&summaries))
    };

    ListHabitsResponse { habits: summaries, message }
}

/// Habits that are due today
pub fn habits_due_today(store: &HabitStore) -> ListHabitsResponse {
    let summaries: Vec<HabitSummary> = store
        .habits_for_today()
        .iter()
        .map(|h| summarize(store, h))
        .collect();

    let message = if !store.is_hydrated() {
        "Habits are still loading".to_string()
    } else if summaries.is_empty() {
        "Nothing due today".to_string()
    } else {
        let done = summaries.iter().filter(|h| h.completed).count();
        format!(
            "{} of {} due habits done today\n\n{}",
            done,
            summaries.len(),
            render(&summaries)
        )
    };

    ListHabitsResponse { habits: summaries, message }
}
