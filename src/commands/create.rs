/// Command for creating new habits

use serde::{Deserialize, Serialize};

use crate::commands::{parse_frequency, validate_description, validate_title, CommandError};
use crate::domain::{category_title, CategoryId, Frequency, NewHabit};
use crate::store::HabitStore;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    /// Frequency text; daily when omitted
    pub frequency: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit_id: String,
    pub message: String,
}

/// Validate the input and add the habit to the store
pub fn create_habit(
    store: &mut HabitStore,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, CommandError> {
    let title = validate_title(&params.title)?;
    let description = validate_description(params.description)?;
    let frequency = match params.frequency.as_deref() {
        Some(text) => parse_frequency(text)?,
        None => Frequency::Daily,
    };
    let category_id = CategoryId::new(params.category.trim());

    let mut data = NewHabit::new(title, category_id.clone()).frequency(frequency);
    data.description = description;
    let habit = store.add_habit(data);

    Ok(CreateHabitResponse {
        habit_id: habit.id.to_string(),
        message: format!(
            "Created {} habit '{}' ({})",
            category_title(&category_id),
            habit.title,
            habit.frequency.as_ref().map(ToString::to_string).unwrap_or_default()
        ),
    })
}
