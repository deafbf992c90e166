/// Command for per-category progress

use serde::Serialize;

use crate::domain::CATEGORIES;
use crate::store::{CategoryProgress, HabitStore};

#[derive(Debug, Serialize)]
pub struct CategoryProgressEntry {
    pub category_id: String,
    pub title: String,
    pub progress: CategoryProgress,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub categories: Vec<CategoryProgressEntry>,
    pub total: usize,
    pub completed: usize,
    pub message: String,
}

/// Progress for every catalog category plus overall totals
///
/// Habits filed under ids missing from the catalog count towards the
/// totals only.
pub fn category_progress(store: &HabitStore) -> ProgressResponse {
    let categories: Vec<CategoryProgressEntry> = CATEGORIES
        .iter()
        .map(|category| CategoryProgressEntry {
            category_id: category.id.to_string(),
            title: category.title.to_string(),
            progress: store.category_progress(&category.category_id()),
        })
        .collect();

    let total = store.total_habits();
    let completed = store.completed_habits();

    let lines: Vec<String> = categories
        .iter()
        .map(|entry| {
            format!(
                "{:<15} {}/{} ({}%)",
                entry.title, entry.progress.completed, entry.progress.total, entry.progress.percentage
            )
        })
        .collect();
    let message = format!(
        "{}\n\n{} of {} habits completed",
        lines.join("\n"),
        completed,
        total
    );

    ProgressResponse { categories, total, completed, message }
}
