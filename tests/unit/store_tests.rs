/// Store behaviour seen through the public API
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use habit_tracker::*;

fn ready_store(clock: Arc<ManualClock>) -> HabitStore {
    let mut store = HabitStore::new(clock, CustomSchedule::default());
    store.finish_hydration(Restore::Absent);
    store
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap()))
}

#[test]
fn test_ids_stay_unique_across_adds_and_deletes() {
    let mut store = ready_store(clock());
    let mut deleted = Vec::new();

    for round in 0..20 {
        let habit = store.add_habit(NewHabit::new(format!("Habit {}", round), "mental"));
        if round % 3 == 0 {
            store.delete_habit(&habit.id);
            deleted.push(habit.id);
        }
    }

    let ids: HashSet<&HabitId> = store.habits().iter().map(|h| &h.id).collect();
    assert_eq!(ids.len(), store.total_habits());
    assert!(deleted.iter().all(|id| !ids.contains(id)));
}

#[test]
fn test_double_toggle_restores_completed() {
    let clock = clock();
    let mut store = ready_store(clock.clone());
    let habit = store.add_habit(NewHabit::new("Read", "mental"));

    store.toggle_habit_completion(&habit.id);
    clock.advance(Duration::minutes(5));
    store.toggle_habit_completion(&habit.id);

    let after = store.get_habit(&habit.id).unwrap();
    assert_eq!(after.completed, habit.completed);
    assert_eq!(after.completed_at, habit.completed_at);

    // A completed habit toggled twice keeps `completed` but gets a new timestamp
    store.toggle_habit_completion(&habit.id);
    let first_completion = store.get_habit(&habit.id).unwrap().completed_at;
    clock.advance(Duration::minutes(5));
    store.toggle_habit_completion(&habit.id);
    store.toggle_habit_completion(&habit.id);
    let again = store.get_habit(&habit.id).unwrap();
    assert!(again.completed);
    assert_ne!(again.completed_at, first_completion);
}

#[test]
fn test_category_progress_bounds() {
    let mut store = ready_store(clock());
    assert_eq!(store.category_progress(&CategoryId::from("mental")).percentage, 0);

    let mut ids = Vec::new();
    for n in 0..7 {
        ids.push(store.add_habit(NewHabit::new(format!("M{}", n), "mental")).id);
    }
    for (done, id) in ids.iter().enumerate() {
        let progress = store.category_progress(&CategoryId::from("mental"));
        assert!(progress.percentage <= 100);
        assert_eq!(progress.completed, done);
        store.toggle_habit_completion(id);
    }
    let progress = store.category_progress(&CategoryId::from("mental"));
    assert_eq!(progress, CategoryProgress { completed: 7, total: 7, percentage: 100 });
}

#[test]
fn test_habits_by_category_filters_in_order() {
    let mut store = ready_store(clock());
    store.add_habit(NewHabit::new("Meditate", "mental"));
    store.add_habit(NewHabit::new("Run", "physical"));
    store.add_habit(NewHabit::new("Read", "mental"));
    store.add_habit(NewHabit::new("Lift", "physical"));

    let mental = store.habits_by_category(&CategoryId::from("mental"));
    let titles: Vec<&str> = mental.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Meditate", "Read"]);
}

#[test]
fn test_update_merges_fields() {
    let mut store = ready_store(clock());
    let habit = store.add_habit(
        NewHabit::new("Read", "mental")
            .description("ten pages")
            .frequency(Frequency::Daily),
    );

    store.update_habit(
        &habit.id,
        HabitUpdate::new()
            .category("spiritual")
            .frequency(Some(Frequency::every_n_days(2).unwrap())),
    );

    let updated = store.get_habit(&habit.id).unwrap();
    assert_eq!(updated.title, "Read");
    assert_eq!(updated.description.as_deref(), Some("ten pages"));
    assert_eq!(updated.category_id, CategoryId::from("spiritual"));
    assert_eq!(updated.created_at, habit.created_at);
    assert_eq!(updated.frequency, Some(Frequency::every_n_days(2).unwrap()));
}

#[test]
fn test_direct_update_does_not_fix_completed_at() {
    let mut store = ready_store(clock());
    let habit = store.add_habit(NewHabit::new("Read", "mental"));

    store.update_habit(&habit.id, HabitUpdate::new().completed(true));

    let updated = store.get_habit(&habit.id).unwrap();
    assert!(updated.completed);
    assert!(updated.completed_at.is_none());
}

#[test]
fn test_clear_and_counts() {
    let mut store = ready_store(clock());
    let a = store.add_habit(NewHabit::new("A", "mental"));
    store.add_habit(NewHabit::new("B", "physical"));
    store.toggle_habit_completion(&a.id);

    assert_eq!(store.total_habits(), 2);
    assert_eq!(store.completed_habits(), 1);

    store.clear_all_habits();
    assert_eq!(store.total_habits(), 0);
    assert_eq!(store.completed_habits(), 0);
}

#[test]
fn test_in_memory_store_is_ready() {
    let mut store = HabitStore::in_memory();
    assert_eq!(store.lifecycle(), Lifecycle::Ready);
    store.add_habit(NewHabit::new("Read", "mental"));
    assert_eq!(store.total_habits(), 1);
}
