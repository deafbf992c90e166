/// Due-date evaluation for habits
///
/// A habit is "due" on a date when its frequency rule says so. Day counts
/// use UTC calendar dates, so a completion at 23:59 and a reference at
/// 00:01 the next day are one day apart.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::domain::{Frequency, Habit};

/// How every-N-days habits count their days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomSchedule {
    /// Due once at least N days have passed since the last completion.
    /// A habit that was never completed is due.
    #[default]
    SinceLastCompletion,
    /// Due on every Nth day counted from the creation date.
    SinceCreation,
}

/// Whole calendar days from `from` to `to` (negative if `to` is earlier)
fn days_between(from: DateTime<Utc>, to: NaiveDate) -> i64 {
    (to - from.date_naive()).num_days()
}

/// Decide whether `habit` is due on `date`
///
/// Habits without a frequency are always due.
pub fn is_due_on(habit: &Habit, date: NaiveDate, schedule: CustomSchedule) -> bool {
    let Some(frequency) = &habit.frequency else {
        return true;
    };

    match frequency {
        Frequency::Daily => true,
        Frequency::Weekly { days } => days.contains(date.weekday()),
        Frequency::Custom { interval_days } => {
            let interval = i64::from(interval_days.get());
            match schedule {
                CustomSchedule::SinceLastCompletion => match habit.completed_at {
                    None => true,
                    Some(completed_at) => days_between(completed_at, date) >= interval,
                },
                CustomSchedule::SinceCreation => {
                    let elapsed = days_between(habit.created_at, date);
                    elapsed >= 0 && elapsed % interval == 0
                }
            }
        }
    }
}
