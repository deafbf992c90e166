/// Domain module containing core business logic and data types
///
/// This module defines the Habit entity, its frequency rule, the schedule
/// that decides when a habit is due, and the category catalog.

pub mod category;
pub mod habit;
pub mod schedule;
pub mod types;

// Re-export public types for easy access
pub use category::*;
pub use habit::*;
pub use schedule::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur while building domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid weekday ordinal {0}: expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),

    #[error("Invalid interval {0}: must be at least 1 day")]
    InvalidInterval(u32),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),
}
