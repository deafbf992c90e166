/// Commands that front ends call into
///
/// Each command takes the store plus a params struct and returns a
/// response carrying a human-readable message. This is where caller-side
/// rules such as "titles must not be empty" live; the store itself
/// accepts anything.

pub mod create;
pub mod list;
pub mod progress;
pub mod update;

pub use create::*;
pub use list::*;
pub use progress::*;
pub use update::*;

use thiserror::Error;

use crate::domain::{DomainError, Frequency};

/// Errors returned for rejected command input
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Habit title cannot be empty")]
    EmptyTitle,

    #[error("Habit title cannot be longer than {max} characters")]
    TitleTooLong { max: usize },

    #[error("Description cannot be longer than {max} characters")]
    DescriptionTooLong { max: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub const MAX_TITLE_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Parse frequency text into a Frequency
///
/// Accepted forms: `daily`, `weekdays`, `weekends`, `weekly:1,3,5`
/// (weekday ordinals, 0 = Sunday) and `every:N`.
pub fn parse_frequency(text: &str) -> Result<Frequency, DomainError> {
    let normalized = text.trim().to_lowercase();
    match normalized.as_str() {
        "daily" => return Ok(Frequency::Daily),
        "weekdays" => return Ok(Frequency::weekdays()),
        "weekends" => return Ok(Frequency::weekends()),
        _ => {}
    }

    if let Some(days) = normalized.strip_prefix("weekly:") {
        let mut ordinals = Vec::new();
        for part in days.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let ordinal = part.parse::<u8>().map_err(|_| {
                DomainError::InvalidFrequency(format!("'{}' is not a weekday number", part))
            })?;
            ordinals.push(ordinal);
        }
        return Frequency::weekly(ordinals);
    }

    if let Some(interval) = normalized.strip_prefix("every:") {
        let days = interval.trim().parse::<u32>().map_err(|_| {
            DomainError::InvalidFrequency(format!("'{}' is not a number of days", interval))
        })?;
        return Frequency::every_n_days(days);
    }

    Err(DomainError::InvalidFrequency(format!(
        "'{}'. Valid options: daily, weekdays, weekends, weekly:<days>, every:<n>",
        text
    )))
}

fn validate_title(title: &str) -> Result<String, CommandError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CommandError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CommandError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: Option<String>) -> Result<Option<String>, CommandError> {
    let Some(description) = description else {
        return Ok(None);
    };
    let trimmed = description.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(CommandError::DescriptionTooLong { max: MAX_DESCRIPTION_LEN });
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
