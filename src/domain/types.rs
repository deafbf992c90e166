/// Core types and enums used throughout the domain layer
///
/// This module defines the identifier types and the Frequency rule that
/// decides when a habit recurs.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// New habits get a random UUID, but any non-empty string is accepted so
/// that snapshots written by earlier builds (which used timestamp-based
/// ids) still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an externally defined category (e.g. "mental")
///
/// The store never checks that the category exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of weekdays, stored as ordinals where 0 is Sunday and 6 is Saturday
///
/// Serialized as a sorted array of ordinals. Ordinals above 6 are rejected
/// both by the constructor and during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    /// Build a set from weekday ordinals (0 = Sunday .. 6 = Saturday)
    pub fn from_ordinals<I>(ordinals: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut days = BTreeSet::new();
        for ordinal in ordinals {
            if ordinal > 6 {
                return Err(DomainError::InvalidWeekday(ordinal));
            }
            days.insert(ordinal);
        }
        Ok(Self(days))
    }

    /// Build a set from chrono weekdays
    pub fn from_weekdays<I>(weekdays: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self(
            weekdays
                .into_iter()
                .map(|day| day.num_days_from_sunday() as u8)
                .collect(),
        )
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0.contains(&(weekday.num_days_from_sunday() as u8))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ordinals in ascending order (Sunday first)
    pub fn ordinals(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = DomainError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_ordinals(value)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.0.into_iter().collect()
    }
}

/// How often a habit should be performed
///
/// On the wire this is an object tagged by `type`, e.g.
/// `{"type":"weekly","days":[1,3,5]}` or `{"type":"custom","interval":3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frequency {
    /// Every single day
    Daily,
    /// Specific days of the week; an empty set is never due
    Weekly {
        #[serde(default)]
        days: WeekdaySet,
    },
    /// Every N days
    Custom {
        #[serde(rename = "interval")]
        interval_days: NonZeroU32,
    },
}

impl Frequency {
    /// Weekly frequency from weekday ordinals (0 = Sunday)
    pub fn weekly<I>(ordinals: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = u8>,
    {
        Ok(Frequency::Weekly {
            days: WeekdaySet::from_ordinals(ordinals)?,
        })
    }

    /// Every-N-days frequency; N must be at least 1
    pub fn every_n_days(days: u32) -> Result<Self, DomainError> {
        let interval_days = NonZeroU32::new(days).ok_or(DomainError::InvalidInterval(days))?;
        Ok(Frequency::Custom { interval_days })
    }

    /// Monday through Friday
    pub fn weekdays() -> Self {
        Frequency::Weekly {
            days: WeekdaySet::from_weekdays([
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
        }
    }

    /// Saturday and Sunday
    pub fn weekends() -> Self {
        Frequency::Weekly {
            days: WeekdaySet::from_weekdays([Weekday::Sun, Weekday::Sat]),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FULL: [&str; 7] = [
            "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
        ];
        const SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

        match self {
            Frequency::Daily => f.write_str("Every day"),
            Frequency::Weekly { days } if days.is_empty() => f.write_str("Weekly"),
            Frequency::Weekly { days } if days.len() == 1 => {
                let ordinal = days.ordinals().next().unwrap_or_default();
                write!(f, "Every {}", FULL[ordinal as usize])
            }
            Frequency::Weekly { days } => {
                let names: Vec<&str> = days.ordinals().map(|d| SHORT[d as usize]).collect();
                f.write_str(&names.join(", "))
            }
            Frequency::Custom { interval_days } => write!(f, "Every {} days", interval_days),
        }
    }
}
