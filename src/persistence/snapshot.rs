/// JSON wire format for the persisted habit snapshot
///
/// The payload is `{"habits":[...]}` with camelCase fields and ISO-8601
/// timestamps in millisecond precision, e.g. `2024-03-01T08:00:00.000Z`.
///
/// Decoding is lenient: a broken field is repaired on its own and never
/// aborts the whole restore. Only a payload that is not JSON, or has no
/// habit array, is rejected.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::domain::{CategoryId, Frequency, Habit, HabitId};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot has no habit list")]
    MissingHabits,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitRecord<'a> {
    id: &'a HabitId,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    category_id: &'a CategoryId,
    completed: bool,
    created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency: Option<&'a Frequency>,
}

#[derive(Serialize)]
struct Payload<'a> {
    habits: Vec<HabitRecord<'a>>,
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 text or a number of epoch milliseconds
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Serialize habits into the snapshot payload
pub fn encode(habits: &[Habit]) -> Result<String, SnapshotError> {
    let payload = Payload {
        habits: habits
            .iter()
            .map(|habit| HabitRecord {
                id: &habit.id,
                title: &habit.title,
                description: habit.description.as_deref(),
                category_id: &habit.category_id,
                completed: habit.completed,
                created_at: format_timestamp(&habit.created_at),
                completed_at: habit.completed_at.as_ref().map(format_timestamp),
                frequency: habit.frequency.as_ref(),
            })
            .collect(),
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Parse a snapshot payload back into habits
///
/// `now` stands in for creation times that are missing or unreadable.
/// The `{"state":{"habits":[...]},"version":N}` envelope written by older
/// app builds is accepted as well.
pub fn decode(text: &str, now: DateTime<Utc>) -> Result<Vec<Habit>, SnapshotError> {
    let root: Value = serde_json::from_str(text)?;
    let records = root
        .get("habits")
        .or_else(|| root.get("state").and_then(|state| state.get("habits")))
        .and_then(Value::as_array)
        .ok_or(SnapshotError::MissingHabits)?;

    let mut seen = HashSet::new();
    let mut habits = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let Some(fields) = record.as_object() else {
            warn!("Skipping habit record {}: not an object", index);
            continue;
        };
        let habit = decode_record(index, fields, now, &seen);
        seen.insert(habit.id.clone());
        habits.push(habit);
    }

    Ok(habits)
}

fn decode_record(
    index: usize,
    fields: &Map<String, Value>,
    now: DateTime<Utc>,
    seen: &HashSet<HabitId>,
) -> Habit {
    let text = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_string);

    let id = match text("id").filter(|id| !id.trim().is_empty()) {
        Some(id) if seen.contains(&HabitId::from(id.as_str())) => {
            warn!("Habit record {} reuses id {}, assigning a new one", index, id);
            HabitId::new()
        }
        Some(id) => HabitId::from(id),
        None => {
            warn!("Habit record {} has no id, assigning a new one", index);
            HabitId::new()
        }
    };

    let created_at = match fields.get("createdAt").and_then(parse_timestamp) {
        Some(at) => at,
        None => {
            warn!("Habit {} has no readable createdAt, using now", id);
            now
        }
    };

    let completed_at = match fields.get("completedAt") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = parse_timestamp(value);
            if parsed.is_none() {
                warn!("Habit {} has an unreadable completedAt, dropping it", id);
            }
            parsed
        }
    };

    let frequency = match fields.get("frequency") {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<Frequency>(value.clone()) {
            Ok(frequency) => Some(frequency),
            Err(e) => {
                warn!("Habit {} has an invalid frequency ({}), treating it as always due", id, e);
                None
            }
        },
    };

    Habit::from_existing(
        id,
        text("title").unwrap_or_default(),
        text("description"),
        CategoryId::from(text("categoryId").unwrap_or_default()),
        fields.get("completed").and_then(Value::as_bool).unwrap_or(false),
        created_at,
        completed_at,
        frequency,
    )
}
