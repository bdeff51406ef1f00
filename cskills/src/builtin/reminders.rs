//! Reminders are stored with UTC times; both accepted time forms are read as UTC.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::notes::timestamp;
use super::store::DataStore;
use crate::{SkillArgs, SkillDefinition, SkillError, SkillOutput};

pub const SET_NAME: &str = "set_reminder";
pub const LIST_NAME: &str = "list_reminders";

const REMINDERS_FILE: &str = "reminders.json";
const TIME_HINT: &str = "Use 'YYYY-MM-DD HH:MM' or 'HH:MM' (24-hour, UTC).";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Reminder {
    id: String,
    message: String,
    time: DateTime<Utc>,
    created: DateTime<Utc>,
}

pub fn set_definition() -> SkillDefinition {
    SkillDefinition::new(
        SET_NAME,
        "Set a reminder for a specific time",
        json!({
            "type": "object",
            "properties": {
                "message": {"type": "string", "description": "What to be reminded about"},
                "time": {"type": "string", "description": "When to remind, as 'YYYY-MM-DD HH:MM' or 'HH:MM' for the next occurrence of that time (UTC)"}
            },
            "required": ["message", "time"]
        }),
    )
}

pub fn list_definition() -> SkillDefinition {
    SkillDefinition::without_parameters(LIST_NAME, "List upcoming reminders")
}

pub fn set(store: &DataStore, args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    set_at(store, args, Utc::now())
}

pub(crate) fn set_at(
    store: &DataStore,
    args: &SkillArgs,
    now: DateTime<Utc>,
) -> Result<SkillOutput, SkillError> {
    let message = args.required_str("message")?;
    let time = parse_reminder_time(args.required_str("time")?, now)?;

    let reminder = Reminder {
        id: Uuid::new_v4().to_string(),
        message: message.to_string(),
        time,
        created: now,
    };
    {
        let _guard = store.lock();
        let mut reminders: Vec<Reminder> = store.load(REMINDERS_FILE)?;
        reminders.push(reminder.clone());
        store.save(REMINDERS_FILE, &reminders)?;
    }

    tracing::debug!(event = "reminder_set", id = %reminder.id, time = %reminder.time);
    Ok(SkillOutput::Json(json!({
        "id": reminder.id,
        "message": reminder.message,
        "time": timestamp(reminder.time),
        "success": true,
    })))
}

pub fn list(store: &DataStore) -> Result<SkillOutput, SkillError> {
    list_at(store, Utc::now())
}

pub(crate) fn list_at(store: &DataStore, now: DateTime<Utc>) -> Result<SkillOutput, SkillError> {
    let reminders: Vec<Reminder> = {
        let _guard = store.lock();
        store.load(REMINDERS_FILE)?
    };
    let upcoming = reminders
        .iter()
        .filter(|reminder| reminder.time > now)
        .map(|reminder| {
            json!({
                "id": reminder.id,
                "message": reminder.message,
                "time": timestamp(reminder.time),
                "created": timestamp(reminder.created),
            })
        })
        .collect::<Vec<_>>();

    Ok(SkillOutput::Json(json!({ "count": upcoming.len(), "reminders": upcoming })))
}

/// A bare time that already passed today rolls over to tomorrow.
fn parse_reminder_time(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, SkillError> {
    let invalid = |message: String| {
        SkillError::invalid_arguments(message)
            .with_hint(TIME_HINT)
            .with_context("field", "time")
            .with_context("provided", raw)
    };
    if raw.starts_with("in ") {
        return Err(invalid(format!("relative times like '{raw}' are not supported")));
    }

    if raw.len() > 10 {
        let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .map_err(|err| invalid(format!("failed to parse time '{raw}': {err}")))?;
        return Ok(parsed.and_utc());
    }

    let layout = if raw.split(':').count() == 3 { "%H:%M:%S" } else { "%H:%M" };
    let clock = NaiveTime::parse_from_str(raw, layout)
        .map_err(|err| invalid(format!("invalid time format '{raw}': {err}")))?;
    let today = now.date_naive().and_time(clock).and_utc();
    Ok(if today < now { today + Duration::days(1) } else { today })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;
    use crate::SkillErrorKind;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).single().expect("instant")
    }

    fn json(output: SkillOutput) -> Value {
        match output {
            SkillOutput::Json(value) => value,
            SkillOutput::Text(text) => Value::String(text),
        }
    }

    #[test]
    fn bare_times_resolve_to_the_next_occurrence() {
        assert_eq!(
            parse_reminder_time("15:30", noon()).expect("later today"),
            Utc.with_ymd_and_hms(2025, 5, 10, 15, 30, 0).single().expect("instant")
        );
        assert_eq!(
            parse_reminder_time("08:15:05", noon()).expect("tomorrow"),
            Utc.with_ymd_and_hms(2025, 5, 11, 8, 15, 5).single().expect("instant")
        );
        assert_eq!(
            parse_reminder_time("2025-12-24 18:00", noon()).expect("full date"),
            Utc.with_ymd_and_hms(2025, 12, 24, 18, 0, 0).single().expect("instant")
        );
    }

    #[test]
    fn relative_and_malformed_times_are_rejected() {
        for raw in ["in 2 hours", "noonish", "2025-13-40 10:00"] {
            let err = parse_reminder_time(raw, noon()).expect_err(raw);
            assert_eq!(err.kind, SkillErrorKind::InvalidArguments, "{raw}");
        }
    }

    #[test]
    fn listing_skips_reminders_that_already_fired() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DataStore::new(dir.path().join("nested").join("data"));

        let set = json(
            set_at(
                &store,
                &SkillArgs::new().with("message", "stand up").with("time", "2025-05-10 12:30"),
                noon(),
            )
            .expect("set"),
        );
        assert_eq!(set["time"], "2025-05-10T12:30:00Z");
        assert_eq!(set["success"], true);
        set_at(
            &store,
            &SkillArgs::new().with("message", "water plants").with("time", "2025-05-10 18:00"),
            noon(),
        )
        .expect("set");

        let before = json(list_at(&store, noon()).expect("list"));
        assert_eq!(before["count"], 2);

        let later = noon() + Duration::hours(1);
        let after = json(list_at(&store, later).expect("list"));
        assert_eq!(after["count"], 1);
        assert_eq!(after["reminders"][0]["message"], "water plants");
        assert_eq!(after["reminders"][0]["id"].as_str().map(str::len), Some(36));
    }
}
