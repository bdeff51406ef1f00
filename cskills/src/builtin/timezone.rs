use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::json;

use crate::{SkillArgs, SkillDefinition, SkillError, SkillOutput};

pub const NAME: &str = "convert_timezone";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";
const UTC_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub fn definition() -> SkillDefinition {
    SkillDefinition::new(
        NAME,
        "Convert a time from one timezone to another",
        json!({
            "type": "object",
            "properties": {
                "time": {"type": "string", "description": "Time to convert in HH:MM or HH:MM:SS format. Defaults to the current time."},
                "from_timezone": {"type": "string", "description": "Source IANA timezone (e.g., 'America/New_York', 'UTC')"},
                "to_timezone": {"type": "string", "description": "Target IANA timezone (e.g., 'Europe/London', 'Asia/Tokyo')"},
                "date": {"type": "string", "description": "Date in YYYY-MM-DD format. Defaults to today in the source timezone."}
            },
            "required": ["from_timezone", "to_timezone"]
        }),
    )
}

pub fn convert(args: &SkillArgs) -> Result<SkillOutput, SkillError> {
    convert_at(args, Utc::now())
}

/// Same as [`convert`], with "now" supplied by the caller.
pub fn convert_at(args: &SkillArgs, now: DateTime<Utc>) -> Result<SkillOutput, SkillError> {
    let from_name = args.required_str("from_timezone")?;
    let to_name = args.required_str("to_timezone")?;
    let from = parse_zone(from_name, "from_timezone")?;
    let to = parse_zone(to_name, "to_timezone")?;

    let original = match (args.optional_str("time"), args.optional_str("date")) {
        (None, None) => now.with_timezone(&from),
        (time, date) => {
            let date = match date {
                Some(date) => parse_date(date)?,
                None => now.with_timezone(&from).date_naive(),
            };
            let time = match time {
                Some(time) => parse_time(time)?,
                None => NaiveTime::default(),
            };
            localize(from, date.and_time(time))?
        }
    };
    let converted = original.with_timezone(&to);

    Ok(SkillOutput::Json(json!({
        "original_time": original.format(DISPLAY_FORMAT).to_string(),
        "converted_time": converted.format(DISPLAY_FORMAT).to_string(),
        "from_timezone": from_name,
        "to_timezone": to_name,
        "original_utc": original.with_timezone(&Utc).format(UTC_FORMAT).to_string(),
        "converted_utc": converted.with_timezone(&Utc).format(UTC_FORMAT).to_string(),
        "timezone_offset": converted.format("%:z").to_string(),
    })))
}

fn parse_zone(name: &str, field: &str) -> Result<Tz, SkillError> {
    name.parse::<Tz>().map_err(|_| {
        SkillError::invalid_arguments(format!("Invalid timezone '{name}'"))
            .with_hint("Use IANA timezone names such as 'America/New_York', 'Europe/London' or 'UTC'.")
            .with_context("field", field)
            .with_context("provided", name)
    })
}

fn parse_date(date: &str) -> Result<NaiveDate, SkillError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|err| {
        SkillError::invalid_arguments(format!("Invalid date '{date}': {err}"))
            .with_hint("Use YYYY-MM-DD format.")
            .with_context("field", "date")
            .with_context("provided", date)
    })
}

/// Accepts `H:MM`, `HH:MM` and `HH:MM:SS`.
fn parse_time(time: &str) -> Result<NaiveTime, SkillError> {
    let invalid = |detail: String| {
        SkillError::invalid_arguments(format!("Invalid time '{time}': {detail}"))
            .with_hint("Use HH:MM or HH:MM:SS format.")
            .with_context("field", "time")
            .with_context("provided", time)
    };
    if !time.contains(':') {
        return Err(invalid("missing ':' separator".to_string()));
    }
    let mut parts = time.split(':').map(str::to_string).collect::<Vec<_>>();
    if parts[0].len() == 1 {
        parts[0].insert(0, '0');
    }
    if parts.len() == 2 {
        parts.push("00".to_string());
    }
    NaiveTime::parse_from_str(&parts.join(":"), "%H:%M:%S").map_err(|err| invalid(err.to_string()))
}

fn localize(zone: Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, SkillError> {
    // Ambiguous wall-clock times during a fall-back take the first occurrence.
    zone.from_local_datetime(&local).earliest().ok_or_else(|| {
        SkillError::invalid_arguments(format!("{local} does not exist in {zone}"))
            .with_hint("The time falls inside a daylight-saving gap; pick a time outside it.")
            .with_context("field", "time")
    })
}
