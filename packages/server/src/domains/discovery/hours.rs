//! Open-now evaluation against a listing's working-hours map.
//!
//! The map shape is validated at write time (day -> {"open", "close"} in
//! HH:MM); anything that still fails to parse here counts as closed.
//! Intervals with close before open run past midnight, and a listing with
//! equal open and close is open around the clock. The served region sits on
//! UTC+3 year-round, so a fixed offset is enough.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};
use serde_json::Value as JsonValue;

const LOCAL_OFFSET_SECS: i32 = 3 * 3600;

fn day_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn interval_for(hours: &JsonValue, day: &str) -> Option<(NaiveTime, NaiveTime)> {
    let entry = hours.get(day)?;
    let open = NaiveTime::parse_from_str(entry.get("open")?.as_str()?, "%H:%M").ok()?;
    let close = NaiveTime::parse_from_str(entry.get("close")?.as_str()?, "%H:%M").ok()?;
    Some((open, close))
}

/// Whether a listing with these working hours is open at `at`.
pub fn is_open_at(hours: &JsonValue, at: DateTime<Utc>) -> bool {
    let Some(offset) = FixedOffset::east_opt(LOCAL_OFFSET_SECS) else {
        return false;
    };
    let local = at.with_timezone(&offset);
    let time = local.time();

    if let Some((open, close)) = interval_for(hours, day_key(local.weekday())) {
        let open_now = if close == open {
            true
        } else if close > open {
            time >= open && time <= close
        } else {
            time >= open
        };
        if open_now {
            return true;
        }
    }

    // An overnight interval from the previous day spills into this one.
    if let Some((open, close)) = interval_for(hours, day_key(local.weekday().pred())) {
        if close < open && time <= close {
            return true;
        }
    }

    false
}
