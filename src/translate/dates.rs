//! Date grammar accepted from Notion date and timestamp properties.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref DATE_ONLY: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$")
        .expect("date-only pattern is valid");
    static ref DATE_TIME: Regex = Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?(Z|[+-]\d{2}(?::?\d{2})?)?$"
    )
    .expect("date-time pattern is valid");
}

/// Parses `yyyy-MM-dd` (midnight UTC) or an ISO local date-time with an
/// optional `Z`, `+HH`, `+HHMM` or `+HH:MM` offset (none means UTC).
///
/// Returns `None` for anything else, including out-of-range components.
pub fn parse_notion_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Some(caps) = DATE_ONLY.captures(raw) {
        let date = calendar_date(&caps)?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    let caps = DATE_TIME.captures(raw)?;
    let date = calendar_date(&caps)?;
    let hour = number(&caps, 4)?;
    let minute = number(&caps, 5)?;
    let second = number(&caps, 6).unwrap_or(0);
    let nanos = caps.get(7).map_or(Some(0), |m| fraction_to_nanos(m.as_str()))?;
    let local = date.and_hms_nano_opt(hour, minute, second, nanos)?;

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => FixedOffset::east_opt(0)?,
        Some(designator) => parse_offset(designator)?,
    };
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn calendar_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year = caps.get(1)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, number(caps, 2)?, number(caps, 3)?)
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// Right-pads a fractional-seconds string to nanosecond precision.
fn fraction_to_nanos(digits: &str) -> Option<u32> {
    format!("{:0<9}", digits).parse().ok()
}

/// `+HH`, `+HHMM` or `+HH:MM`.
fn parse_offset(designator: &str) -> Option<FixedOffset> {
    let sign = if designator.starts_with('-') { -1 } else { 1 };
    let digits: String = designator[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
