//! Display formatting of row values.
//!
//! [`format_value`] is the single formatter behind table cells, search
//! matching, CSV cells and chart labels, so exported text always equals the
//! text shown on screen.
//!
//! Invariants:
//! - Absent values and empty strings format as `""`.
//! - Unparseable dates and durations degrade to the raw value's text; nothing
//!   here fails.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::lookup::LookupCache;
use crate::registry::{FieldDefinition, ValueType};
use crate::values::{is_truthy, number_text, plain_text, truthy_member};

/// Local date-time layout of formatted `date` fields.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local calendar-date layout, used for chart grouping.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format one value of `field` for display.
pub fn format_value(value: Option<&Value>, field: &FieldDefinition, lookups: &LookupCache) -> String {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return String::new();
    };

    if let Some(kind) = field.resolver {
        return lookups.resolve_value(kind, value);
    }

    match field.value_type {
        ValueType::Date => parse_instant(value)
            .map(|instant| {
                instant
                    .with_timezone(&Local)
                    .format(DATE_TIME_FORMAT)
                    .to_string()
            })
            .unwrap_or_else(|| plain_text(value)),
        ValueType::Number => format_number(value),
        ValueType::Duration => format_duration(value),
        ValueType::Boolean => (if is_truthy(value) { "Yes" } else { "No" }).to_string(),
        ValueType::String | ValueType::Id => summarize(value),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn format_number(value: &Value) -> String {
    let Value::Number(n) = value else {
        return plain_text(value);
    };
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() != 0.0 && f.is_finite() => {
            format!("{f:.2}")
        }
        _ => number_text(n),
    }
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) | Value::Array(_) => entity_label(item),
                other => plain_text(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => entity_label(value),
        other => plain_text(other),
    }
}

fn entity_label(value: &Value) -> String {
    truthy_member(value, "name")
        .or_else(|| truthy_member(value, "id"))
        .map(plain_text)
        .unwrap_or_else(|| value.to_string())
}

/// Instant held by a date value.
///
/// Accepts RFC 3339 strings, offset-less date-times (read as local time),
/// bare dates (read as UTC midnight) and epoch milliseconds.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_text(s.trim()),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Components of an elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl DurationParts {
    pub fn total_seconds(&self) -> f64 {
        self.days as f64 * 86_400.0
            + self.hours as f64 * 3_600.0
            + self.minutes as f64 * 60.0
            + self.seconds
    }

    fn display(&self) -> String {
        let seconds = js_round(self.seconds);
        if self.days > 0 {
            format!(
                "{}d {}h {}m {}s",
                self.days, self.hours, self.minutes, seconds
            )
        } else {
            format!("{}h {}m {}s", self.hours, self.minutes, seconds)
        }
    }
}

/// Format a duration: `PT#H#M#S` tokens, `[d.]hh:mm:ss` timespans, or a
/// number of seconds, as `"Xh Ym Zs"` (prefixed `"Dd "` when days are set).
pub fn format_duration(value: &Value) -> String {
    match value {
        Value::String(s) => parse_duration_text(s)
            .map(|parts| parts.display())
            .unwrap_or_else(|| s.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                let total = js_round(secs);
                format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
            }
            _ => number_text(n),
        },
        other => plain_text(other),
    }
}

/// Seconds held by a duration value, if it can be read as one.
pub fn duration_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_duration_text(s)
            .map(|parts| parts.total_seconds())
            .or_else(|| s.trim().parse::<f64>().ok().filter(|f| f.is_finite())),
        _ => None,
    }
}

/// Parse `PT2H15M30S` style tokens or `1.02:03:04` style timespans.
pub fn parse_duration_text(text: &str) -> Option<DurationParts> {
    let text = text.trim();
    parse_iso_duration(text).or_else(|| parse_timespan(text))
}

fn parse_iso_duration(text: &str) -> Option<DurationParts> {
    let mut cursor = Cursor::new(text.strip_prefix(['P', 'p'])?);
    let mut parts = DurationParts {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0.0,
    };
    let mut components = 0;

    if let Some(days) = cursor.component(&['D', 'd']) {
        parts.days = days.trunc() as u64;
        components += 1;
    }
    cursor.eat(&['T', 't']);
    if let Some(hours) = cursor.component(&['H', 'h']) {
        parts.hours = hours.trunc() as u64;
        components += 1;
    }
    if let Some(minutes) = cursor.component(&['M', 'm']) {
        parts.minutes = minutes.trunc() as u64;
        components += 1;
    }
    if let Some(seconds) = cursor.component(&['S', 's']) {
        parts.seconds = seconds;
        components += 1;
    }

    (components > 0 && cursor.is_done()).then_some(parts)
}

fn parse_timespan(text: &str) -> Option<DurationParts> {
    let mut fields = text.split(':');
    let (head, minutes, seconds) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }

    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (digits(days)?, digits(hours)?),
        None => (0, digits(head)?),
    };
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let seconds = format!("{}.{}0", digits(whole)?, fraction).parse::<f64>().ok()?;

    Some(DurationParts {
        days,
        hours,
        minutes: digits(minutes)?,
        seconds,
    })
}

fn digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Round half up.
fn js_round(value: f64) -> u64 {
    (value + 0.5).floor().max(0.0) as u64
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    fn eat(&mut self, designators: &[char]) -> bool {
        match self.rest.strip_prefix(designators) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// A decimal number followed by one of `designators`; consumes nothing on
    /// mismatch.
    fn component(&mut self, designators: &[char]) -> Option<f64> {
        let len = self
            .rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(self.rest.len());
        if len == 0 {
            return None;
        }
        let (number, tail) = self.rest.split_at(len);
        let tail = tail.strip_prefix(designators)?;
        let value = number.parse::<f64>().ok()?;
        self.rest = tail;
        Some(value)
    }

    fn is_done(&self) -> bool {
        self.rest.is_empty()
    }
}
