//! Minimal iCalendar reader and writer.
//!
//! The reader understands just enough of the format to pull busy intervals
//! out of a feed export: folded lines, `VEVENT` blocks, the three date-time
//! shapes (all-day, UTC, floating local) and the transparency/busy-status
//! flags. Everything else is ignored. The writer emits a single-event
//! document that the reader accepts back unchanged.
//!
//! All times leave this module as timezone-naive local wall-clock values;
//! UTC timestamps are converted here and nowhere else.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One event pulled out of a calendar export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEvent {
    /// Start, local wall-clock.
    pub start: NaiveDateTime,
    /// Exclusive end, local wall-clock. Always after `start`.
    pub end: NaiveDateTime,
    /// False only when the event is marked transparent or free.
    pub busy: bool,
    /// SUMMARY field, when present.
    pub summary: Option<String>,
}

/// Decoded value of a DTSTART/DTEND field.
enum IcsTime {
    /// 8-digit pure date: midnight that day through midnight the next.
    AllDay {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Timed(NaiveDateTime),
}

/// Decode the value portion of a DTSTART/DTEND line.
///
/// Returns `None` for anything that is not one of the three recognized
/// shapes; the caller decides what a missing value means.
fn decode_datetime(raw: &str) -> Option<IcsTime> {
    let s = raw.trim();

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let day = NaiveDate::parse_from_str(s, "%Y%m%d").ok()?;
        let start = day.and_hms_opt(0, 0, 0)?;
        return Some(IcsTime::AllDay {
            start,
            end: start + Duration::days(1),
        });
    }

    if let Some(stripped) = s.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S").ok()?;
        let local = Utc
            .from_utc_datetime(&naive)
            .with_timezone(&Local)
            .naive_local();
        return Some(IcsTime::Timed(local));
    }

    if s.len() == 15 {
        let naive = NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S").ok()?;
        return Some(IcsTime::Timed(naive));
    }

    None
}

/// Unfold continuation lines (a single leading space joins the previous
/// logical line). A continuation with no predecessor is dropped.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(last) = out.last_mut() {
                last.push_str(rest);
            }
        } else {
            out.push(line.to_string());
        }
    }
    out
}

/// Field value: text after the first colon.
fn field_value(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, v)| v)
}

/// Parse a calendar export into events.
///
/// This function never fails: lines, fields and events that cannot be
/// interpreted are skipped, and a completely unparsable input yields an
/// empty vector.
pub fn parse_calendar(text: &str) -> Vec<ParsedEvent> {
    let mut events = Vec::new();
    let mut in_event = false;
    let mut dtstart_raw: Option<String> = None;
    let mut dtend_raw: Option<String> = None;
    let mut transp: Option<String> = None;
    let mut busystatus: Option<String> = None;
    let mut summary: Option<String> = None;

    for line in unfold_lines(text) {
        if line.starts_with("BEGIN:VEVENT") {
            in_event = true;
            dtstart_raw = None;
            dtend_raw = None;
            transp = None;
            busystatus = None;
            summary = None;
            continue;
        }
        if line.starts_with("END:VEVENT") {
            if in_event {
                if let Some(event) = finish_event(
                    dtstart_raw.as_deref(),
                    dtend_raw.as_deref(),
                    transp.as_deref(),
                    busystatus.as_deref(),
                    summary.clone(),
                ) {
                    events.push(event);
                }
            }
            in_event = false;
            continue;
        }
        if !in_event {
            continue;
        }

        if line.starts_with("DTSTART") {
            dtstart_raw = field_value(&line).map(str::to_string);
        } else if line.starts_with("DTEND") {
            dtend_raw = field_value(&line).map(str::to_string);
        } else if line.starts_with("TRANSP") {
            transp = field_value(&line).map(str::to_string);
        } else if line.starts_with("SUMMARY") {
            summary = field_value(&line).map(str::to_string);
        } else if line.contains("BUSYSTATUS") {
            busystatus = field_value(&line).map(str::to_string);
        }
    }

    events
}

/// Resolve one accumulated VEVENT block into an event, if it is valid.
fn finish_event(
    dtstart_raw: Option<&str>,
    dtend_raw: Option<&str>,
    transp: Option<&str>,
    busystatus: Option<&str>,
    summary: Option<String>,
) -> Option<ParsedEvent> {
    // No DTSTART means no event, even if the block was otherwise well formed.
    let dtstart_raw = dtstart_raw?;

    let mut start = None;
    let mut end = None;
    match decode_datetime(dtstart_raw) {
        Some(IcsTime::AllDay { start: s, end: e }) => {
            start = Some(s);
            end = Some(e);
        }
        Some(IcsTime::Timed(t)) => start = Some(t),
        None => {}
    }

    // An explicit DTEND replaces whatever the all-day rule produced. An
    // unparsable DTEND clears it, falling through to the one-hour default.
    if let Some(raw) = dtend_raw {
        end = match decode_datetime(raw) {
            Some(IcsTime::AllDay { start: s, .. }) => Some(s),
            Some(IcsTime::Timed(t)) => Some(t),
            None => None,
        };
    }

    let start = start?;
    let end = end.unwrap_or(start + Duration::hours(1));
    if end <= start {
        return None;
    }

    let tr = transp.unwrap_or_default().trim().to_ascii_uppercase();
    let bs = busystatus.unwrap_or_default().trim().to_ascii_uppercase();
    let busy = !(tr == "TRANSPARENT" || bs == "FREE");

    Some(ParsedEvent {
        start,
        end,
        busy,
        summary,
    })
}

fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// Serialize one confirmed break as a minimal single-event calendar
/// document, suitable for import into any calendar app.
///
/// Timestamps are written as floating local `YYYYMMDDTHHMMSS`, the shape
/// [`parse_calendar`] reads back without conversion.
pub fn export_event(
    summary: &str,
    start: NaiveDateTime,
    duration_minutes: i64,
    description: &str,
) -> Vec<u8> {
    let end = start + Duration::minutes(duration_minutes);
    let uid = format!("{}@breakwise", uuid::Uuid::new_v4());
    let stamp = format_timestamp(Local::now().naive_local());
    let desc = description.replace(['\r', '\n'], " ");

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Breakwise//BreakScheduler//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{uid}"),
        format!("DTSTAMP:{stamp}"),
        format!("DTSTART:{}", format_timestamp(start)),
        format!("DTEND:{}", format_timestamp(end)),
        format!("SUMMARY:{summary}"),
        format!("DESCRIPTION:{desc}"),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    lines.join("\n").into_bytes()
}
