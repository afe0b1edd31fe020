use super::models::{MappedEvent, EVENT_COLOR};
use super::navigator::{ViewMode, ViewState};
use super::range::parse_timezone;
use crate::components::event_source::{EventTime, RawEvent};
use crate::error::{event_error, AgendaResult};
use crate::utils::calendar_math::resolve_day;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Height of one hour row on the time grid, in pixels
pub const ROW_HEIGHT_PX: f32 = 40.0;

/// Fallback shown when an event carries no patient description
const NO_DESCRIPTION: &str = "no description";

/// Project raw events into display records in the viewer's timezone.
/// Events are positioned independently; overlapping events are not offset.
/// Malformed events are skipped, an unknown timezone is a hard error.
pub fn project(events: &[RawEvent], timezone: &str) -> AgendaResult<Vec<MappedEvent>> {
    let tz = parse_timezone(timezone)?;

    let mut mapped = Vec::with_capacity(events.len());
    for event in events {
        match map_event(event, tz) {
            Ok(projected) => mapped.push(projected),
            Err(e) => warn!(event_id = %event.id, "Skipping event: {}", e),
        }
    }

    Ok(mapped)
}

fn map_event(event: &RawEvent, tz: Tz) -> AgendaResult<MappedEvent> {
    let start = resolve_instant(&event.start, tz)?;
    let end = resolve_instant(&event.end, tz)?;

    if end < start {
        return Err(event_error("Event ends before it starts"));
    }

    let duration_minutes = ((end - start).num_milliseconds() as f64 / 60_000.0).round() as i64;

    let local_start = start.with_timezone(&tz);
    let minutes_into_day = local_start.hour() as i64 * 60 + local_start.minute() as i64;

    let patient = event
        .patient_name
        .clone()
        .or_else(|| event.description.clone())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    Ok(MappedEvent {
        id: event.id.clone(),
        title: event.summary.clone().unwrap_or_default(),
        patient,
        date: local_start.format("%Y-%m-%d").to_string(),
        time: local_start.format("%H:%M").to_string(),
        duration: format_duration(duration_minutes),
        color: EVENT_COLOR.to_string(),
        top_offset_px: minutes_into_day as f32 / 60.0 * ROW_HEIGHT_PX,
        height_px: duration_minutes as f32 / 60.0 * ROW_HEIGHT_PX,
        original_event: event.clone(),
    })
}

/// Resolve one side of an event to an absolute instant. Timed sides carry
/// their own offset; all-day sides are taken at viewer-local midnight.
fn resolve_instant(time: &EventTime, tz: Tz) -> AgendaResult<DateTime<Utc>> {
    match time {
        EventTime::Timed { date_time } => DateTime::parse_from_rfc3339(date_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| event_error(&format!("Failed to parse dateTime '{}': {}", date_time, e))),
        EventTime::AllDay { date } => {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| event_error(&format!("Failed to parse date '{}': {}", date, e)))?;

            match tz.from_local_datetime(&day.and_time(NaiveTime::MIN)) {
                chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                _ => Err(event_error(&format!(
                    "Midnight of {} does not exist in {}",
                    date, tz
                ))),
            }
        }
    }
}

/// Durations that are exact multiples of an hour render as "Nh"; everything
/// else stays in minutes, a 90-minute event included
fn format_duration(minutes: i64) -> String {
    if minutes >= 60 && minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}min", minutes)
    }
}

/// Select the events whose local date falls inside the currently visible
/// window. Comparison is on YYYY-MM-DD strings, which sort in date order.
pub fn visible_events(events: &[MappedEvent], state: &ViewState) -> Vec<MappedEvent> {
    let month0 = state.month as i32;

    match state.mode {
        ViewMode::Day => {
            let day = format_date(resolve_day(state.year, month0, state.selected_day));
            events.iter().filter(|e| e.date == day).cloned().collect()
        }
        ViewMode::Week => {
            let first = format_date(resolve_day(state.year, month0, state.week_start_day));
            let last = format_date(resolve_day(state.year, month0, state.week_start_day + 6));
            events
                .iter()
                .filter(|e| e.date >= first && e.date <= last)
                .cloned()
                .collect()
        }
        ViewMode::Month => {
            let first = format_date(resolve_day(state.year, month0, 1));
            let last = format_date(resolve_day(state.year, month0 + 1, 0));
            events
                .iter()
                .filter(|e| e.date >= first && e.date <= last)
                .cloned()
                .collect()
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
