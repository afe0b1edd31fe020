use super::navigator::{ViewMode, ViewState};
use crate::error::{invalid_timezone_error, other_error, AgendaResult};
use crate::utils::calendar_math::resolve_day;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Inclusive query window for the remote event source. Boundaries are
/// UTC-normalized ISO-8601 strings at millisecond precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewWindow {
    pub start: String,
    pub end: String,
}

/// Parse an IANA timezone name, failing loudly on unknown names
pub fn parse_timezone(name: &str) -> AgendaResult<Tz> {
    name.parse::<Tz>().map_err(|_| invalid_timezone_error(name))
}

/// Query window for the current view state
pub fn range_for(state: &ViewState, timezone: &str) -> AgendaResult<ViewWindow> {
    match state.mode {
        ViewMode::Day => day_range(state.year, state.month as i32, state.selected_day, timezone),
        ViewMode::Week => week_range(state.year, state.month as i32, state.week_start_day, timezone),
        ViewMode::Month => month_range(state.year, state.month as i32, timezone),
    }
}

/// Window from local midnight of the anchor day to local midnight of the
/// next day
pub fn day_range(year: i32, month0: i32, day: i32, timezone: &str) -> AgendaResult<ViewWindow> {
    let tz = parse_timezone(timezone)?;
    let start = resolve_day(year, month0, day);
    let end = resolve_day(year, month0, day + 1);

    Ok(ViewWindow {
        start: to_utc_string(local_instant(tz, start_of_day(start))?),
        end: to_utc_string(local_instant(tz, start_of_day(end))?),
    })
}

/// Window from local midnight of the week-start day to local end-of-day of
/// the sixth day after it. The anchor day may lie outside the month's day
/// range; it is resolved through calendar arithmetic.
pub fn week_range(
    year: i32,
    month0: i32,
    week_start_day: i32,
    timezone: &str,
) -> AgendaResult<ViewWindow> {
    let tz = parse_timezone(timezone)?;
    let start = resolve_day(year, month0, week_start_day);
    let end = resolve_day(year, month0, week_start_day + 6);

    Ok(ViewWindow {
        start: to_utc_string(local_instant(tz, start_of_day(start))?),
        end: to_utc_string(local_instant(tz, end_of_day(end))?),
    })
}

/// Window from local midnight of day 1 to local end-of-day of the last
/// calendar day of the month, obtained as day 0 of the following month
pub fn month_range(year: i32, month0: i32, timezone: &str) -> AgendaResult<ViewWindow> {
    let tz = parse_timezone(timezone)?;
    let start = resolve_day(year, month0, 1);
    let end = resolve_day(year, month0 + 1, 0);

    Ok(ViewWindow {
        start: to_utc_string(local_instant(tz, start_of_day(start))?),
        end: to_utc_string(local_instant(tz, end_of_day(end))?),
    })
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .expect("end of day is a valid wall-clock time")
}

/// Reinterpret a naive boundary in the target timezone. Boundaries falling
/// into a DST gap or fold are a hard error, never a silent fallback.
fn local_instant(tz: Tz, naive: NaiveDateTime) -> AgendaResult<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(_, _) => Err(other_error(&format!(
            "Local time {} is ambiguous in {}",
            naive, tz
        ))),
        chrono::LocalResult::None => Err(other_error(&format!(
            "Local time {} does not exist in {}",
            naive, tz
        ))),
    }
}

fn to_utc_string(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
