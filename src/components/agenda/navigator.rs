use crate::utils::calendar_math::{normalize_month, resolve_day};
use crate::utils::clock::Clock;
use chrono::Datelike;
use chrono_tz::Tz;
use tracing::warn;

/// Month names in the product locale (pt-BR)
pub const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Active calendar view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

/// Anchor state for the visible window. `selected_day` and `week_start_day`
/// are raw day values relative to `(month, year)`: they may be negative or
/// exceed the month's day count and are always resolved through calendar
/// arithmetic, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Day shown in day view; meaningful only in that mode
    pub selected_day: i32,
    /// Day value of the Sunday that begins the visible week
    pub week_start_day: i32,
    /// 0-based month
    pub month: u32,
    pub year: i32,
}

/// State machine for day/week/month navigation
#[derive(Debug, Clone)]
pub struct ViewNavigator {
    state: ViewState,
}

impl ViewNavigator {
    /// Start in week view, anchored to the Sunday of the week containing
    /// the clock's "now" in the viewer timezone
    pub fn new(clock: &dyn Clock, tz: Tz) -> Self {
        let today = clock.now_utc().with_timezone(&tz).date_naive();
        let week_start_day = today.day() as i32 - today.weekday().num_days_from_sunday() as i32;

        Self {
            state: ViewState {
                mode: ViewMode::Week,
                selected_day: today.day() as i32,
                week_start_day,
                month: today.month0(),
                year: today.year(),
            },
        }
    }

    /// Restore a navigator from previously held state
    pub fn with_state(state: ViewState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Replace the active mode. Anchors held for the other modes are
    /// untouched, so returning to a mode resumes where it left off.
    pub fn switch_mode(&mut self, mode: ViewMode) {
        self.state.mode = mode;
    }

    pub fn next(&mut self) {
        self.shift(1);
    }

    pub fn previous(&mut self) {
        self.shift(-1);
    }

    fn shift(&mut self, direction: i32) {
        match self.state.mode {
            // Day view has no next/previous, only direct selection within
            // the week strip
            ViewMode::Day => {}
            ViewMode::Week => {
                let moved = resolve_day(
                    self.state.year,
                    self.state.month as i32,
                    self.state.week_start_day + 7 * direction,
                );
                self.state.week_start_day = moved.day() as i32;
                self.state.month = moved.month0();
                self.state.year = moved.year();
            }
            ViewMode::Month => {
                let (year, month) = normalize_month(self.state.year, self.state.month as i32 + direction);
                self.state.year = year;
                self.state.month = month;
            }
        }
    }

    /// Select a day within the visible week strip, day view only. Values
    /// outside the strip leave the state unchanged.
    pub fn select_day(&mut self, day: i32) {
        if self.state.mode != ViewMode::Day {
            warn!(day, "select_day ignored outside day view");
            return;
        }

        let strip = self.state.week_start_day..self.state.week_start_day + 7;
        if !strip.contains(&day) {
            warn!(day, "selected day outside the visible week ignored");
            return;
        }

        self.state.selected_day = day;
    }

    /// Human-readable title for the current window
    pub fn header_title(&self) -> String {
        match self.state.mode {
            ViewMode::Day => {
                let date = resolve_day(self.state.year, self.state.month as i32, self.state.selected_day);
                format!(
                    "{} de {} {}",
                    date.day(),
                    month_name(date.month0()),
                    date.year()
                )
            }
            ViewMode::Week => {
                let start = resolve_day(self.state.year, self.state.month as i32, self.state.week_start_day);
                let end = resolve_day(
                    self.state.year,
                    self.state.month as i32,
                    self.state.week_start_day + 6,
                );

                if start.month() == end.month() && start.year() == end.year() {
                    format!(
                        "{} – {} {} {}",
                        start.day(),
                        end.day(),
                        month_name(start.month0()),
                        start.year()
                    )
                } else {
                    format!(
                        "{} {} – {} {} {}",
                        start.day(),
                        month_name(start.month0()),
                        end.day(),
                        month_name(end.month0()),
                        end.year()
                    )
                }
            }
            ViewMode::Month => {
                format!("{} {}", month_name(self.state.month), self.state.year)
            }
        }
    }
}

fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES[month0 as usize % 12]
}
