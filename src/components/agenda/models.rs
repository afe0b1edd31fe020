use crate::components::event_source::RawEvent;
use serde::Serialize;

/// Bar color for appointments on the time grid
pub const EVENT_COLOR: &str = "#4f46e5";

/// Display-ready projection of a raw event, in the viewer's timezone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedEvent {
    pub id: String,
    pub title: String,
    pub patient: String,
    /// Viewer-local calendar date bucket, YYYY-MM-DD
    pub date: String,
    /// Viewer-local start time, HH:MM
    pub time: String,
    /// Human-readable duration, e.g. "30min" or "1h"
    pub duration: String,
    pub color: String,
    /// Vertical position on the time grid, in pixels
    pub top_offset_px: f32,
    pub height_px: f32,
    /// The event as received; never mutated
    pub original_event: RawEvent,
}

/// State handed to the renderer after each command
#[derive(Debug, Clone, Serialize)]
pub struct AgendaSnapshot {
    /// Events whose local date falls inside the visible window
    pub events: Vec<MappedEvent>,
    pub loading: bool,
    pub error: Option<String>,
    pub header_title: String,
}
