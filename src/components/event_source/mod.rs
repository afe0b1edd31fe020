mod google;
pub mod models;

pub use google::GoogleCalendarSource;
pub use models::{Attendee, CalendarCredentials, EventTime, RawEvent};

use crate::components::agenda::range::ViewWindow;
use crate::error::AgendaResult;
use async_trait::async_trait;

/// Remote source of raw calendar events for a time interval
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the raw events overlapping the given window. Transport and
    /// upstream failures return an error so the orchestrator can keep the
    /// previous event set.
    async fn fetch_events(
        &self,
        credentials: &CalendarCredentials,
        window: &ViewWindow,
        max_results: Option<u32>,
    ) -> AgendaResult<Vec<RawEvent>>;
}

/// Directory used to resolve attendee emails to patient names
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn patient_name(&self, email: &str) -> AgendaResult<Option<String>>;
}
