use super::models::{CalendarCredentials, RawEvent};
use super::{DirectoryLookup, EventSource};
use crate::components::agenda::range::ViewWindow;
use crate::error::{calendar_api_error, AgendaResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Google Calendar v3 implementation of the event source
pub struct GoogleCalendarSource {
    client: Client,
    calendar_id: String,
    directory: Option<Arc<dyn DirectoryLookup>>,
}

impl GoogleCalendarSource {
    /// Create a source for the given calendar ID
    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            calendar_id: calendar_id.into(),
            directory: None,
        }
    }

    /// Attach a directory lookup used for patient-name enrichment
    pub fn with_directory(mut self, directory: Arc<dyn DirectoryLookup>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Resolve attendee emails to patient names. Lookup failures are logged
    /// and never fail the fetch.
    async fn enrich(&self, events: &mut [RawEvent]) {
        let Some(directory) = &self.directory else {
            return;
        };

        for event in events.iter_mut() {
            let Some(attendee) = event.attendees.first() else {
                continue;
            };
            match directory.patient_name(&attendee.email).await {
                Ok(Some(name)) => event.patient_name = Some(name),
                Ok(None) => {}
                Err(e) => warn!("Patient lookup failed for {}: {}", attendee.email, e),
            }
        }
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    async fn fetch_events(
        &self,
        credentials: &CalendarCredentials,
        window: &ViewWindow,
        max_results: Option<u32>,
    ) -> AgendaResult<Vec<RawEvent>> {
        let url_str = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            self.calendar_id
        );

        let mut url = Url::parse(&url_str)
            .map_err(|e| calendar_api_error(&format!("Failed to parse URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeMin", &window.start);
            query.append_pair("timeMax", &window.end);
            query.append_pair("singleEvents", "true");
            query.append_pair("orderBy", "startTime");
            if let Some(cap) = max_results {
                query.append_pair("maxResults", &cap.to_string());
            }
        }

        debug!(start = %window.start, end = %window.end, "Fetching calendar events");

        let response = self
            .client
            .get(url)
            .header(
                "Authorization",
                format!("Bearer {}", credentials.access_token),
            )
            .send()
            .await
            .map_err(|e| calendar_api_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_api_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| calendar_api_error(&format!("Failed to parse events response: {}", e)))?;

        // Events may arrive nested under "items" or as a bare array
        let items = response_data
            .get("items")
            .cloned()
            .unwrap_or(response_data);

        let mut events: Vec<RawEvent> = serde_json::from_value(items)
            .map_err(|e| calendar_api_error(&format!("Malformed events payload: {}", e)))?;

        self.enrich(&mut events).await;

        Ok(events)
    }
}
