use serde::{Deserialize, Serialize};

/// OAuth credential bundle for the viewer's linked calendar. Opaque to the
/// engine; passed through to the fetch collaborator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCredentials {
    pub refresh_token: String,
    pub access_token: String,
    pub token_expiry: Option<String>,
    pub email: String,
}

/// Event attendee as returned by the calendar API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Attendee {
    pub email: String,
}

/// One side of an event's time range, discriminated at parse time. An event
/// side carrying neither representation fails deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    /// Timed boundary; the timezone offset is embedded in the string
    Timed {
        #[serde(rename = "dateTime")]
        date_time: String,
    },
    /// All-day boundary as a bare calendar date
    AllDay { date: String },
}

/// Raw calendar event as received from the event source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Patient name attached by the collaborator, best-effort
    #[serde(
        default,
        rename = "patientName",
        skip_serializing_if = "Option::is_none"
    )]
    pub patient_name: Option<String>,
}
