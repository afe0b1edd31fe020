use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use clinagenda::components::agenda::{AgendaHandle, ViewMode, ViewWindow};
use clinagenda::components::event_source::{
    CalendarCredentials, EventSource, EventTime, RawEvent,
};
use clinagenda::config::Config;
use clinagenda::error::{calendar_api_error, AgendaResult};
use clinagenda::utils::clock::FixedClock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;

/// One scripted reply. `window_start` restricts the reply to fetches whose
/// window starts with the given prefix; `None` matches any fetch.
struct MockResponse {
    window_start: Option<&'static str>,
    delay_ms: u64,
    result: Result<Vec<RawEvent>, String>,
    consumed: bool,
}

impl MockResponse {
    fn ok(events: Vec<RawEvent>) -> Self {
        Self {
            window_start: None,
            delay_ms: 0,
            result: Ok(events),
            consumed: false,
        }
    }

    fn err(message: &str) -> Self {
        Self {
            window_start: None,
            delay_ms: 0,
            result: Err(message.to_string()),
            consumed: false,
        }
    }

    fn for_window(mut self, prefix: &'static str) -> Self {
        self.window_start = Some(prefix);
        self
    }

    fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Mock implementation of the event source for testing
struct MockEventSource {
    responses: Mutex<Vec<MockResponse>>,
    calls: AtomicUsize,
}

impl MockEventSource {
    fn new(responses: Vec<MockResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_events(
        &self,
        _credentials: &CalendarCredentials,
        window: &ViewWindow,
        _max_results: Option<u32>,
    ) -> AgendaResult<Vec<RawEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (delay_ms, result) = {
            let mut responses = self.responses.lock().await;
            let matching = responses.iter_mut().find(|r| {
                !r.consumed
                    && r.window_start
                        .map_or(true, |prefix| window.start.starts_with(prefix))
            });

            let Some(response) = matching else {
                return Ok(Vec::new());
            };
            response.consumed = true;
            (response.delay_ms, response.result.clone())
        };

        if delay_ms > 0 {
            sleep(Duration::from_millis(delay_ms)).await;
        }

        result.map_err(|e| calendar_api_error(&e))
    }
}

fn timed_event(id: &str, start: &str, end: &str) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        summary: Some("Consulta".to_string()),
        description: Some("Maria Souza".to_string()),
        start: EventTime::Timed {
            date_time: start.to_string(),
        },
        end: EventTime::Timed {
            date_time: end.to_string(),
        },
        attendees: Vec::new(),
        patient_name: None,
    }
}

fn test_credentials() -> CalendarCredentials {
    CalendarCredentials {
        refresh_token: "test_refresh_token".to_string(),
        access_token: "test_access_token".to_string(),
        token_expiry: None,
        email: "doctor@clinic.example".to_string(),
    }
}

fn test_config() -> Arc<RwLock<Config>> {
    Arc::new(RwLock::new(Config {
        google_calendar_id: "clinic_calendar".to_string(),
        timezone: "America/Sao_Paulo".to_string(),
        max_results: Some(100),
        fetch_timeout_secs: 5,
    }))
}

/// Wednesday 2025-06-11 noon in São Paulo; the visible week is June 8-14
fn test_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 6, 11, 15, 0, 0).unwrap())
}

/// Test that demonstrates how to use the mock
#[tokio::test]
async fn test_mock_returns_scripted_events() {
    let source = MockEventSource::new(vec![MockResponse::ok(vec![timed_event(
        "event1",
        "2025-06-10T14:30:00-03:00",
        "2025-06-10T15:00:00-03:00",
    )])]);

    let window = ViewWindow {
        start: "2025-06-08T03:00:00.000Z".to_string(),
        end: "2025-06-15T02:59:59.999Z".to_string(),
    };

    let events = source
        .fetch_events(&test_credentials(), &window, None)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "event1");

    // The script is consumed; further fetches find nothing
    let events = source
        .fetch_events(&test_credentials(), &window, None)
        .await
        .unwrap();
    assert!(events.is_empty());
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_missing_credentials_short_circuit_to_empty_agenda() {
    let source = MockEventSource::new(Vec::new());
    let handle = AgendaHandle::new(test_config(), source.clone(), &test_clock())
        .await
        .unwrap();

    sleep(Duration::from_millis(50)).await;
    let snapshot = handle.snapshot().await.unwrap();

    assert!(snapshot.events.is_empty());
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(source.calls(), 0);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_events_are_fetched_projected_and_filtered() {
    let source = MockEventSource::new(vec![MockResponse::ok(vec![
        timed_event(
            "in-week",
            "2025-06-10T14:30:00-03:00",
            "2025-06-10T15:00:00-03:00",
        ),
        timed_event(
            "out-of-week",
            "2025-06-20T14:30:00-03:00",
            "2025-06-20T15:00:00-03:00",
        ),
    ])]);

    let handle = AgendaHandle::new(test_config(), source.clone(), &test_clock())
        .await
        .unwrap();
    handle.set_credentials(Some(test_credentials())).await.unwrap();

    sleep(Duration::from_millis(100)).await;
    let snapshot = handle.snapshot().await.unwrap();

    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].id, "in-week");
    assert_eq!(snapshot.events[0].time, "14:30");
    assert_eq!(snapshot.events[0].duration, "30min");
    assert_eq!(snapshot.header_title, "8 – 14 junho 2025");
    assert!(snapshot.error.is_none());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_fetch_failure_keeps_the_previous_event_set() {
    let source = MockEventSource::new(vec![
        MockResponse::ok(vec![timed_event(
            "kept",
            "2025-06-10T14:30:00-03:00",
            "2025-06-10T15:00:00-03:00",
        )]),
        MockResponse::err("Failed to fetch events: HTTP 500"),
    ]);

    let handle = AgendaHandle::new(test_config(), source.clone(), &test_clock())
        .await
        .unwrap();
    handle.set_credentials(Some(test_credentials())).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    handle.refresh().await.unwrap();
    sleep(Duration::from_millis(100)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].id, "kept");
    assert!(!snapshot.loading);
    let error = snapshot.error.unwrap();
    assert!(error.contains("HTTP 500"));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_last_write_wins_discards_the_stale_fetch() {
    // The fetch for the first week resolves long after the navigation to
    // the second week; its result must be discarded
    let source = MockEventSource::new(vec![
        MockResponse::ok(vec![timed_event(
            "stale",
            "2025-06-09T10:00:00-03:00",
            "2025-06-09T11:00:00-03:00",
        )])
        .for_window("2025-06-08")
        .delayed(300),
        MockResponse::ok(vec![timed_event(
            "fresh",
            "2025-06-16T10:00:00-03:00",
            "2025-06-16T11:00:00-03:00",
        )])
        .for_window("2025-06-15")
        .delayed(50),
    ]);

    let handle = AgendaHandle::new(test_config(), source.clone(), &test_clock())
        .await
        .unwrap();
    handle.set_credentials(Some(test_credentials())).await.unwrap();
    handle.next().await.unwrap();

    sleep(Duration::from_millis(600)).await;
    let snapshot = handle.snapshot().await.unwrap();

    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].id, "fresh");
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.header_title, "15 – 21 junho 2025");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_mode_switch_round_trip_preserves_the_week_anchor() {
    let source = MockEventSource::new(Vec::new());
    let handle = AgendaHandle::new(test_config(), source, &test_clock())
        .await
        .unwrap();

    let before = handle.snapshot().await.unwrap().header_title;
    assert_eq!(before, "8 – 14 junho 2025");

    handle.switch_mode(ViewMode::Month).await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().header_title, "junho 2025");

    handle.switch_mode(ViewMode::Week).await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().header_title, before);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_day_selection_refetches_the_selected_day() {
    let source = MockEventSource::new(vec![
        MockResponse::ok(vec![timed_event(
            "week-event",
            "2025-06-10T14:30:00-03:00",
            "2025-06-10T15:00:00-03:00",
        )])
        .for_window("2025-06-08"),
        MockResponse::ok(vec![timed_event(
            "day-event",
            "2025-06-12T09:00:00-03:00",
            "2025-06-12T09:30:00-03:00",
        )])
        .for_window("2025-06-12"),
    ]);

    let handle = AgendaHandle::new(test_config(), source.clone(), &test_clock())
        .await
        .unwrap();
    handle.set_credentials(Some(test_credentials())).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    handle.switch_mode(ViewMode::Day).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(
        handle.snapshot().await.unwrap().header_title,
        "11 de junho 2025"
    );

    handle.select_day(12).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.header_title, "12 de junho 2025");
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.events[0].id, "day-event");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_navigation_replaces_the_event_set_wholesale() {
    let source = MockEventSource::new(vec![MockResponse::ok(vec![timed_event(
        "first-week",
        "2025-06-10T14:30:00-03:00",
        "2025-06-10T15:00:00-03:00",
    )])
    .for_window("2025-06-08")]);

    let handle = AgendaHandle::new(test_config(), source.clone(), &test_clock())
        .await
        .unwrap();
    handle.set_credentials(Some(test_credentials())).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.snapshot().await.unwrap().events.len(), 1);

    // The next week has no scripted response: the fetch returns an empty
    // set, which replaces the previous one
    handle.next().await.unwrap();
    sleep(Duration::from_millis(100)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.events.is_empty());
    assert!(snapshot.error.is_none());

    handle.shutdown().await.unwrap();
}
