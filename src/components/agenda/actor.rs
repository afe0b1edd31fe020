use super::models::{AgendaSnapshot, MappedEvent};
use super::navigator::{ViewMode, ViewNavigator};
use super::{projector, range};
use crate::components::event_source::{CalendarCredentials, EventSource, RawEvent};
use crate::config::Config;
use crate::error::{calendar_api_error, AgendaResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, warn};

/// Commands that can be sent to the agenda actor
pub enum AgendaCommand {
    Next,
    Previous,
    SwitchMode(ViewMode),
    SelectDay(i32),
    SetCredentials(Option<CalendarCredentials>),
    Refresh,
    Snapshot(mpsc::Sender<AgendaSnapshot>),
    FetchDone {
        seq: u64,
        result: AgendaResult<Vec<RawEvent>>,
    },
    Shutdown,
}

/// The agenda actor: owns the view state and the mapped event set, and
/// serializes all mutation through its mailbox
pub struct AgendaActor {
    config: Arc<RwLock<Config>>,
    source: Arc<dyn EventSource>,
    navigator: ViewNavigator,
    credentials: Option<CalendarCredentials>,
    events: Vec<MappedEvent>,
    loading: bool,
    error: Option<String>,
    fetch_seq: u64,
    command_rx: mpsc::Receiver<AgendaCommand>,
    command_tx: mpsc::Sender<AgendaCommand>,
}

impl AgendaActor {
    /// Create a new actor and the sender half of its mailbox
    pub fn new(
        config: Arc<RwLock<Config>>,
        source: Arc<dyn EventSource>,
        navigator: ViewNavigator,
    ) -> (Self, mpsc::Sender<AgendaCommand>) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            source,
            navigator,
            credentials: None,
            events: Vec::new(),
            loading: false,
            error: None,
            fetch_seq: 0,
            command_rx,
            command_tx: command_tx.clone(),
        };

        (actor, command_tx)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Agenda actor started");

        self.refresh().await;

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AgendaCommand::Next => self.navigate(|n| n.next()).await,
                AgendaCommand::Previous => self.navigate(|n| n.previous()).await,
                AgendaCommand::SwitchMode(mode) => {
                    self.navigate(move |n| n.switch_mode(mode)).await
                }
                AgendaCommand::SelectDay(day) => self.navigate(move |n| n.select_day(day)).await,
                AgendaCommand::SetCredentials(credentials) => {
                    self.credentials = credentials;
                    self.refresh().await;
                }
                AgendaCommand::Refresh => self.refresh().await,
                AgendaCommand::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot()).await;
                }
                AgendaCommand::FetchDone { seq, result } => self.on_fetch_done(seq, result).await,
                AgendaCommand::Shutdown => {
                    info!("Agenda actor shutting down");
                    break;
                }
            }
        }

        info!("Agenda actor shut down");
    }

    /// Apply a navigation action; only an actual state change refetches
    async fn navigate(&mut self, action: impl FnOnce(&mut ViewNavigator)) {
        let before = *self.navigator.state();
        action(&mut self.navigator);

        if *self.navigator.state() != before {
            self.refresh().await;
        }
    }

    /// Issue a new fetch for the current window. Bumping the sequence number
    /// turns any in-flight fetch stale.
    async fn refresh(&mut self) {
        self.fetch_seq += 1;
        let seq = self.fetch_seq;

        let Some(credentials) = self.credentials.clone() else {
            // No linked calendar: empty agenda, nothing to fetch
            self.events.clear();
            self.loading = false;
            self.error = None;
            return;
        };

        let config = self.config.read().await;
        let window = match range::range_for(self.navigator.state(), &config.timezone) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to compute query window: {}", e);
                self.loading = false;
                self.error = Some(e.to_string());
                return;
            }
        };
        let max_results = config.max_results;
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        drop(config);

        self.loading = true;
        self.error = None;

        let source = Arc::clone(&self.source);
        let command_tx = self.command_tx.clone();

        tokio::spawn(async move {
            let result = match tokio::time::timeout(
                timeout,
                source.fetch_events(&credentials, &window, max_results),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(calendar_api_error("Event fetch timed out")),
            };

            let _ = command_tx.send(AgendaCommand::FetchDone { seq, result }).await;
        });
    }

    async fn on_fetch_done(&mut self, seq: u64, result: AgendaResult<Vec<RawEvent>>) {
        if seq != self.fetch_seq {
            debug!(seq, current = self.fetch_seq, "Discarding stale fetch result");
            return;
        }

        self.loading = false;

        match result {
            Ok(raw_events) => {
                let timezone = {
                    let config = self.config.read().await;
                    config.timezone.clone()
                };

                match projector::project(&raw_events, &timezone) {
                    Ok(mapped) => {
                        info!(count = mapped.len(), "Agenda refreshed");
                        self.events = mapped;
                        self.error = None;
                    }
                    Err(e) => {
                        error!("Failed to project events: {}", e);
                        self.error = Some(e.to_string());
                    }
                }
            }
            Err(e) => {
                // Fetch failure keeps the previous event set
                warn!("Event fetch failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    fn snapshot(&self) -> AgendaSnapshot {
        AgendaSnapshot {
            events: projector::visible_events(&self.events, self.navigator.state()),
            loading: self.loading,
            error: self.error.clone(),
            header_title: self.navigator.header_title(),
        }
    }
}
