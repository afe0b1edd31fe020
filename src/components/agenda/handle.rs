use super::actor::{AgendaActor, AgendaCommand};
use super::models::AgendaSnapshot;
use super::navigator::{ViewMode, ViewNavigator};
use super::range;
use crate::components::event_source::{CalendarCredentials, EventSource};
use crate::config::Config;
use crate::error::{component_error, AgendaResult};
use crate::utils::clock::Clock;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

/// Handle for interacting with the agenda actor
#[derive(Clone)]
pub struct AgendaHandle {
    command_tx: mpsc::Sender<AgendaCommand>,
    _actor_task: Arc<JoinHandle<()>>,
}

impl AgendaHandle {
    /// Spawn the agenda actor, starting in week view anchored to the week
    /// containing the clock's "now"
    pub async fn new(
        config: Arc<RwLock<Config>>,
        source: Arc<dyn EventSource>,
        clock: &dyn Clock,
    ) -> AgendaResult<Self> {
        let timezone = {
            let config_read = config.read().await;
            config_read.timezone.clone()
        };
        let tz = range::parse_timezone(&timezone)?;

        let navigator = ViewNavigator::new(clock, tz);
        let (mut actor, command_tx) = AgendaActor::new(config, source, navigator);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            command_tx,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Advance the visible week or month; no-op in day view
    pub async fn next(&self) -> AgendaResult<()> {
        self.send(AgendaCommand::Next).await
    }

    /// Step back one week or month; no-op in day view
    pub async fn previous(&self) -> AgendaResult<()> {
        self.send(AgendaCommand::Previous).await
    }

    pub async fn switch_mode(&self, mode: ViewMode) -> AgendaResult<()> {
        self.send(AgendaCommand::SwitchMode(mode)).await
    }

    /// Select a day within the visible week strip, day view only
    pub async fn select_day(&self, day: i32) -> AgendaResult<()> {
        self.send(AgendaCommand::SelectDay(day)).await
    }

    /// Replace the viewer's calendar credentials. `None` clears the agenda
    /// without contacting the event source.
    pub async fn set_credentials(
        &self,
        credentials: Option<CalendarCredentials>,
    ) -> AgendaResult<()> {
        self.send(AgendaCommand::SetCredentials(credentials)).await
    }

    /// Force a refetch of the current window
    pub async fn refresh(&self) -> AgendaResult<()> {
        self.send(AgendaCommand::Refresh).await
    }

    /// Current filtered events, flags and header title
    pub async fn snapshot(&self) -> AgendaResult<AgendaSnapshot> {
        let (reply_tx, mut reply_rx) = mpsc::channel(1);
        self.send(AgendaCommand::Snapshot(reply_tx)).await?;

        reply_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AgendaResult<()> {
        let _ = self.command_tx.send(AgendaCommand::Shutdown).await;
        Ok(())
    }

    async fn send(&self, cmd: AgendaCommand) -> AgendaResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))
    }
}
