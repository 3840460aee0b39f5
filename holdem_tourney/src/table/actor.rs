//! Table actor implementation with async message handling.

use super::{
    config::TableConfig,
    engine::{Effect, TableEngine},
    messages::{Command, TableMessage, TableResponse, TableSnapshot},
    scheduler::Scheduler,
};
use crate::{
    game::{
        entities::Username,
        errors::GameError,
        events::GameEvent,
        functional::HandOracle,
        stats::{PlayerStats, StatKey},
    },
    store::StatStore,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, oneshot};

/// Inbox depth of a table
const INBOX_CAPACITY: usize = 100;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    name: String,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, name: String) -> Self {
        Self { sender, name }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Table is closed".to_string())
    }

    /// Issue a command and wait for the table's answer
    pub async fn command(&self, actor: impl Into<Username>, command: Command) -> TableResponse {
        let (response, rx) = oneshot::channel();
        let message = TableMessage::Command {
            actor: actor.into(),
            command,
            response,
        };
        if self.send(message).await.is_err() {
            return TableResponse::Error(GameError::TableClosed);
        }
        rx.await
            .unwrap_or(TableResponse::Error(GameError::TableClosed))
    }

    /// Current table state, `None` once the table is gone
    pub async fn status(&self) -> Option<TableSnapshot> {
        let (response, rx) = oneshot::channel();
        self.send(TableMessage::GetStatus { response }).await.ok()?;
        rx.await.ok()
    }

    /// Receive every table event on `sender`
    pub async fn subscribe(&self, subscriber: u64, sender: mpsc::Sender<GameEvent>) -> Result<(), String> {
        self.send(TableMessage::Subscribe { subscriber, sender }).await
    }
}

/// Table actor running a single tournament table.
///
/// Commands, status queries and timer firings all arrive through the one
/// inbox and are handled strictly one at a time.
pub struct TableActor {
    /// Table name
    name: String,

    /// Game state
    engine: TableEngine,

    /// Timers posting back into the inbox
    scheduler: Scheduler,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Player statistics and tournament history
    store: Arc<dyn StatStore>,

    /// Is table closed
    is_closed: bool,

    /// Event subscribers
    subscribers: HashMap<u64, mpsc::Sender<GameEvent>>,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(config: TableConfig, oracle: Arc<dyn HandOracle>, store: Arc<dyn StatStore>) -> (Self, TableHandle) {
        Self::with_engine(TableEngine::new(config, oracle), store)
    }

    /// Create an actor around a prepared engine
    pub fn with_engine(engine: TableEngine, store: Arc<dyn StatStore>) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let name = engine.config().name.clone();

        let actor = Self {
            name: name.clone(),
            engine,
            scheduler: Scheduler::new(&sender),
            inbox,
            store,
            is_closed: false,
            subscribers: HashMap::new(),
        };

        (actor, TableHandle::new(sender, name))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table '{}' starting", self.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.is_closed {
                break;
            }
        }

        self.scheduler.cancel_all();
        log::info!("Table '{}' closed", self.name);
    }

    /// Handle a table message
    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Command {
                actor,
                command,
                response,
            } => {
                let result = if command == Command::Join {
                    let stats = self.load_stats(&actor).await;
                    self.engine.join(&actor, stats)
                } else {
                    self.engine.handle(&actor, command)
                };
                if let Err(err) = &result {
                    log::debug!("Table '{}': {} rejected: {}", self.name, actor, err);
                }
                self.flush().await;
                let _ = response.send(TableResponse::from(result));
            }

            TableMessage::Timer(fired) => {
                if self.scheduler.claim(&fired) {
                    self.engine.on_timer(&fired);
                    self.flush().await;
                } else {
                    log::debug!(
                        "Table '{}': dropping stale {:?} timer",
                        self.name,
                        fired.kind
                    );
                }
            }

            TableMessage::GetStatus { response } => {
                let _ = response.send(self.engine.snapshot());
            }

            TableMessage::Subscribe { subscriber, sender } => {
                self.subscribers.insert(subscriber, sender);
                log::debug!("Subscriber {} joined table '{}'", subscriber, self.name);
            }

            TableMessage::Unsubscribe { subscriber } => {
                self.subscribers.remove(&subscriber);
                log::debug!("Subscriber {} left table '{}'", subscriber, self.name);
            }

            TableMessage::Close { response } => {
                self.scheduler.cancel_all();
                self.is_closed = true;
                let _ = response.send(TableResponse::Success);
            }
        }
    }

    /// Statistics for a joining player. Store failures fall back to
    /// defaults.
    async fn load_stats(&self, name: &Username) -> PlayerStats {
        match self.store.load_player(name).await {
            Ok(Some(line)) => PlayerStats::from_line(&line),
            Ok(None) => PlayerStats::default(),
            Err(e) => {
                log::warn!("Table '{}': loading stats for {} failed: {}", self.name, name, e);
                PlayerStats::default()
            }
        }
    }

    /// Carry out queued effects, then publish queued events.
    async fn flush(&mut self) {
        let effects: Vec<Effect> = self.engine.drain_effects().collect();
        for effect in effects {
            match effect {
                Effect::Schedule {
                    kind,
                    target,
                    delay,
                } => {
                    self.scheduler.schedule(kind, target, delay);
                }
                Effect::Cancel(kind) => {
                    self.scheduler.cancel_kind(kind);
                }
                Effect::ArmIdle {
                    player,
                    warning,
                    timeout,
                } => self.scheduler.arm_idle(&player, warning, timeout),
                Effect::CancelIdle => self.scheduler.cancel_idle(),
                Effect::CancelAll => self.scheduler.cancel_all(),
                Effect::SavePlayer(line) => {
                    let Some(handle) = line.text(StatKey::Handle) else {
                        log::warn!("Table '{}': stat line without a handle", self.name);
                        continue;
                    };
                    let name = Username::new(handle);
                    if let Err(e) = self.store.save_player(&name, line).await {
                        log::warn!("Table '{}': saving {} failed: {}", self.name, name, e);
                    }
                }
                Effect::RecordTournament(standings) => {
                    if let Err(e) = self.store.record_tournament(&standings).await {
                        log::warn!(
                            "Table '{}': recording tournament {} failed: {}",
                            self.name,
                            standings.id,
                            e
                        );
                    }
                }
            }
        }

        let events: Vec<GameEvent> = self.engine.drain_events().collect();
        for event in events {
            self.notify(event);
        }
    }

    /// Broadcast an event to all subscribers
    fn notify(&mut self, event: GameEvent) {
        self.subscribers.retain(|subscriber, sender| {
            match sender.try_send(event.clone()) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {} channel full, dropping event", subscriber);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber);
                    false
                }
            }
        });
    }
}
