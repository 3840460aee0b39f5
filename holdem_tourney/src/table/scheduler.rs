//! Cancellable one-shot timers for a table.
//!
//! Each timer is a spawned task that sleeps and then posts
//! [`TableMessage::Timer`] to the table's own inbox, so timer work is
//! serialized with commands. The scheduler keeps at most one timer per
//! [`TimerKind`]; scheduling a kind again replaces the old timer.
//!
//! Aborting a task cannot take back a message that is already queued, so
//! every timer carries a generation number and the actor must
//! [`claim`](Scheduler::claim) a fired timer before acting on it.

use std::{collections::HashMap, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::game::entities::Username;

use super::messages::TableMessage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Starts the tournament, or deals the next hand
    StartRound,
    /// Next street of an all-in run-out
    Reveal,
    IdleWarning,
    IdleOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerTarget {
    Table,
    Player(Username),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub target: TimerTarget,
    pub generation: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    target: TimerTarget,
    task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct Scheduler {
    inbox: mpsc::WeakSender<TableMessage>,
    slots: HashMap<TimerKind, Slot>,
    generation: u64,
}

impl Scheduler {
    /// Timers post into `inbox` through a weak sender, so a pending timer
    /// never keeps a dead table alive.
    pub fn new(inbox: &mpsc::Sender<TableMessage>) -> Self {
        Self {
            inbox: inbox.downgrade(),
            slots: HashMap::new(),
            generation: 0,
        }
    }

    /// Fire `kind` for `target` after `delay`, replacing any pending timer
    /// of the same kind.
    pub fn schedule(&mut self, kind: TimerKind, target: TimerTarget, delay: Duration) -> TimerHandle {
        self.cancel_kind(kind);
        self.generation += 1;
        let generation = self.generation;
        let fired = TimerFired {
            kind,
            target: target.clone(),
            generation,
        };
        let inbox = self.inbox.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = inbox.upgrade() {
                let _ = sender.send(TableMessage::Timer(fired)).await;
            }
        });
        self.slots.insert(
            kind,
            Slot {
                generation,
                target,
                task,
            },
        );
        TimerHandle { kind, generation }
    }

    /// Cancel the pending timer of `kind`. Cancelling a timer that already
    /// fired or was cancelled does nothing.
    pub fn cancel_kind(&mut self, kind: TimerKind) -> bool {
        match self.slots.remove(&kind) {
            Some(slot) => {
                slot.task.abort();
                true
            }
            None => false,
        }
    }

    /// Start the two-stage idle clock for `player`, replacing any previous
    /// pair.
    pub fn arm_idle(&mut self, player: &Username, warning: Duration, timeout: Duration) {
        let target = TimerTarget::Player(player.clone());
        self.schedule(TimerKind::IdleWarning, target.clone(), warning);
        self.schedule(TimerKind::IdleOut, target, timeout);
    }

    pub fn cancel_idle(&mut self) {
        self.cancel_kind(TimerKind::IdleWarning);
        self.cancel_kind(TimerKind::IdleOut);
    }

    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.task.abort();
        }
    }

    /// Accept a fired timer if it is still the live one for its kind.
    /// Stale firings return `false` and must be ignored.
    pub fn claim(&mut self, fired: &TimerFired) -> bool {
        match self.slots.get(&fired.kind) {
            Some(slot) if slot.generation == fired.generation && slot.target == fired.target => {
                self.slots.remove(&fired.kind);
                true
            }
            _ => false,
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
