//! Table actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    entities::{Blinds, Card, Chips, SeatIndex, Username},
    errors::GameError,
    events::GameEvent,
    pot::Pot,
    state_machine::{Phase, Street},
};
use crate::tournament::TournamentState;

use super::scheduler::TimerFired;

/// A verb issued by someone in the channel, parameters still as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Join,
    Leave,
    Start,
    /// Vote to cancel the pending or running tournament
    Stop,
    Bet(String),
    Raise(String),
    Call,
    Check,
    Fold,
    AllIn,
    /// Operator: start now, skipping the start delay
    ForceStart,
    /// Operator: fold the current bettor
    ForceFold,
    /// Operator: check (or fold, when facing a bet) for the current bettor
    ForceCheck,
    /// Operator: cancel regardless of votes
    ForceStop,
}

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Player or operator command
    Command {
        actor: Username,
        command: Command,
        response: oneshot::Sender<TableResponse>,
    },

    /// Internal: a scheduled timer went off
    Timer(TimerFired),

    /// Get a read-only view of the table
    GetStatus {
        response: oneshot::Sender<TableSnapshot>,
    },

    /// Subscribe to table events
    Subscribe {
        subscriber: u64,
        sender: mpsc::Sender<GameEvent>,
    },

    /// Unsubscribe from table events
    Unsubscribe { subscriber: u64 },

    /// Close table
    Close {
        response: oneshot::Sender<TableResponse>,
    },
}

/// Response from table operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResponse {
    /// Operation succeeded
    Success,

    /// Operation succeeded with message
    SuccessWithMessage(String),

    /// Operation rejected, nothing changed
    Error(GameError),
}

impl TableResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(self, TableResponse::Success | TableResponse::SuccessWithMessage(_))
    }

    /// Get error message if response is an error
    pub fn error_message(&self) -> Option<String> {
        match self {
            TableResponse::Error(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

impl From<Result<Option<String>, GameError>> for TableResponse {
    fn from(value: Result<Option<String>, GameError>) -> Self {
        match value {
            Ok(None) => Self::Success,
            Ok(Some(message)) => Self::SuccessWithMessage(message),
            Err(err) => Self::Error(err),
        }
    }
}

/// Public state of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub name: Username,
    pub seat: SeatIndex,
    pub cash: Chips,
    pub bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub has_quit: bool,
    pub cancel_vote: bool,
}

/// Read-only view of a table, answered to status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    pub state: TournamentState,
    pub phase: Phase,
    pub street: Street,
    pub hand_number: u32,
    pub board: Vec<Card>,
    pub pots: Vec<Pot>,
    pub blinds: Blinds,
    pub current_bettor: Option<Username>,
    pub current_bet: Chips,
    pub players: Vec<SeatView>,
    pub eliminated: Vec<Username>,
}
