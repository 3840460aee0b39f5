use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

/// Broad class of a rejected request, so a front-end can render each
/// differently.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Bad or out-of-range parameter.
    Input,
    /// Wrong player, or the round is busy.
    Turn,
    /// Request does not fit the table's state.
    State,
}

/// Errors reported back to the player who issued a command. None of them
/// change table state.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("need at least {to_call} to call")]
    BetBelowCall { to_call: Chips },
    #[error("minimum raise is to {min_total}")]
    RaiseTooSmall { min_total: Chips },
    #[error("can't check, {to_call} to call")]
    CannotCheck { to_call: Chips },
    #[error("not your turn")]
    OutOfTurn,
    #[error("still processing, try again")]
    StillProcessing,
    #[error("tournament already in progress")]
    AlreadyInProgress,
    #[error("tournament already starting")]
    AlreadyStarting,
    #[error("nobody's turn")]
    NoActiveHand,
    #[error("not playing")]
    NotPlaying,
    #[error("already joined")]
    AlreadyJoined,
    #[error("table is full")]
    TableFull,
    #[error("need {min}+ players")]
    NotEnoughPlayers { min: usize },
    #[error("nothing to cancel")]
    NothingToCancel,
    #[error("can't join a running tournament")]
    RegistrationClosed,
    #[error("table is closed")]
    TableClosed,
}

impl GameError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::BetBelowCall { .. }
            | Self::RaiseTooSmall { .. }
            | Self::CannotCheck { .. } => ErrorKind::Input,
            Self::OutOfTurn | Self::StillProcessing => ErrorKind::Turn,
            Self::AlreadyInProgress
            | Self::AlreadyStarting
            | Self::NoActiveHand
            | Self::NotPlaying
            | Self::AlreadyJoined
            | Self::TableFull
            | Self::NotEnoughPlayers { .. }
            | Self::NothingToCancel
            | Self::RegistrationClosed
            | Self::TableClosed => ErrorKind::State,
        }
    }
}

/// Parse a chip amount typed by a player.
pub fn parse_amount(raw: &str) -> Result<Chips, GameError> {
    raw.trim()
        .parse::<Chips>()
        .map_err(|_| GameError::InvalidAmount(raw.trim().to_string()))
}
