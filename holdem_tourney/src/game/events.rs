use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{Blinds, Card, Chips, ResolvedAction, SeatIndex, Username},
    functional::{HandValue, Odds},
    pot::PotAward,
    state_machine::Street,
};

fn join_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CancelReason {
    Vote,
    Operator,
    /// Players left during the start delay
    NotEnoughPlayers,
}

/// Something that happened at a table, in the order it happened.
///
/// `Display` gives the chat line for the event.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    Joined {
        name: Username,
        seat: SeatIndex,
        stack: Chips,
    },
    Left(Username),
    StartScheduled {
        delay_secs: u64,
        players: usize,
    },
    TournamentStarted {
        players: usize,
        stack: Chips,
        blinds: Blinds,
    },
    TournamentCancelled(CancelReason),
    HandStarted {
        hand: u32,
        dealer: Username,
        blinds: Blinds,
    },
    BlindPosted {
        name: Username,
        amount: Chips,
        big: bool,
        all_in: bool,
    },
    /// Only meant for `name`.
    HoleCards {
        name: Username,
        cards: Vec<Card>,
    },
    Turn {
        name: Username,
        to_call: Chips,
        min_raise: Chips,
        stack: Chips,
    },
    ActionTaken {
        name: Username,
        action: ResolvedAction,
    },
    StreetRevealed {
        street: Street,
        board: Vec<Card>,
    },
    Odds(Vec<(Username, Odds)>),
    Showdown {
        name: Username,
        cards: Vec<Card>,
        hand: HandValue,
    },
    PotAwarded(PotAward),
    /// Stack and net change over the hand, per player.
    StackUpdate(Vec<(Username, Chips, i64)>),
    BlindsRaised(Blinds),
    Eliminated {
        name: Username,
        placement: usize,
    },
    IdleWarning {
        name: Username,
        secs_left: u64,
    },
    IdleOut(Username),
    VoteCast {
        name: Username,
        votes: usize,
        needed: usize,
    },
    Winner {
        name: Username,
        hands: u32,
    },
    TournamentVoid,
}

impl GameEvent {
    /// The single player an event is addressed to, if it is private.
    #[must_use]
    pub fn recipient(&self) -> Option<&Username> {
        match self {
            Self::HoleCards { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joined { name, seat, stack } => {
                write!(f, "{name} joined in seat {seat} with {stack}")
            }
            Self::Left(name) => write!(f, "{name} left the table"),
            Self::StartScheduled {
                delay_secs,
                players,
            } => write!(
                f,
                "tournament starts in {delay_secs}s with {players} players, vote stop to cancel"
            ),
            Self::TournamentStarted {
                players,
                stack,
                blinds,
            } => write!(
                f,
                "tournament started: {players} players, {stack} chips each, blinds {blinds}"
            ),
            Self::TournamentCancelled(CancelReason::Vote) => {
                write!(f, "tournament cancelled by vote, stacks restored")
            }
            Self::TournamentCancelled(CancelReason::Operator) => {
                write!(f, "tournament stopped by an operator, stacks restored")
            }
            Self::TournamentCancelled(CancelReason::NotEnoughPlayers) => {
                write!(f, "tournament cancelled, not enough players")
            }
            Self::HandStarted {
                hand,
                dealer,
                blinds,
            } => write!(f, "hand #{hand}: {dealer} has the button, blinds {blinds}"),
            Self::BlindPosted {
                name,
                amount,
                big,
                all_in,
            } => {
                let which = if *big { "big" } else { "small" };
                write!(f, "{name} posts the {which} blind of {amount}")?;
                if *all_in {
                    write!(f, " and is all-in")?;
                }
                Ok(())
            }
            Self::HoleCards { cards, .. } => write!(f, "your cards: {}", join_cards(cards)),
            Self::Turn {
                name,
                to_call,
                min_raise,
                stack,
            } => {
                if *to_call == 0 {
                    write!(f, "{name} to act, check or bet (min raise {min_raise}, stack {stack})")
                } else {
                    write!(
                        f,
                        "{name} to act, {to_call} to call (min raise {min_raise}, stack {stack})"
                    )
                }
            }
            Self::ActionTaken { name, action } => write!(f, "{name} {action}"),
            Self::StreetRevealed { street, board } => {
                write!(f, "{street}: {}", join_cards(board))
            }
            Self::Odds(odds) => {
                let parts: Vec<String> = odds
                    .iter()
                    .map(|(name, odds)| format!("{name} {odds}"))
                    .collect();
                write!(f, "odds: {}", parts.join(", "))
            }
            Self::Showdown { name, cards, hand } => {
                write!(f, "{name} shows {} for {hand}", join_cards(cards))
            }
            Self::PotAwarded(award) => {
                let label = if award.pot == 0 {
                    "main pot".to_string()
                } else {
                    format!("side pot {}", award.pot)
                };
                let parts: Vec<String> = award
                    .shares
                    .iter()
                    .map(|(name, amount)| format!("{name} wins {amount}"))
                    .collect();
                write!(f, "{label} of {}: {}", award.total, parts.join(", "))?;
                if award.odd_chips > 0 {
                    write!(f, " ({} odd chips)", award.odd_chips)?;
                }
                Ok(())
            }
            Self::StackUpdate(stacks) => {
                let parts: Vec<String> = stacks
                    .iter()
                    .map(|(name, stack, net)| format!("{name} {stack} ({net:+})"))
                    .collect();
                write!(f, "stacks: {}", parts.join(", "))
            }
            Self::BlindsRaised(blinds) => write!(f, "blinds are now {blinds}"),
            Self::Eliminated { name, placement } => {
                write!(f, "{name} is eliminated in place #{placement}")
            }
            Self::IdleWarning { name, secs_left } => {
                write!(f, "{name}, you have {secs_left}s to act")
            }
            Self::IdleOut(name) => write!(f, "{name} timed out"),
            Self::VoteCast {
                name,
                votes,
                needed,
            } => write!(f, "{name} votes to cancel ({votes}/{needed})"),
            Self::Winner { name, hands } => {
                write!(f, "{name} wins the tournament after {hands} hands")
            }
            Self::TournamentVoid => write!(f, "tournament over with no winner"),
        }
    }
}
