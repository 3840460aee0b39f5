//! Fixed limits shared across the engine.

/// Cards in a single standard deck.
pub const CARDS_PER_DECK: usize = 52;

/// Hole cards dealt to each player.
pub const HOLE_CARDS: usize = 2;

/// Community cards on a complete board.
pub const BOARD_CARDS: usize = 5;

/// Longest handle accepted from the transport. Anything longer is truncated.
pub const MAX_USERNAME_LENGTH: usize = 16;

/// Upper bound of seats for a single deck: 23 players × 2 hole cards
/// + 5 board cards = 51 cards.
pub const MAX_PLAYERS_PER_DECK: usize = 23;

/// Random boards sampled when estimating odds with more than two
/// community cards still to come.
pub const DEFAULT_ODDS_SAMPLES: usize = 2_000;
