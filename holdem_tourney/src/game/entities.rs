use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::VecDeque,
    fmt::{self},
};

use super::{constants, functional::HandValue, stats::PlayerStats};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Club => 0,
            Self::Spade => 1,
            Self::Diamond => 2,
            Self::Heart => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            14 => write!(f, "A{}", self.1),
            13 => write!(f, "K{}", self.1),
            12 => write!(f, "Q{}", self.1),
            11 => write!(f, "J{}", self.1),
            10 => write!(f, "T{}", self.1),
            v => write!(f, "{v}{}", self.1),
        }
    }
}

/// A shoe of `52 × N` cards.
///
/// Cards are drawn from the front. Cards that leave play are handed back
/// through [`Deck::discard`] and only re-enter the draw pile on
/// [`Deck::refill`], which reshuffles them in.
#[derive(Debug)]
pub struct Deck {
    cards: VecDeque<Card>,
    discards: Vec<Card>,
    num_decks: usize,
    rng: StdRng,
}

impl Deck {
    #[must_use]
    pub fn new(num_decks: usize) -> Self {
        Self::with_rng(num_decks, StdRng::from_os_rng())
    }

    /// Deterministic deck, mostly useful for replaying hands in tests.
    #[must_use]
    pub fn with_seed(num_decks: usize, seed: u64) -> Self {
        Self::with_rng(num_decks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(num_decks: usize, rng: StdRng) -> Self {
        let mut deck = Self {
            cards: VecDeque::with_capacity(num_decks.max(1) * constants::CARDS_PER_DECK),
            discards: Vec::new(),
            num_decks: num_decks.max(1),
            rng,
        };
        deck.restock();
        deck
    }

    /// Rebuild every card of the shoe from scratch, dropping discards, and
    /// shuffle.
    pub fn restock(&mut self) {
        self.cards.clear();
        self.discards.clear();
        for _ in 0..self.num_decks {
            for value in 2u8..=14 {
                for suit in Suit::ALL {
                    self.cards.push_back(Card(value, suit));
                }
            }
        }
        self.shuffle();
    }

    pub fn shuffle(&mut self) {
        self.cards.make_contiguous().shuffle(&mut self.rng);
    }

    /// Draw the top card. An empty draw pile is refilled from the discards
    /// first; `None` means every card is currently in play.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            self.refill();
        }
        self.cards.pop_front()
    }

    /// Draw a card from a random position in the draw pile.
    pub fn draw_random(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            self.refill();
        }
        if self.cards.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..self.cards.len());
        self.cards.remove(idx)
    }

    pub fn discard(&mut self, card: Card) {
        self.discards.push(card);
    }

    /// Return all discards to the draw pile and reshuffle.
    pub fn refill(&mut self) {
        self.cards.extend(self.discards.drain(..));
        self.shuffle();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discards.len()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Type alias for whole chips. All bets, pots and stacks are whole chips.
pub type Chips = u32;

/// Stable player handle as seen on the chat channel.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        if let Some((idx, _)) = username.char_indices().nth(constants::MAX_USERNAME_LENGTH) {
            username.truncate(idx);
        }
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Seat numbers are handed out in join order and never reused within a
/// tournament, so they double as a stable seating order.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

/// A betting decision as requested by a player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    AllIn,
    /// Total amount the player wants in front of them this street. Must
    /// clear the current bet by at least the minimum raise unless it puts
    /// the player all in; use `Call` or `Check` to match.
    Bet(Chips),
    Call,
    Check,
    Fold,
    /// Amount to raise by, on top of the current bet.
    Raise(Chips),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AllIn => write!(f, "all-in"),
            Self::Bet(amount) => write!(f, "bet {amount}"),
            Self::Call => write!(f, "call"),
            Self::Check => write!(f, "check"),
            Self::Fold => write!(f, "fold"),
            Self::Raise(amount) => write!(f, "raise {amount}"),
        }
    }
}

/// What an [`Action`] turned into once it was applied to the table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ResolvedAction {
    AllIn(Chips),
    Bet(Chips),
    Call(Chips),
    Check,
    Fold,
    Raise(Chips),
}

impl fmt::Display for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AllIn(total) => write!(f, "goes all-in for {total}"),
            Self::Bet(total) => write!(f, "bets {total}"),
            Self::Call(total) => write!(f, "calls {total}"),
            Self::Check => write!(f, "checks"),
            Self::Fold => write!(f, "folds"),
            Self::Raise(total) => write!(f, "raises to {total}"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Player {
    pub name: Username,
    pub seat: SeatIndex,
    /// Chips in front of the player that are not committed to this street.
    pub cash: Chips,
    /// Banked reserve carried between cash games. Tournaments never touch it.
    pub bank: Chips,
    /// Contribution to the current street, not yet swept into a pot.
    pub bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub has_quit: bool,
    pub cancel_vote: bool,
    pub cards: Vec<Card>,
    pub best_hand: Option<HandValue>,
    /// Stack at the moment the current hand started.
    pub hand_start_cash: Chips,
    pub stats: PlayerStats,
}

impl Player {
    #[must_use]
    pub fn new(name: Username, seat: SeatIndex, cash: Chips, stats: PlayerStats) -> Self {
        Self {
            name,
            seat,
            cash,
            bank: stats.bank,
            bet: 0,
            folded: false,
            all_in: false,
            has_quit: false,
            cancel_vote: false,
            cards: Vec::with_capacity(constants::HOLE_CARDS),
            best_hand: None,
            hand_start_cash: cash,
            stats,
        }
    }

    /// Clear every per-hand field.
    pub fn reset_for_hand(&mut self) {
        self.bet = 0;
        self.folded = false;
        self.all_in = false;
        self.cards.clear();
        self.best_hand = None;
        self.hand_start_cash = self.cash;
    }

    /// Whether the player can still make voluntary decisions this hand.
    #[must_use]
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    /// Move chips from the stack so that `bet` becomes `total`, flagging
    /// the player all-in when the stack runs dry.
    pub fn commit_to(&mut self, total: Chips) -> Chips {
        let delta = total.saturating_sub(self.bet).min(self.cash);
        self.cash -= delta;
        self.bet += delta;
        if self.cash == 0 {
            self.all_in = true;
        }
        delta
    }

    /// Net change of the stack over the current hand.
    #[must_use]
    pub fn net_change(&self) -> i64 {
        i64::from(self.cash) + i64::from(self.bet) - i64::from(self.hand_start_cash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn player(name: &str, cash: Chips) -> Player {
        Player::new(name.into(), 0, cash, PlayerStats::default())
    }

    // === Card Tests ===

    #[test]
    fn test_card_display() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(10, Suit::Heart).to_string(), "T♥");
        assert_eq!(Card(7, Suit::Club).to_string(), "7♣");
    }

    // === Deck Tests ===

    #[test]
    fn test_deck_initialization() {
        let deck = Deck::new(1);
        assert_eq!(deck.len(), 52);

        let shoe = Deck::new(3);
        assert_eq!(shoe.len(), 156);
    }

    #[test]
    fn test_deck_cards_unique() {
        let mut deck = Deck::with_seed(1, 7);
        let mut seen = HashSet::new();
        while deck.len() > 0 {
            let card = deck.draw().unwrap();
            assert!((2..=14).contains(&card.0));
            assert!(seen.insert(card), "duplicate card {card}");
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_deck_seeded_is_deterministic() {
        let mut a = Deck::with_seed(1, 42);
        let mut b = Deck::with_seed(1, 42);
        for _ in 0..10 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_deck_draw_random_removes_card() {
        let mut deck = Deck::with_seed(1, 3);
        let card = deck.draw_random().unwrap();
        assert_eq!(deck.len(), 51);
        let rest: Vec<Card> = (0..51).filter_map(|_| deck.draw()).collect();
        assert_eq!(rest.len(), 51);
        assert!(!rest.contains(&card));
    }

    #[test]
    fn test_deck_refills_from_discards() {
        let mut deck = Deck::with_seed(1, 11);
        let mut drawn = Vec::new();
        for _ in 0..52 {
            drawn.push(deck.draw().unwrap());
        }
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), None);

        for card in drawn.drain(..10) {
            deck.discard(card);
        }
        assert_eq!(deck.discarded(), 10);
        // An empty pile pulls the discards back in on the next draw.
        assert!(deck.draw().is_some());
        assert_eq!(deck.len(), 9);
        assert_eq!(deck.discarded(), 0);
    }

    // === Username Tests ===

    #[test]
    fn test_username_sanitizes_whitespace() {
        let username = Username::new("big slick");
        assert_eq!(username.as_str(), "big_slick");
    }

    #[test]
    fn test_username_truncates() {
        let username = Username::new(&"x".repeat(40));
        assert_eq!(username.as_str().len(), constants::MAX_USERNAME_LENGTH);
    }

    // === Player Tests ===

    #[test]
    fn test_commit_to_partial_stack_flags_all_in() {
        let mut p = player("alice", 15);
        let moved = p.commit_to(20);
        assert_eq!(moved, 15);
        assert_eq!(p.bet, 15);
        assert_eq!(p.cash, 0);
        assert!(p.all_in);
        assert!(!p.can_act());
    }

    #[test]
    fn test_commit_to_tops_up_existing_bet() {
        let mut p = player("bob", 1000);
        p.commit_to(5);
        let moved = p.commit_to(30);
        assert_eq!(moved, 25);
        assert_eq!(p.bet, 30);
        assert_eq!(p.cash, 970);
        assert!(!p.all_in);
    }

    #[test]
    fn test_reset_for_hand_snapshots_stack() {
        let mut p = player("carol", 500);
        p.folded = true;
        p.bet = 40;
        p.cash = 460;
        p.cards.push(Card(2, Suit::Club));
        p.bet = 0;
        p.reset_for_hand();
        assert!(!p.folded);
        assert!(p.cards.is_empty());
        assert_eq!(p.hand_start_cash, 460);
        assert_eq!(p.net_change(), 0);
    }

    #[test]
    fn test_blinds_display() {
        let blinds = Blinds { small: 5, big: 10 };
        assert_eq!(blinds.to_string(), "5/10");
    }
}
