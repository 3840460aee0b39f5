//! The life of a single hand.
//!
//! [`Round`] posts blinds, deals, rotates the action, sweeps bets into the
//! pot ledger at the end of each street and settles at showdown. It never
//! sleeps: whenever a delay is wanted (the all-in run-out) it returns
//! [`Step::RunOut`] and expects [`Round::reveal_next`] to be called later.
//!
//! The round does not own the players. The caller passes the same slice,
//! in seat order, to every call of a hand and must not reorder or resize
//! it until the hand is over.

use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, sync::Arc};

use super::{
    constants::{BOARD_CARDS, HOLE_CARDS},
    entities::{Action, Blinds, Card, Chips, Deck, Player, ResolvedAction, Username},
    errors::GameError,
    events::GameEvent,
    functional::{HandOracle, HandValue},
    pot::{PotAward, PotLedger},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    NotStarted,
    PreStart,
    PostingBlinds,
    Betting,
    AdvancingStreet,
    Showdown,
    Settling,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

impl Street {
    fn next(self) -> Option<Self> {
        match self {
            Self::PreFlop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            Self::River => None,
        }
    }

    /// Community cards on the board once this street is dealt.
    fn board_len(self) -> usize {
        match self {
            Self::PreFlop => 0,
            Self::Flop => 3,
            Self::Turn => 4,
            Self::River => BOARD_CARDS,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandSummary {
    pub hand: u32,
    pub awards: Vec<PotAward>,
    /// Whether hands were compared, as opposed to everyone folding to one.
    pub showdown: bool,
}

/// What the caller has to do next.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Step {
    /// Waiting on this player.
    AwaitAction(Username),
    /// Nobody can bet any more; call [`Round::reveal_next`] after a pause.
    RunOut,
    HandOver(HandSummary),
}

pub struct Round {
    phase: Phase,
    street: Street,
    deck: Deck,
    board: Vec<Card>,
    pots: PotLedger,
    dealer: usize,
    current_bettor: Option<usize>,
    /// Last player to raise. Action closes when it comes back around.
    top_bettor: Option<usize>,
    current_bet: Chips,
    min_raise: Chips,
    big_blind: Chips,
    chips_in_play: Chips,
    hand_number: u32,
    oracle: Arc<dyn HandOracle>,
    events: VecDeque<GameEvent>,
}

impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round")
            .field("phase", &self.phase)
            .field("street", &self.street)
            .field("board", &self.board)
            .field("pots", &self.pots)
            .field("current_bettor", &self.current_bettor)
            .field("top_bettor", &self.top_bettor)
            .field("current_bet", &self.current_bet)
            .field("min_raise", &self.min_raise)
            .field("hand_number", &self.hand_number)
            .finish_non_exhaustive()
    }
}

impl Round {
    #[must_use]
    pub fn new(deck: Deck, oracle: Arc<dyn HandOracle>) -> Self {
        Self {
            phase: Phase::NotStarted,
            street: Street::PreFlop,
            deck,
            board: Vec::with_capacity(BOARD_CARDS),
            pots: PotLedger::new(),
            dealer: 0,
            current_bettor: None,
            top_bettor: None,
            current_bet: 0,
            min_raise: 0,
            big_blind: 0,
            chips_in_play: 0,
            hand_number: 0,
            oracle,
            events: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn street(&self) -> Street {
        self.street
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn pots(&self) -> &PotLedger {
        &self.pots
    }

    #[must_use]
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    #[must_use]
    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    #[must_use]
    pub fn current_bettor_index(&self) -> Option<usize> {
        self.current_bettor
    }

    #[must_use]
    pub fn top_bettor_index(&self) -> Option<usize> {
        self.top_bettor
    }

    #[must_use]
    pub fn current_bettor<'a>(&self, players: &'a [Player]) -> Option<&'a Username> {
        self.current_bettor
            .and_then(|idx| players.get(idx))
            .map(|p| &p.name)
    }

    /// Whether a hand is being played, from the blinds to the last reveal.
    #[must_use]
    pub fn in_hand(&self) -> bool {
        matches!(
            self.phase,
            Phase::PostingBlinds | Phase::Betting | Phase::AdvancingStreet | Phase::Showdown
        )
    }

    /// Chips on the table: pots plus every stack and open bet.
    #[must_use]
    pub fn chips_accounted(&self, players: &[Player]) -> Chips {
        self.pots.total() + players.iter().map(|p| p.cash + p.bet).sum::<Chips>()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// A start has been scheduled.
    pub fn pre_start(&mut self) {
        self.phase = Phase::PreStart;
    }

    /// Back to idle, forgetting any half-played hand. Cards go back into
    /// the deck; bets left on the table are not refunded.
    pub fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.clear_hand();
        self.hand_number = 0;
    }

    fn clear_hand(&mut self) {
        for card in self.board.drain(..) {
            self.deck.discard(card);
        }
        self.pots.clear();
        self.current_bettor = None;
        self.top_bettor = None;
        self.current_bet = 0;
    }

    /// Start a new hand: post blinds, deal hole cards and hand the action
    /// to the first player.
    ///
    /// `players` must hold at least two players with chips, in seat order;
    /// `dealer` indexes the button.
    pub fn begin_hand(&mut self, players: &mut [Player], dealer: usize, blinds: Blinds) -> Step {
        self.phase = Phase::PostingBlinds;
        self.clear_hand();
        for player in players.iter_mut() {
            for card in player.cards.drain(..) {
                self.deck.discard(card);
            }
            player.reset_for_hand();
        }
        self.deck.refill();

        let n = players.len();
        self.hand_number += 1;
        self.street = Street::PreFlop;
        self.dealer = dealer % n.max(1);
        self.big_blind = blinds.big;
        self.current_bet = blinds.big;
        self.min_raise = blinds.big;
        self.chips_in_play = players.iter().map(|p| p.cash).sum();
        log::info!(
            "hand #{} starting with {} players, blinds {}",
            self.hand_number,
            n,
            blinds
        );
        self.events.push_back(GameEvent::HandStarted {
            hand: self.hand_number,
            dealer: players[self.dealer].name.clone(),
            blinds,
        });

        // Heads-up the button posts the small blind.
        let sb = if n == 2 { self.dealer } else { (self.dealer + 1) % n };
        let bb = (sb + 1) % n;
        self.post_blind(&mut players[sb], blinds.small, false);
        self.post_blind(&mut players[bb], blinds.big, true);

        for _ in 0..HOLE_CARDS {
            for offset in 1..=n {
                let idx = (self.dealer + offset) % n;
                if let Some(card) = self.deck.draw() {
                    players[idx].cards.push(card);
                } else {
                    log::error!("deck ran out while dealing hole cards");
                }
            }
        }
        for player in players.iter() {
            self.events.push_back(GameEvent::HoleCards {
                name: player.name.clone(),
                cards: player.cards.clone(),
            });
        }

        let first = (bb + 1) % n;
        let actors: Vec<usize> = (0..n)
            .map(|offset| (first + offset) % n)
            .filter(|idx| players[*idx].can_act())
            .collect();
        match actors[..] {
            [] => self.close_street(players),
            [only] if players[only].bet >= self.current_bet => self.close_street(players),
            _ => {
                let first = actors[0];
                self.phase = Phase::Betting;
                self.current_bettor = Some(first);
                self.top_bettor = Some(first);
                self.announce_turn(players, first)
            }
        }
    }

    fn post_blind(&mut self, player: &mut Player, blind: Chips, big: bool) {
        let amount = player.commit_to(blind);
        self.events.push_back(GameEvent::BlindPosted {
            name: player.name.clone(),
            amount,
            big,
            all_in: player.all_in,
        });
    }

    fn announce_turn(&mut self, players: &[Player], idx: usize) -> Step {
        let player = &players[idx];
        log::debug!("turn passes to {}", player.name);
        self.events.push_back(GameEvent::Turn {
            name: player.name.clone(),
            to_call: self.current_bet.saturating_sub(player.bet),
            min_raise: self.min_raise,
            stack: player.cash,
        });
        Step::AwaitAction(player.name.clone())
    }

    /// Apply a betting decision from `name`.
    pub fn act(&mut self, players: &mut [Player], name: &Username, action: Action) -> Result<Step, GameError> {
        match self.phase {
            Phase::Betting => {}
            Phase::PostingBlinds | Phase::AdvancingStreet => return Err(GameError::StillProcessing),
            _ => return Err(GameError::NoActiveHand),
        }
        let idx = self.current_bettor.ok_or(GameError::NoActiveHand)?;
        if players.get(idx).is_none_or(|p| &p.name != name) {
            return Err(GameError::OutOfTurn);
        }

        let resolved = match action {
            Action::Fold => {
                self.fold(&mut players[idx]);
                ResolvedAction::Fold
            }
            Action::Check => {
                let to_call = self.current_bet.saturating_sub(players[idx].bet);
                if to_call > 0 {
                    return Err(GameError::CannotCheck { to_call });
                }
                ResolvedAction::Check
            }
            Action::Call => {
                if players[idx].bet >= self.current_bet {
                    ResolvedAction::Check
                } else {
                    self.bet_to(players, idx, self.current_bet, false)?
                }
            }
            Action::Bet(total) => self.bet_to(players, idx, total, true)?,
            Action::Raise(by) => self.bet_to(players, idx, self.current_bet.saturating_add(by), true)?,
            Action::AllIn => {
                let total = players[idx].bet + players[idx].cash;
                self.bet_to(players, idx, total, false)?
            }
        };
        log::debug!("{name} {resolved}");
        self.events.push_back(GameEvent::ActionTaken {
            name: name.clone(),
            action: resolved,
        });
        Ok(self.advance(players, idx))
    }

    /// Validate and commit a bet that brings the player's street total to
    /// `total`. With `raise` set the bet must be a full raise unless it puts
    /// the player all in. Nothing is mutated on error.
    fn bet_to(
        &mut self,
        players: &mut [Player],
        idx: usize,
        total: Chips,
        raise: bool,
    ) -> Result<ResolvedAction, GameError> {
        let player = &players[idx];
        let max_total = player.bet + player.cash;
        let all_in = total >= max_total;
        let total = total.min(max_total);

        if !all_in && total < self.current_bet {
            return Err(GameError::BetBelowCall {
                to_call: self.current_bet - player.bet,
            });
        }
        let raise_by = total.saturating_sub(self.current_bet);
        if (raise || raise_by > 0) && raise_by < self.min_raise && !all_in {
            return Err(GameError::RaiseTooSmall {
                min_total: self.current_bet + self.min_raise,
            });
        }

        let was_open = self.current_bet == 0;
        players[idx].commit_to(total);
        if raise_by > 0 {
            // A short all-in still reopens the action, but only a full
            // raise moves the minimum.
            self.min_raise = self.min_raise.max(raise_by);
            self.current_bet = total;
            self.top_bettor = Some(idx);
        }
        Ok(if all_in {
            ResolvedAction::AllIn(total)
        } else if raise_by == 0 {
            ResolvedAction::Call(total)
        } else if was_open {
            ResolvedAction::Bet(total)
        } else {
            ResolvedAction::Raise(total)
        })
    }

    fn fold(&mut self, player: &mut Player) {
        player.folded = true;
        self.pots.disqualify(&player.name);
    }

    fn contenders(players: &[Player]) -> usize {
        players.iter().filter(|p| !p.folded).count()
    }

    /// Move the action on after `from` acted.
    fn advance(&mut self, players: &mut [Player], from: usize) -> Step {
        if Self::contenders(players) <= 1 {
            return self.finish_uncontested(players);
        }
        match self.next_bettor(players, from) {
            Some(next) => {
                self.current_bettor = Some(next);
                self.announce_turn(players, next)
            }
            None => self.close_street(players),
        }
    }

    /// Next player after `from` who may act, or `None` once the walk comes
    /// back to the top bettor or to `from` itself, closing the street.
    #[must_use]
    pub fn next_bettor(&self, players: &[Player], from: usize) -> Option<usize> {
        let n = players.len();
        for step in 1..n {
            let idx = (from + step) % n;
            if Some(idx) == self.top_bettor {
                return None;
            }
            if players[idx].can_act() {
                return Some(idx);
            }
        }
        None
    }

    fn close_street(&mut self, players: &mut [Player]) -> Step {
        self.phase = Phase::AdvancingStreet;
        self.pots.add_bets_to_pot(players);
        self.current_bet = 0;
        self.min_raise = self.big_blind;
        self.current_bettor = None;
        self.top_bettor = None;

        if Self::contenders(players) <= 1 {
            return self.finish_uncontested(players);
        }
        if self.street == Street::River {
            return self.showdown(players);
        }
        let actors = players.iter().filter(|p| p.can_act()).count();
        if actors < 2 {
            self.phase = Phase::Showdown;
            self.emit_odds(players);
            return Step::RunOut;
        }

        self.deal_next_street();
        self.phase = Phase::Betting;
        let n = players.len();
        let first = (1..=n)
            .map(|offset| (self.dealer + offset) % n)
            .find(|idx| players[*idx].can_act());
        match first {
            Some(first) => {
                self.current_bettor = Some(first);
                self.top_bettor = Some(first);
                self.announce_turn(players, first)
            }
            None => self.close_street(players),
        }
    }

    fn deal_next_street(&mut self) {
        let Some(street) = self.street.next() else {
            return;
        };
        while self.board.len() < street.board_len() {
            match self.deck.draw() {
                Some(card) => self.board.push(card),
                None => {
                    log::error!("deck ran out while dealing the {street}");
                    break;
                }
            }
        }
        self.street = street;
        self.events.push_back(GameEvent::StreetRevealed {
            street,
            board: self.board.clone(),
        });
    }

    fn emit_odds(&mut self, players: &[Player]) {
        let live: Vec<&Player> = players.iter().filter(|p| !p.folded).collect();
        let hands: Vec<Vec<Card>> = live.iter().map(|p| p.cards.clone()).collect();
        let odds = self.oracle.odds(&hands, &self.board);
        self.events.push_back(GameEvent::Odds(
            live.iter().map(|p| p.name.clone()).zip(odds).collect(),
        ));
    }

    /// Deal the next street of an all-in run-out. Returns `None` when
    /// there is no run-out in progress.
    pub fn reveal_next(&mut self, players: &mut [Player]) -> Option<Step> {
        if self.phase != Phase::Showdown {
            return None;
        }
        self.deal_next_street();
        if self.street == Street::River {
            Some(self.showdown(players))
        } else {
            self.emit_odds(players);
            Some(Step::RunOut)
        }
    }

    /// Remove `name` from the hand as a fold, whether or not it is their
    /// turn. Used when a player leaves the table.
    pub fn fold_out(&mut self, players: &mut [Player], name: &Username) -> Option<Step> {
        if !self.in_hand() {
            return None;
        }
        let idx = players.iter().position(|p| &p.name == name)?;
        if players[idx].folded {
            return None;
        }
        self.fold(&mut players[idx]);
        self.events.push_back(GameEvent::ActionTaken {
            name: name.clone(),
            action: ResolvedAction::Fold,
        });

        if Self::contenders(players) <= 1 {
            return Some(self.finish_uncontested(players));
        }
        if self.phase == Phase::Betting && self.current_bettor == Some(idx) {
            return Some(self.advance(players, idx));
        }
        None
    }

    /// The action an idle current bettor is forced into: check when free,
    /// fold otherwise.
    #[must_use]
    pub fn idle_action(&self, players: &[Player]) -> Option<Action> {
        let player = players.get(self.current_bettor?)?;
        Some(if player.bet >= self.current_bet {
            Action::Check
        } else {
            Action::Fold
        })
    }

    fn finish_uncontested(&mut self, players: &mut [Player]) -> Step {
        self.phase = Phase::Settling;
        self.pots.add_bets_to_pot(players);
        let tiers: Vec<Vec<Username>> = players
            .iter()
            .filter(|p| !p.folded)
            .map(|p| vec![p.name.clone()])
            .collect();
        Step::HandOver(self.settle(players, &tiers, false))
    }

    fn showdown(&mut self, players: &mut [Player]) -> Step {
        self.phase = Phase::Showdown;
        let n = players.len();
        let mut ranked: Vec<(HandValue, usize, Username)> = Vec::new();
        for offset in 1..=n {
            let idx = (self.dealer + offset) % n;
            let player = &mut players[idx];
            if player.folded {
                continue;
            }
            let value = self.oracle.rank(&player.cards, &self.board);
            player.best_hand = Some(value.clone());
            self.events.push_back(GameEvent::Showdown {
                name: player.name.clone(),
                cards: player.cards.clone(),
                hand: value.clone(),
            });
            ranked.push((value, offset, player.name.clone()));
        }
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut tiers: Vec<Vec<Username>> = Vec::new();
        let mut last: Option<HandValue> = None;
        for (value, _, name) in ranked {
            match (&last, tiers.last_mut()) {
                (Some(prev), Some(tier)) if *prev == value => tier.push(name),
                _ => tiers.push(vec![name]),
            }
            last = Some(value);
        }

        self.phase = Phase::Settling;
        Step::HandOver(self.settle(players, &tiers, true))
    }

    fn settle(&mut self, players: &mut [Player], tiers: &[Vec<Username>], showdown: bool) -> HandSummary {
        let awards = self.pots.settle(tiers);
        for award in &awards {
            for (name, amount) in &award.shares {
                if let Some(player) = players.iter_mut().find(|p| &p.name == name) {
                    player.cash += amount;
                }
            }
            self.events.push_back(GameEvent::PotAwarded(award.clone()));
        }
        self.events.push_back(GameEvent::StackUpdate(
            players
                .iter()
                .map(|p| (p.name.clone(), p.cash, p.net_change()))
                .collect(),
        ));

        let accounted = self.chips_accounted(players);
        if accounted != self.chips_in_play {
            log::error!(
                "hand #{} settled {} chips but {} were in play",
                self.hand_number,
                accounted,
                self.chips_in_play
            );
        }
        debug_assert_eq!(accounted, self.chips_in_play);

        for player in players.iter_mut() {
            for card in player.cards.drain(..) {
                self.deck.discard(card);
            }
        }
        for card in self.board.drain(..) {
            self.deck.discard(card);
        }
        self.current_bettor = None;
        self.top_bettor = None;
        log::info!("hand #{} settled", self.hand_number);
        HandSummary {
            hand: self.hand_number,
            awards,
            showdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{functional::StandardOracle, stats::PlayerStats};

    fn table(stacks: &[Chips]) -> Vec<Player> {
        let names = ["a", "b", "c", "d", "e", "f"];
        stacks
            .iter()
            .enumerate()
            .map(|(seat, cash)| Player::new(names[seat].into(), seat, *cash, PlayerStats::default()))
            .collect()
    }

    fn round() -> Round {
        Round::new(Deck::with_seed(1, 99), Arc::new(StandardOracle::default()))
    }

    const BLINDS: Blinds = Blinds { small: 5, big: 10 };

    fn name(s: &str) -> Username {
        Username::new(s)
    }

    #[test]
    fn test_begin_hand_posts_blinds_and_deals() {
        let mut players = table(&[1000, 1000, 1000, 1000]);
        let mut round = round();
        let step = round.begin_hand(&mut players, 0, BLINDS);

        // Dealer a, b small, c big, d first.
        assert_eq!(step, Step::AwaitAction(name("d")));
        assert_eq!(players[1].bet, 5);
        assert_eq!(players[2].bet, 10);
        assert!(players.iter().all(|p| p.cards.len() == 2));
        assert_eq!(round.phase(), Phase::Betting);
        assert_eq!(round.current_bet(), 10);
    }

    #[test]
    fn test_heads_up_dealer_posts_small_and_acts_first() {
        let mut players = table(&[500, 500]);
        let mut round = round();
        let step = round.begin_hand(&mut players, 1, BLINDS);
        assert_eq!(players[1].bet, 5);
        assert_eq!(players[0].bet, 10);
        assert_eq!(step, Step::AwaitAction(name("b")));
    }

    #[test]
    fn test_short_big_blind_posts_all_in() {
        let mut players = table(&[1000, 1000, 15]);
        let mut round = round();
        round.begin_hand(&mut players, 0, Blinds { small: 10, big: 20 });
        assert_eq!(players[2].bet, 15);
        assert!(players[2].all_in);
        assert_eq!(round.current_bet(), 20);
    }

    #[test]
    fn test_out_of_turn_rejected_without_change() {
        let mut players = table(&[1000, 1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        let before = players.clone();
        let err = round.act(&mut players, &name("b"), Action::Call).unwrap_err();
        assert_eq!(err, GameError::OutOfTurn);
        assert_eq!(players, before);
    }

    #[test]
    fn test_bet_validation() {
        let mut players = table(&[1000, 1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        let a = name("a");

        assert_eq!(
            round.act(&mut players, &a, Action::Bet(8)),
            Err(GameError::BetBelowCall { to_call: 10 })
        );
        assert_eq!(
            round.act(&mut players, &a, Action::Bet(15)),
            Err(GameError::RaiseTooSmall { min_total: 20 })
        );
        assert_eq!(
            round.act(&mut players, &a, Action::Check),
            Err(GameError::CannotCheck { to_call: 10 })
        );
        // Matching the bet is a call, not a bet.
        assert_eq!(
            round.act(&mut players, &a, Action::Bet(10)),
            Err(GameError::RaiseTooSmall { min_total: 20 })
        );
        assert_eq!(
            round.act(&mut players, &a, Action::Raise(0)),
            Err(GameError::RaiseTooSmall { min_total: 20 })
        );
        assert!(round.act(&mut players, &a, Action::Raise(20)).is_ok());
        assert_eq!(round.current_bet(), 30);
        assert_eq!(round.min_raise(), 20);
    }

    #[test]
    fn test_bet_beyond_stack_clamps_to_all_in() {
        let mut players = table(&[100, 1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        round.act(&mut players, &name("a"), Action::Bet(5000)).unwrap();
        assert!(players[0].all_in);
        assert_eq!(players[0].bet, 100);
        assert_eq!(round.current_bet(), 100);
    }

    #[test]
    fn test_everyone_folds_to_big_blind() {
        let mut players = table(&[1000, 1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        round.act(&mut players, &name("a"), Action::Fold).unwrap();
        let step = round.act(&mut players, &name("b"), Action::Fold).unwrap();
        let Step::HandOver(summary) = step else {
            panic!("expected hand over, got {step:?}");
        };
        assert!(!summary.showdown);
        assert_eq!(players[2].cash, 1005);
        assert_eq!(round.phase(), Phase::Settling);
    }

    #[test]
    fn test_big_blind_gets_option_after_limps() {
        let mut players = table(&[1000, 1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        round.act(&mut players, &name("a"), Action::Call).unwrap();
        let step = round.act(&mut players, &name("b"), Action::Call).unwrap();
        assert_eq!(step, Step::AwaitAction(name("c")));
        let step = round.act(&mut players, &name("c"), Action::Check).unwrap();
        // Flop: first live player left of the button.
        assert_eq!(step, Step::AwaitAction(name("b")));
        assert_eq!(round.street(), Street::Flop);
        assert_eq!(round.board().len(), 3);
        assert_eq!(round.pots().total(), 30);
    }

    #[test]
    fn test_action_during_transient_phase() {
        let mut players = table(&[1000, 1000]);
        let mut round = round();
        assert_eq!(
            round.act(&mut players, &name("a"), Action::Check),
            Err(GameError::NoActiveHand)
        );
        round.phase = Phase::AdvancingStreet;
        assert_eq!(
            round.act(&mut players, &name("a"), Action::Check),
            Err(GameError::StillProcessing)
        );
    }

    #[test]
    fn test_all_in_call_runs_out_the_board() {
        let mut players = table(&[300, 300]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        round.act(&mut players, &name("a"), Action::AllIn).unwrap();
        let step = round.act(&mut players, &name("b"), Action::Call).unwrap();
        assert_eq!(step, Step::RunOut);
        assert_eq!(round.phase(), Phase::Showdown);

        let mut reveals = 0;
        let summary = loop {
            match round.reveal_next(&mut players) {
                Some(Step::RunOut) => reveals += 1,
                Some(Step::HandOver(summary)) => break summary,
                other => panic!("unexpected {other:?}"),
            }
        };
        assert_eq!(reveals, 2);
        assert!(summary.showdown);
        assert_eq!(players[0].cash + players[1].cash, 600);
        assert_eq!(round.reveal_next(&mut players), None);
    }

    #[test]
    fn test_fold_out_of_waiting_player() {
        let mut players = table(&[1000, 1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        // c leaves while a is to act; the hand goes on.
        assert_eq!(round.fold_out(&mut players, &name("c")), None);
        assert!(players[2].folded);
        round.act(&mut players, &name("a"), Action::Call).unwrap();
        let step = round.act(&mut players, &name("b"), Action::Call).unwrap();
        assert_eq!(step, Step::AwaitAction(name("b")));
        assert_eq!(round.street(), Street::Flop);
        assert_eq!(round.pots().pots()[0].eligible.len(), 2);
    }

    #[test]
    fn test_idle_action_checks_when_free() {
        let mut players = table(&[1000, 1000]);
        let mut round = round();
        round.begin_hand(&mut players, 0, BLINDS);
        assert_eq!(round.idle_action(&players), Some(Action::Fold));
        round.act(&mut players, &name("a"), Action::Call).unwrap();
        assert_eq!(round.idle_action(&players), Some(Action::Check));
    }
}
