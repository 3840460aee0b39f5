//! Who is still in, who is out, and in what order they went.

use std::collections::{HashSet, VecDeque};

use crate::game::{
    entities::{Chips, Player, SeatIndex, Username},
    errors::GameError,
    stats::PlayerStats,
};

use super::models::{Elimination, TournamentOutcome, TournamentState};

/// Cancellation vote count after a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub votes: usize,
    pub needed: usize,
    /// The voter had already voted; nothing changed.
    pub repeat: bool,
}

impl VoteTally {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.votes >= self.needed
    }
}

#[derive(Debug)]
pub struct TournamentLedger {
    state: TournamentState,
    /// Seat order
    active: Vec<Player>,
    /// Most recent elimination first
    eliminated: VecDeque<Username>,
    /// Players as they were when the tournament began
    roster: Vec<Player>,
    /// Players who walked away since the tournament began
    departed: HashSet<Username>,
    starting_stack: Chips,
    hands_played: u32,
    next_seat: SeatIndex,
}

impl TournamentLedger {
    #[must_use]
    pub fn new(starting_stack: Chips) -> Self {
        Self {
            state: TournamentState::Registering,
            active: Vec::new(),
            eliminated: VecDeque::new(),
            roster: Vec::new(),
            departed: HashSet::new(),
            starting_stack,
            hands_played: 0,
            next_seat: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> TournamentState {
        self.state
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.active
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.active
    }

    #[must_use]
    pub fn player(&self, name: &Username) -> Option<&Player> {
        self.active.iter().find(|p| &p.name == name)
    }

    #[must_use]
    pub fn eliminated(&self) -> &VecDeque<Username> {
        &self.eliminated
    }

    #[must_use]
    pub fn hands_played(&self) -> u32 {
        self.hands_played
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Seat a new player with the starting stack.
    pub fn register(&mut self, name: Username, stats: PlayerStats, max_players: usize) -> Result<&Player, GameError> {
        if self.state == TournamentState::Running {
            return Err(GameError::RegistrationClosed);
        }
        if self.player(&name).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        if self.active.len() >= max_players {
            return Err(GameError::TableFull);
        }
        let seat = self.next_seat;
        self.next_seat += 1;
        self.active.push(Player::new(name, seat, self.starting_stack, stats));
        let idx = self.active.len() - 1;
        Ok(&self.active[idx])
    }

    /// Take a player off the table. Before the tournament runs the player
    /// is removed on the spot and returned; while it runs they are only
    /// flagged and go out with the next [`close_hand`](Self::close_hand).
    pub fn remove(&mut self, name: &Username) -> Result<Option<Player>, GameError> {
        let idx = self
            .active
            .iter()
            .position(|p| &p.name == name && !p.has_quit)
            .ok_or(GameError::NotPlaying)?;
        if self.state == TournamentState::Running {
            self.active[idx].has_quit = true;
            self.departed.insert(name.clone());
            Ok(None)
        } else {
            Ok(Some(self.active.remove(idx)))
        }
    }

    pub fn schedule_start(&mut self) -> Result<(), GameError> {
        match self.state {
            TournamentState::Registering => {
                self.state = TournamentState::Starting;
                Ok(())
            }
            TournamentState::Starting => Err(GameError::AlreadyStarting),
            TournamentState::Running => Err(GameError::AlreadyInProgress),
        }
    }

    /// Abandon a scheduled start. Seated players stay seated.
    pub fn cancel_start(&mut self) {
        if self.state == TournamentState::Starting {
            self.state = TournamentState::Registering;
        }
        self.clear_votes();
    }

    /// Move to running: everyone gets the starting stack and per-game
    /// flags are cleared.
    pub fn begin(&mut self) -> Result<(), GameError> {
        if self.state == TournamentState::Running {
            return Err(GameError::AlreadyInProgress);
        }
        for player in &mut self.active {
            player.cash = self.starting_stack;
            player.reset_for_hand();
            player.has_quit = false;
            player.cancel_vote = false;
        }
        self.state = TournamentState::Running;
        self.roster = self.active.clone();
        self.departed.clear();
        self.eliminated.clear();
        self.hands_played = 0;
        Ok(())
    }

    /// Count a finished hand and move every busted or departed player to
    /// the front of the elimination list.
    ///
    /// Players going out in the same hand are ordered by the stack they
    /// started it with, so the bigger stack places higher. Departures place
    /// below busts.
    pub fn close_hand(&mut self) -> Vec<(Player, Elimination)> {
        self.hands_played += 1;
        self.sweep_eliminations()
    }

    /// Eliminate busted or departed players without counting a hand, for
    /// departures between hands.
    pub fn sweep_eliminations(&mut self) -> Vec<(Player, Elimination)> {
        let mut out: Vec<Player> = Vec::new();
        let mut idx = 0;
        while idx < self.active.len() {
            if self.active[idx].cash == 0 || self.active[idx].has_quit {
                out.push(self.active.remove(idx));
            } else {
                idx += 1;
            }
        }
        out.sort_by_key(|p| (!p.has_quit, p.hand_start_cash));

        let alive_before = self.active.len() + out.len();
        out.into_iter()
            .enumerate()
            .map(|(i, player)| {
                self.eliminated.push_front(player.name.clone());
                let placement = alive_before - i;
                let elimination = Elimination {
                    name: player.name.clone(),
                    placement,
                };
                (player, elimination)
            })
            .collect()
    }

    /// `Some` once at most one player is left.
    #[must_use]
    pub fn outcome(&self) -> Option<TournamentOutcome> {
        match &self.active[..] {
            [] => Some(TournamentOutcome::Void),
            [winner] => Some(TournamentOutcome::Winner(winner.name.clone())),
            _ => None,
        }
    }

    /// Finishing order, first place first. Only complete once the
    /// tournament has an outcome.
    #[must_use]
    pub fn standings(&self) -> Vec<Username> {
        self.active
            .iter()
            .map(|p| p.name.clone())
            .chain(self.eliminated.iter().cloned())
            .collect()
    }

    /// Close the books on a finished tournament. Returns whoever is still
    /// seated, and empties the table.
    pub fn finish(&mut self) -> Vec<Player> {
        self.state = TournamentState::Registering;
        self.eliminated.clear();
        self.roster.clear();
        self.departed.clear();
        self.hands_played = 0;
        self.active.drain(..).collect()
    }

    /// Call off the tournament. A running tournament is rolled back to its
    /// starting roster, minus anyone who left, with starting stacks.
    pub fn abort(&mut self) {
        if self.state == TournamentState::Running {
            let departed = std::mem::take(&mut self.departed);
            self.active = std::mem::take(&mut self.roster)
                .into_iter()
                .filter(|p| !departed.contains(&p.name))
                .collect();
            for player in &mut self.active {
                player.cash = self.starting_stack;
                player.reset_for_hand();
            }
        }
        self.state = TournamentState::Registering;
        self.eliminated.clear();
        self.hands_played = 0;
        self.clear_votes();
    }

    /// Register a cancellation vote from `name`.
    pub fn cast_vote(&mut self, name: &Username) -> Result<VoteTally, GameError> {
        if self.state == TournamentState::Registering {
            return Err(GameError::NothingToCancel);
        }
        let player = self
            .active
            .iter_mut()
            .find(|p| &p.name == name && !p.has_quit)
            .ok_or(GameError::NotPlaying)?;
        let repeat = player.cancel_vote;
        player.cancel_vote = true;

        let (votes, needed) = self.count_votes();
        Ok(VoteTally {
            votes,
            needed,
            repeat,
        })
    }

    /// Votes against the pending or running tournament, if there is one.
    #[must_use]
    pub fn vote_tally(&self) -> Option<VoteTally> {
        if self.state == TournamentState::Registering {
            return None;
        }
        let (votes, needed) = self.count_votes();
        Some(VoteTally {
            votes,
            needed,
            repeat: false,
        })
    }

    /// Cast votes and voters among players still seated.
    fn count_votes(&self) -> (usize, usize) {
        self.active
            .iter()
            .filter(|p| !p.has_quit)
            .fold((0, 0), |(votes, needed), p| {
                (votes + usize::from(p.cancel_vote), needed + 1)
            })
    }

    pub fn clear_votes(&mut self) {
        for player in &mut self.active {
            player.cancel_vote = false;
        }
    }

    /// Seat index (into [`players`](Self::players)) of the first player
    /// whose seat number follows `seat`, wrapping around.
    #[must_use]
    pub fn next_seat_after(&self, seat: Option<SeatIndex>) -> Option<usize> {
        let Some(seat) = seat else {
            return (!self.active.is_empty()).then_some(0);
        };
        self.active
            .iter()
            .position(|p| p.seat > seat)
            .or_else(|| (!self.active.is_empty()).then_some(0))
    }
}
