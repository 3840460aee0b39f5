//! Synchronous table orchestrator.
//!
//! [`TableEngine`] owns every piece of mutable table state: the tournament
//! ledger, the blind schedule and the round in progress. Each entry point
//! runs to completion without waiting. Side effects the engine cannot
//! perform itself (timers, persistence) are queued as [`Effect`]s for the
//! caller, alongside the [`GameEvent`]s for display.

use chrono::{DateTime, Utc};
use std::{collections::VecDeque, sync::Arc, time::Duration};
use uuid::Uuid;

use crate::game::{
    entities::{Action, Deck, Player, Username},
    errors::{GameError, parse_amount},
    events::{CancelReason, GameEvent},
    functional::HandOracle,
    state_machine::{HandSummary, Round, Step},
    stats::{PlayerStats, StatLine},
};
use crate::tournament::{
    BlindSchedule, Elimination, FinalStandings, TournamentId, TournamentLedger, TournamentOutcome,
    TournamentState,
};

use super::{
    config::TableConfig,
    messages::{Command, SeatView, TableSnapshot},
    scheduler::{TimerFired, TimerKind, TimerTarget},
};

/// Work the engine hands back to its driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Schedule {
        kind: TimerKind,
        target: TimerTarget,
        delay: Duration,
    },
    Cancel(TimerKind),
    /// Start the idle warning and idle-out pair for the player to act.
    ArmIdle {
        player: Username,
        warning: Duration,
        timeout: Duration,
    },
    CancelIdle,
    CancelAll,
    SavePlayer(StatLine),
    RecordTournament(FinalStandings),
}

/// Outcome text for the issuing player, or why nothing happened.
pub type CommandResult = Result<Option<String>, GameError>;

pub struct TableEngine {
    config: TableConfig,
    ledger: TournamentLedger,
    round: Round,
    blinds: BlindSchedule,
    /// Seat number holding the button
    dealer_seat: Option<usize>,
    events: VecDeque<GameEvent>,
    effects: VecDeque<Effect>,
    tournament_id: Option<TournamentId>,
    started_at: Option<DateTime<Utc>>,
}

impl TableEngine {
    pub fn new(config: TableConfig, oracle: Arc<dyn HandOracle>) -> Self {
        let deck = Deck::new(config.num_decks);
        Self::with_deck(config, deck, oracle)
    }

    pub fn with_deck(config: TableConfig, deck: Deck, oracle: Arc<dyn HandOracle>) -> Self {
        Self {
            ledger: TournamentLedger::new(config.starting_stack),
            blinds: BlindSchedule::new(
                config.min_bet,
                config.blind_doubling_hands,
                config.double_on_elimination,
            ),
            round: Round::new(deck, oracle),
            dealer_seat: None,
            events: VecDeque::new(),
            effects: VecDeque::new(),
            tournament_id: None,
            started_at: None,
            config,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn ledger(&self) -> &TournamentLedger {
        &self.ledger
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn blinds(&self) -> &BlindSchedule {
        &self.blinds
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.extend(self.round.drain_events());
        self.events.drain(..)
    }

    pub fn drain_effects(&mut self) -> impl Iterator<Item = Effect> + '_ {
        self.effects.drain(..)
    }

    /// Flush round events into the table queue so ordering is kept.
    fn sync_events(&mut self) {
        self.events.extend(self.round.drain_events());
    }

    fn emit(&mut self, event: GameEvent) {
        self.sync_events();
        self.events.push_back(event);
    }

    fn save(&mut self, player: &Player) {
        self.effects.push_back(Effect::SavePlayer(
            player.stats.to_line(player.name.as_str(), player.cash),
        ));
    }

    fn schedule(&mut self, kind: TimerKind, target: TimerTarget, delay: Duration) {
        self.effects.push_back(Effect::Schedule {
            kind,
            target,
            delay,
        });
    }

    fn cancel_idle(&mut self) {
        self.effects.push_back(Effect::CancelIdle);
    }

    /// Dispatch a channel command from `actor`.
    pub fn handle(&mut self, actor: &Username, command: Command) -> CommandResult {
        match command {
            Command::Join => self.join(actor, PlayerStats::default()),
            Command::Leave => self.leave(actor),
            Command::Start => self.start(actor),
            Command::Stop => self.vote_cancel(actor),
            Command::Bet(amount) => self.act(actor, Action::Bet(parse_amount(&amount)?)),
            Command::Raise(amount) => self.act(actor, Action::Raise(parse_amount(&amount)?)),
            Command::Call => self.act(actor, Action::Call),
            Command::Check => self.act(actor, Action::Check),
            Command::Fold => self.act(actor, Action::Fold),
            Command::AllIn => self.act(actor, Action::AllIn),
            Command::ForceStart => self.force_start(),
            Command::ForceFold => self.force_action(false),
            Command::ForceCheck => self.force_action(true),
            Command::ForceStop => self.force_stop(),
        }
    }

    /// Seat `name`, with statistics loaded by the caller.
    pub fn join(&mut self, name: &Username, stats: PlayerStats) -> CommandResult {
        let player = self
            .ledger
            .register(name.clone(), stats, self.config.max_players)?;
        let event = GameEvent::Joined {
            name: player.name.clone(),
            seat: player.seat,
            stack: player.cash,
        };
        log::info!("{} joined {}", name, self.config.name);
        self.emit(event);
        Ok(None)
    }

    pub fn leave(&mut self, name: &Username) -> CommandResult {
        let removed = self.ledger.remove(name)?;
        self.emit(GameEvent::Left(name.clone()));
        log::info!("{} left {}", name, self.config.name);

        if let Some(player) = &removed {
            self.save(player);
            if self.ledger.state() == TournamentState::Starting && self.ledger.len() < self.config.min_players {
                self.effects.push_back(Effect::Cancel(TimerKind::StartRound));
                self.ledger.cancel_start();
                self.round.reset();
                self.emit(GameEvent::TournamentCancelled(CancelReason::NotEnoughPlayers));
                return Ok(None);
            }
        }

        // The leaver may have been the last player yet to vote.
        if self
            .ledger
            .vote_tally()
            .is_some_and(|tally| tally.votes > 0 && tally.passed())
        {
            self.abort(CancelReason::Vote);
            return Ok(None);
        }
        if removed.is_some() {
            return Ok(None);
        }

        // Running: a leaver is folded on the spot and goes out after the hand.
        if self.round.in_hand() {
            if let Some(step) = self.round.fold_out(self.ledger.players_mut(), name) {
                self.handle_step(step);
            }
        } else {
            let eliminations = self.ledger.sweep_eliminations();
            self.record_eliminations(eliminations);
            self.check_outcome();
        }
        Ok(None)
    }

    /// Schedule the tournament start after the configured delay.
    pub fn start(&mut self, name: &Username) -> CommandResult {
        if self.ledger.player(name).is_none() {
            return Err(GameError::NotPlaying);
        }
        match self.ledger.state() {
            TournamentState::Starting => return Err(GameError::AlreadyStarting),
            TournamentState::Running => return Err(GameError::AlreadyInProgress),
            TournamentState::Registering => {}
        }
        if self.ledger.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                min: self.config.min_players,
            });
        }
        self.ledger.schedule_start()?;
        self.round.pre_start();
        self.schedule(TimerKind::StartRound, TimerTarget::Table, self.config.start_delay());
        self.emit(GameEvent::StartScheduled {
            delay_secs: self.config.start_delay_secs,
            players: self.ledger.len(),
        });
        Ok(None)
    }

    /// Start right away, whether or not a start is pending.
    pub fn force_start(&mut self) -> CommandResult {
        if self.ledger.state() == TournamentState::Running {
            return Err(GameError::AlreadyInProgress);
        }
        if self.ledger.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                min: self.config.min_players,
            });
        }
        self.effects.push_back(Effect::Cancel(TimerKind::StartRound));
        self.start_tournament()?;
        Ok(None)
    }

    pub fn vote_cancel(&mut self, name: &Username) -> CommandResult {
        let tally = self.ledger.cast_vote(name)?;
        if tally.repeat {
            return Ok(Some(format!(
                "you already voted ({}/{})",
                tally.votes, tally.needed
            )));
        }
        self.emit(GameEvent::VoteCast {
            name: name.clone(),
            votes: tally.votes,
            needed: tally.needed,
        });
        if tally.passed() {
            self.abort(CancelReason::Vote);
        }
        Ok(None)
    }

    pub fn force_stop(&mut self) -> CommandResult {
        if self.ledger.state() == TournamentState::Registering {
            return Err(GameError::NothingToCancel);
        }
        self.abort(CancelReason::Operator);
        Ok(None)
    }

    fn abort(&mut self, reason: CancelReason) {
        log::info!("tournament on {} cancelled: {:?}", self.config.name, reason);
        self.effects.push_back(Effect::CancelAll);
        self.round.reset();
        self.ledger.abort();
        self.blinds.reset();
        self.dealer_seat = None;
        self.tournament_id = None;
        self.started_at = None;
        self.emit(GameEvent::TournamentCancelled(reason));
    }

    /// Apply a betting action from `name`.
    pub fn act(&mut self, name: &Username, action: Action) -> CommandResult {
        if self.ledger.player(name).is_none_or(|p| p.has_quit) {
            return Err(GameError::NotPlaying);
        }
        let step = self.round.act(self.ledger.players_mut(), name, action)?;
        self.handle_step(step);
        Ok(None)
    }

    /// Operator fold or check on whoever holds the turn.
    fn force_action(&mut self, check: bool) -> CommandResult {
        let players = self.ledger.players();
        let name = self
            .round
            .current_bettor(players)
            .cloned()
            .ok_or(GameError::NoActiveHand)?;
        let action = if check {
            self.round.idle_action(players).unwrap_or(Action::Fold)
        } else {
            Action::Fold
        };
        self.act(&name, action)
    }

    /// React to a timer the driver has already claimed from its scheduler.
    pub fn on_timer(&mut self, fired: &TimerFired) {
        log::debug!("timer {:?} fired on {}", fired.kind, self.config.name);
        match fired.kind {
            TimerKind::StartRound => match self.ledger.state() {
                TournamentState::Starting => {
                    if self.ledger.len() < self.config.min_players {
                        self.ledger.cancel_start();
                        self.round.reset();
                        self.emit(GameEvent::TournamentCancelled(CancelReason::NotEnoughPlayers));
                    } else if let Err(err) = self.start_tournament() {
                        log::warn!("scheduled start failed: {err}");
                    }
                }
                TournamentState::Running if !self.round.in_hand() => self.start_hand(),
                _ => log::debug!("start timer ignored"),
            },
            TimerKind::Reveal => match self.round.reveal_next(self.ledger.players_mut()) {
                Some(step) => self.handle_step(step),
                None => log::debug!("reveal timer ignored, no run-out"),
            },
            TimerKind::IdleWarning | TimerKind::IdleOut => {
                let TimerTarget::Player(name) = &fired.target else {
                    return;
                };
                let current = self.round.current_bettor(self.ledger.players());
                if current != Some(name) {
                    log::debug!("idle timer for {name} ignored, turn has moved on");
                    return;
                }
                let name = name.clone();
                if fired.kind == TimerKind::IdleWarning {
                    let secs_left = self
                        .config
                        .idle_timeout_secs
                        .saturating_sub(self.config.idle_warning_secs);
                    self.emit(GameEvent::IdleWarning { name, secs_left });
                    return;
                }
                let Some(action) = self.round.idle_action(self.ledger.players()) else {
                    return;
                };
                self.emit(GameEvent::IdleOut(name.clone()));
                if let Err(err) = self.act(&name, action) {
                    log::debug!("idle-out of {name} rejected: {err}");
                }
            }
        }
    }

    fn handle_step(&mut self, step: Step) {
        match step {
            Step::AwaitAction(player) => {
                self.effects.push_back(Effect::ArmIdle {
                    player,
                    warning: self.config.idle_warning(),
                    timeout: self.config.idle_timeout(),
                });
            }
            Step::RunOut => {
                self.cancel_idle();
                self.schedule(TimerKind::Reveal, TimerTarget::Table, self.config.showdown_delay());
            }
            Step::HandOver(summary) => {
                self.cancel_idle();
                self.effects.push_back(Effect::Cancel(TimerKind::Reveal));
                self.finish_hand(&summary);
            }
        }
    }

    fn start_tournament(&mut self) -> Result<(), GameError> {
        self.ledger.begin()?;
        self.blinds = BlindSchedule::new(
            self.config.min_bet,
            self.config.blind_doubling_hands,
            self.config.double_on_elimination,
        );
        self.round.reset();
        self.dealer_seat = None;
        self.tournament_id = Some(Uuid::new_v4());
        self.started_at = Some(Utc::now());

        let players: Vec<Player> = self
            .ledger
            .players_mut()
            .iter_mut()
            .map(|p| {
                p.stats.tournaments_played += 1;
                p.clone()
            })
            .collect();
        for player in &players {
            self.save(player);
        }
        log::info!(
            "tournament started on {} with {} players",
            self.config.name,
            players.len()
        );
        self.emit(GameEvent::TournamentStarted {
            players: players.len(),
            stack: self.config.starting_stack,
            blinds: self.blinds.current(),
        });
        self.start_hand();
        Ok(())
    }

    fn start_hand(&mut self) {
        if self.ledger.len() < 2 {
            self.check_outcome();
            return;
        }
        let Some(dealer) = self.ledger.next_seat_after(self.dealer_seat) else {
            return;
        };
        self.dealer_seat = Some(self.ledger.players()[dealer].seat);
        let blinds = self.blinds.current();
        let step = self.round.begin_hand(self.ledger.players_mut(), dealer, blinds);
        self.handle_step(step);
    }

    fn finish_hand(&mut self, summary: &HandSummary) {
        log::debug!(
            "hand #{} over with {} pots",
            summary.hand,
            summary.awards.len()
        );
        let players: Vec<Player> = self.ledger.players().to_vec();
        for player in &players {
            self.save(player);
        }

        let eliminations = self.ledger.close_hand();
        // Walking away is not a bankruptcy.
        let busted = eliminations
            .iter()
            .filter(|(player, _)| player.cash == 0 && !player.has_quit)
            .count();
        self.record_eliminations(eliminations);
        if let Some(blinds) = self.blinds.record_hand(busted) {
            self.emit(GameEvent::BlindsRaised(blinds));
        }

        if !self.check_outcome() {
            self.schedule(TimerKind::StartRound, TimerTarget::Table, self.config.hand_delay());
        }
    }

    fn record_eliminations(&mut self, eliminations: Vec<(Player, Elimination)>) {
        for (player, elimination) in eliminations {
            log::info!(
                "{} eliminated in place {}",
                elimination.name,
                elimination.placement
            );
            self.save(&player);
            self.emit(GameEvent::Eliminated {
                name: elimination.name,
                placement: elimination.placement,
            });
        }
    }

    /// End the tournament if it is decided. Returns whether it ended.
    fn check_outcome(&mut self) -> bool {
        if self.ledger.state() != TournamentState::Running {
            return false;
        }
        let Some(outcome) = self.ledger.outcome() else {
            return false;
        };
        self.effects.push_back(Effect::CancelAll);

        let hands = self.ledger.hands_played();
        let winner = match outcome {
            TournamentOutcome::Winner(name) => {
                if let Some(player) = self
                    .ledger
                    .players_mut()
                    .iter_mut()
                    .find(|p| p.name == name)
                {
                    player.stats.tournaments_won += 1;
                }
                log::info!("{} wins on {} after {} hands", name, self.config.name, hands);
                self.emit(GameEvent::Winner {
                    name: name.clone(),
                    hands,
                });
                Some(name)
            }
            TournamentOutcome::Void => {
                log::info!("tournament on {} ended without a winner", self.config.name);
                self.emit(GameEvent::TournamentVoid);
                None
            }
        };

        let finished_at = Utc::now();
        let standings = FinalStandings {
            id: self.tournament_id.take().unwrap_or_else(Uuid::new_v4),
            table: self.config.name.clone(),
            started_at: self.started_at.take().unwrap_or(finished_at),
            finished_at,
            hands_played: hands,
            winner,
            placements: self.ledger.standings(),
        };
        for player in self.ledger.finish() {
            self.save(&player);
        }
        self.effects.push_back(Effect::RecordTournament(standings));
        self.round.reset();
        self.blinds.reset();
        self.dealer_seat = None;
        true
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let players = self.ledger.players();
        TableSnapshot {
            name: self.config.name.clone(),
            state: self.ledger.state(),
            phase: self.round.phase(),
            street: self.round.street(),
            hand_number: self.round.hand_number(),
            board: self.round.board().to_vec(),
            pots: self.round.pots().pots().to_vec(),
            blinds: self.blinds.current(),
            current_bettor: self.round.current_bettor(players).cloned(),
            current_bet: self.round.current_bet(),
            players: players
                .iter()
                .map(|p| SeatView {
                    name: p.name.clone(),
                    seat: p.seat,
                    cash: p.cash,
                    bet: p.bet,
                    folded: p.folded,
                    all_in: p.all_in,
                    has_quit: p.has_quit,
                    cancel_vote: p.cancel_vote,
                })
                .collect(),
            eliminated: self.ledger.eliminated().iter().cloned().collect(),
        }
    }
}
