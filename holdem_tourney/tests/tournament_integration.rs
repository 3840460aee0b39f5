//! Tournament flow integration tests
//!
//! These drive the synchronous table engine through whole hands and whole
//! tournaments, standing in for the actor by firing timers by hand:
//! - Simultaneous eliminations and the single blind bump they cause
//! - Placements and final standings
//! - Blind escalation properties
//! - Elimination ordering in the ledger

use holdem_tourney::{
    game::{
        Action, Card, Deck, GameEvent, HandOracle, HandValue, PlayerStats, StandardOracle, Username,
        functional::{Odds, Rank},
    },
    table::{Effect, TableConfig, TableEngine, TimerFired, TimerKind, TimerTarget},
    tournament::{BlindSchedule, FinalStandings, TournamentLedger, TournamentState, blind_level},
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

/// Oracle that crowns whoever holds a chosen pair of hole cards.
#[derive(Default)]
struct RiggedOracle {
    favourite: Mutex<Vec<Card>>,
}

impl RiggedOracle {
    fn favour(&self, cards: &[Card]) {
        *self.favourite.lock().unwrap() = cards.to_vec();
    }
}

impl HandOracle for RiggedOracle {
    fn rank(&self, hole: &[Card], _board: &[Card]) -> HandValue {
        let favourite = self.favourite.lock().unwrap();
        if hole == favourite.as_slice() {
            HandValue {
                rank: Rank::StraightFlush,
                values: vec![14],
            }
        } else {
            HandValue {
                rank: Rank::HighCard,
                values: vec![7],
            }
        }
    }

    fn odds(&self, hands: &[Vec<Card>], _board: &[Card]) -> Vec<Odds> {
        vec![Odds::default(); hands.len()]
    }
}

fn config() -> TableConfig {
    TableConfig {
        name: "#tourney".to_string(),
        blind_doubling_hands: 100,
        ..Default::default()
    }
}

fn engine_with(oracle: Arc<dyn HandOracle>, names: &[&str]) -> TableEngine {
    let mut engine = TableEngine::with_deck(config(), Deck::with_seed(1, 77), oracle);
    for name in names {
        engine.join(&Username::new(name), PlayerStats::default()).unwrap();
    }
    engine
}

fn table_timer(kind: TimerKind) -> TimerFired {
    TimerFired {
        kind,
        target: TimerTarget::Table,
        generation: 0,
    }
}

fn current(engine: &TableEngine) -> Option<Username> {
    engine.round().current_bettor(engine.ledger().players()).cloned()
}

#[test]
fn test_two_eliminations_in_one_hand_bump_blinds_once() {
    let oracle = Arc::new(RiggedOracle::default());
    let mut engine = engine_with(oracle.clone(), &["a", "b", "c", "d", "e"]);
    engine.force_start().unwrap();
    engine.drain_events().for_each(drop);

    // a has the button, b and c post, d opens.
    assert_eq!(current(&engine), Some(Username::new("d")));
    let d_cards = engine.ledger().player(&"d".into()).unwrap().cards.clone();
    oracle.favour(&d_cards);

    engine.act(&"d".into(), Action::AllIn).unwrap();
    engine.act(&"e".into(), Action::Call).unwrap();
    engine.act(&"a".into(), Action::Fold).unwrap();
    engine.act(&"b".into(), Action::Fold).unwrap();
    engine.act(&"c".into(), Action::Call).unwrap();

    for _ in 0..3 {
        engine.on_timer(&table_timer(TimerKind::Reveal));
    }

    let events: Vec<GameEvent> = engine.drain_events().collect();
    let eliminated: Vec<(Username, usize)> = events
        .iter()
        .filter_map(|event| match event {
            GameEvent::Eliminated { name, placement } => Some((name.clone(), *placement)),
            _ => None,
        })
        .collect();
    assert_eq!(
        eliminated,
        vec![(Username::new("c"), 5), (Username::new("e"), 4)]
    );

    let raises: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, GameEvent::BlindsRaised(_)))
        .collect();
    assert_eq!(raises.len(), 1);
    assert_eq!(engine.blinds().current().big, 20);
    assert_eq!(engine.blinds().bumps(), 1);

    let stacks: Vec<u32> = engine.ledger().players().iter().map(|p| p.cash).collect();
    assert_eq!(stacks, vec![1000, 995, 3005]);
    assert_eq!(engine.ledger().eliminated().front(), Some(&Username::new("e")));

    // The next hand is dealt at the new level once the hand delay passes.
    engine.on_timer(&table_timer(TimerKind::StartRound));
    assert_eq!(engine.round().hand_number(), 2);
    assert_eq!(engine.round().current_bet(), 20);
}

#[test]
fn test_departure_alone_does_not_raise_blinds() {
    let mut engine = engine_with(Arc::new(StandardOracle::new(20)), &["a", "b", "c", "d"]);
    engine.force_start().unwrap();

    // a button, b small, c big, d first. b walks away mid-hand.
    engine.leave(&"b".into()).unwrap();
    while engine.round().in_hand() {
        let name = current(&engine).unwrap();
        engine.act(&name, Action::Fold).unwrap();
    }

    assert_eq!(engine.ledger().hands_played(), 1);
    assert_eq!(engine.ledger().eliminated().front(), Some(&Username::new("b")));
    assert_eq!(engine.blinds().bumps(), 0);
    assert_eq!(engine.blinds().current().big, 10);
    assert!(
        !engine
            .drain_events()
            .any(|event| matches!(event, GameEvent::BlindsRaised(_)))
    );

    engine.on_timer(&table_timer(TimerKind::StartRound));
    assert_eq!(engine.round().current_bet(), 10);
}

#[test]
fn test_leaving_player_places_below_simultaneous_bust() {
    let oracle = Arc::new(RiggedOracle::default());
    let mut engine = engine_with(oracle.clone(), &["a", "b", "c", "d"]);
    engine.force_start().unwrap();

    // a button, b small, c big, d first.
    let d_cards = engine.ledger().player(&"d".into()).unwrap().cards.clone();
    oracle.favour(&d_cards);
    engine.act(&"d".into(), Action::AllIn).unwrap();
    engine.act(&"a".into(), Action::Call).unwrap();
    engine.leave(&"b".into()).unwrap();
    engine.act(&"c".into(), Action::Fold).unwrap();
    for _ in 0..3 {
        engine.on_timer(&table_timer(TimerKind::Reveal));
    }

    let placements: Vec<(Username, usize)> = engine
        .drain_events()
        .filter_map(|event| match event {
            GameEvent::Eliminated { name, placement } => Some((name, placement)),
            _ => None,
        })
        .collect();
    assert_eq!(
        placements,
        vec![(Username::new("b"), 4), (Username::new("a"), 3)]
    );
}

/// Play with shoves and calls until the engine records a result.
fn play_out(engine: &mut TableEngine) -> Option<FinalStandings> {
    for step in 0..5000 {
        let effects: Vec<Effect> = engine.drain_effects().collect();
        engine.drain_events().for_each(drop);
        if let Some(standings) = effects.into_iter().find_map(|effect| match effect {
            Effect::RecordTournament(standings) => Some(standings),
            _ => None,
        }) {
            return Some(standings);
        }

        if let Some(name) = current(engine) {
            let action = if step % 3 == 0 { Action::AllIn } else { Action::Call };
            engine.act(&name, action).unwrap();
        } else if engine.round().in_hand() {
            engine.on_timer(&table_timer(TimerKind::Reveal));
        } else {
            engine.on_timer(&table_timer(TimerKind::StartRound));
        }
    }
    None
}

#[test]
fn test_full_tournament_produces_standings() {
    let mut engine = engine_with(Arc::new(StandardOracle::new(20)), &["ann", "bob", "cat", "dan"]);
    engine.force_start().unwrap();

    let standings = play_out(&mut engine).expect("tournament should finish");
    assert_eq!(standings.placements.len(), 4);
    assert_eq!(standings.winner.as_ref(), standings.placements.first());
    assert!(standings.hands_played >= 1);
    let mut names = standings.placements.clone();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 4);

    // The table is open for the next tournament.
    assert_eq!(engine.ledger().state(), TournamentState::Registering);
    assert!(engine.ledger().is_empty());
    assert_eq!(engine.blinds().bumps(), 0);
}

#[test]
fn test_vote_cancel_mid_tournament_restores_roster() {
    let mut engine = engine_with(Arc::new(StandardOracle::new(20)), &["a", "b", "c"]);
    engine.force_start().unwrap();
    let first = current(&engine).unwrap();
    engine.act(&first, Action::AllIn).unwrap();

    for name in ["a", "b", "c"] {
        engine.vote_cancel(&name.into()).unwrap();
    }
    assert_eq!(engine.ledger().state(), TournamentState::Registering);
    assert!(engine.ledger().players().iter().all(|p| p.cash == 1000));
    assert!(!engine.round().in_hand());
    assert!(engine.drain_effects().any(|effect| effect == Effect::CancelAll));
}

#[test]
fn test_ledger_orders_simultaneous_busts_by_starting_stack() {
    let mut ledger = TournamentLedger::new(1000);
    for name in ["a", "b", "c", "d"] {
        ledger.register(name.into(), PlayerStats::default(), 10).unwrap();
    }
    ledger.begin().unwrap();
    let players = ledger.players_mut();
    players[0].hand_start_cash = 400;
    players[0].cash = 0;
    players[2].hand_start_cash = 900;
    players[2].cash = 0;

    let out: Vec<(Username, usize)> = ledger
        .close_hand()
        .into_iter()
        .map(|(_, e)| (e.name, e.placement))
        .collect();
    assert_eq!(
        out,
        vec![(Username::new("a"), 4), (Username::new("c"), 3)]
    );
    assert_eq!(ledger.hands_played(), 1);
}

proptest! {
    #[test]
    fn prop_blind_level_never_falls(
        base in 1u32..1000,
        period in 1u32..50,
        hands in 0u32..500,
        extra in 0u32..500,
        bumps in 0u32..10,
    ) {
        let earlier = blind_level(base, hands, period, bumps);
        prop_assert!(blind_level(base, hands + extra, period, bumps) >= earlier);
        prop_assert!(blind_level(base, hands, period, bumps + 1) >= earlier);
        prop_assert!(earlier >= base);
    }

    #[test]
    fn prop_schedule_is_monotonic(
        base in 1u32..200,
        period in 1u32..20,
        eliminations in prop::collection::vec(0usize..4, 1..300),
    ) {
        let mut schedule = BlindSchedule::new(base, period, true);
        let mut last = schedule.current();
        for count in eliminations {
            let raised = schedule.record_hand(count);
            let now = schedule.current();
            prop_assert!(now.big >= last.big);
            prop_assert_eq!(now.small, now.big / 2);
            prop_assert_eq!(raised.is_some(), now.big > last.big);
            last = now;
        }
    }

    #[test]
    fn prop_eliminations_fill_places_from_the_bottom(
        size in 2usize..9,
        busts in prop::collection::vec(prop::collection::vec(any::<bool>(), 9), 1..12),
    ) {
        let mut ledger = TournamentLedger::new(1000);
        for i in 0..size {
            ledger.register(format!("p{i}").into(), PlayerStats::default(), 10).unwrap();
        }
        ledger.begin().unwrap();

        let mut next_place = size;
        for pattern in busts {
            if ledger.outcome().is_some() {
                break;
            }
            for (player, bust) in ledger.players_mut().iter_mut().zip(pattern) {
                if bust {
                    player.cash = 0;
                }
            }
            let batch = ledger.close_hand();
            for (_, elimination) in &batch {
                prop_assert_eq!(elimination.placement, next_place);
                next_place -= 1;
            }
            // The best-placed player of the batch went out last.
            if let Some((_, last)) = batch.last() {
                prop_assert_eq!(ledger.eliminated().front(), Some(&last.name));
            }
        }

        let standings = ledger.standings();
        prop_assert_eq!(standings.len(), size);
        let mut unique = standings.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), size);
        prop_assert_eq!(ledger.players().len() + ledger.eliminated().len(), size);
    }
}
