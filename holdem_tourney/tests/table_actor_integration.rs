//! Table actor integration tests
//!
//! These run a real table actor on a paused Tokio clock, so start delays,
//! idle warnings and idle-outs can be stepped through without waiting.

use async_trait::async_trait;
use holdem_tourney::{
    game::{GameEvent, StandardOracle, StatLine, Username, events::CancelReason, stats::StatKey},
    store::{MemoryStatStore, StatStore, StoreError, StoreResult},
    table::{Command, TableActor, TableConfig, TableHandle, TableMessage, TableResponse},
    tournament::{FinalStandings, TournamentState},
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, time::sleep};

/// Store whose backend is always down.
struct FailingStore;

#[async_trait]
impl StatStore for FailingStore {
    async fn load_player(&self, _name: &Username) -> StoreResult<Option<StatLine>> {
        Err(StoreError::Unavailable("backend down".to_string()))
    }

    async fn save_player(&self, _name: &Username, _line: StatLine) -> StoreResult<()> {
        Err(StoreError::Unavailable("backend down".to_string()))
    }

    async fn record_tournament(&self, _standings: &FinalStandings) -> StoreResult<()> {
        Err(StoreError::Unavailable("backend down".to_string()))
    }
}

fn config() -> TableConfig {
    TableConfig {
        name: "#actor".to_string(),
        ..Default::default()
    }
}

async fn spawn_table(config: TableConfig, store: Arc<dyn StatStore>) -> (TableHandle, mpsc::Receiver<GameEvent>) {
    let (actor, handle) = TableActor::new(config, Arc::new(StandardOracle::new(20)), store);
    tokio::spawn(actor.run());
    let (tx, rx) = mpsc::channel(4096);
    handle.subscribe(1, tx).await.unwrap();
    (handle, rx)
}

async fn join_all(handle: &TableHandle, names: &[&str]) {
    for name in names {
        assert!(handle.command(*name, Command::Join).await.is_success());
    }
}

fn received(rx: &mut mpsc::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_start_waits_for_delay() {
    let (handle, mut rx) = spawn_table(config(), Arc::new(MemoryStatStore::new())).await;
    join_all(&handle, &["ann", "bob"]).await;

    assert!(handle.command("ann", Command::Start).await.is_success());
    assert_eq!(
        handle.command("bob", Command::Start).await,
        TableResponse::Error(holdem_tourney::GameError::AlreadyStarting)
    );

    sleep(Duration::from_secs(29)).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, TournamentState::Starting);
    assert_eq!(status.hand_number, 0);

    sleep(Duration::from_secs(2)).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, TournamentState::Running);
    assert_eq!(status.hand_number, 1);

    let events = received(&mut rx);
    assert!(events.iter().any(|e| matches!(e, GameEvent::StartScheduled { delay_secs: 30, .. })));
    assert!(events.iter().any(|e| matches!(e, GameEvent::TournamentStarted { players: 2, .. })));
}

#[tokio::test(start_paused = true)]
async fn test_idle_warning_then_idle_out() {
    let (handle, mut rx) = spawn_table(config(), Arc::new(MemoryStatStore::new())).await;
    join_all(&handle, &["ann", "bob", "cat"]).await;
    assert!(handle.command("ann", Command::ForceStart).await.is_success());

    let idle = handle.status().await.unwrap().current_bettor.unwrap();
    received(&mut rx);

    sleep(Duration::from_secs(61)).await;
    let events = received(&mut rx);
    assert!(events.contains(&GameEvent::IdleWarning {
        name: idle.clone(),
        secs_left: 30,
    }));
    assert!(!events.contains(&GameEvent::IdleOut(idle.clone())));

    sleep(Duration::from_secs(30)).await;
    let events = received(&mut rx);
    assert!(events.contains(&GameEvent::IdleOut(idle.clone())));

    // Facing the big blind, so idling out folds.
    let status = handle.status().await.unwrap();
    let seat = status.players.iter().find(|p| p.name == idle).unwrap();
    assert!(seat.folded);
    assert_ne!(status.current_bettor, Some(idle));
}

#[tokio::test(start_paused = true)]
async fn test_acting_cancels_idle_timers() {
    let (handle, mut rx) = spawn_table(config(), Arc::new(MemoryStatStore::new())).await;
    join_all(&handle, &["ann", "bob", "cat"]).await;
    assert!(handle.command("ann", Command::ForceStart).await.is_success());

    let first = handle.status().await.unwrap().current_bettor.unwrap();
    sleep(Duration::from_secs(50)).await;
    assert!(handle.command(first.clone(), Command::Call).await.is_success());

    // Past the first player's warning and timeout, before the next player's.
    sleep(Duration::from_secs(50)).await;
    let events = received(&mut rx);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GameEvent::IdleWarning { .. } | GameEvent::IdleOut(_)))
    );
    let status = handle.status().await.unwrap();
    assert!(!status.players.iter().any(|p| p.folded));
}

#[tokio::test(start_paused = true)]
async fn test_unanimous_vote_cancels_pending_start() {
    let (handle, mut rx) = spawn_table(config(), Arc::new(MemoryStatStore::new())).await;
    join_all(&handle, &["ann", "bob", "cat"]).await;
    assert!(handle.command("ann", Command::Start).await.is_success());

    assert!(handle.command("ann", Command::Stop).await.is_success());
    assert_eq!(
        handle.command("ann", Command::Stop).await,
        TableResponse::SuccessWithMessage("you already voted (1/3)".to_string())
    );
    assert!(handle.command("bob", Command::Stop).await.is_success());
    assert!(handle.command("cat", Command::Stop).await.is_success());

    let events = received(&mut rx);
    assert!(events.contains(&GameEvent::TournamentCancelled(CancelReason::Vote)));

    // The start timer went with the vote.
    sleep(Duration::from_secs(60)).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, TournamentState::Registering);
    assert_eq!(status.hand_number, 0);
    assert_eq!(status.players.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_below_minimum_cancels_start() {
    let (handle, mut rx) = spawn_table(config(), Arc::new(MemoryStatStore::new())).await;
    join_all(&handle, &["ann", "bob"]).await;
    assert!(handle.command("ann", Command::Start).await.is_success());
    assert!(handle.command("bob", Command::Leave).await.is_success());

    let events = received(&mut rx);
    assert!(events.contains(&GameEvent::TournamentCancelled(CancelReason::NotEnoughPlayers)));

    sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.status().await.unwrap().state, TournamentState::Registering);
}

#[tokio::test(start_paused = true)]
async fn test_store_failures_do_not_stop_play() {
    let (handle, _rx) = spawn_table(config(), Arc::new(FailingStore)).await;
    join_all(&handle, &["ann", "bob"]).await;
    assert!(handle.command("ann", Command::ForceStart).await.is_success());

    let status = handle.status().await.unwrap();
    assert_eq!(status.state, TournamentState::Running);
    assert!(status.players.iter().all(|p| p.cash + p.bet == 1000));
}

#[tokio::test(start_paused = true)]
async fn test_tournament_played_to_the_end_is_recorded() {
    let store = MemoryStatStore::new();
    let (handle, _rx) = spawn_table(config(), Arc::new(store.clone())).await;
    join_all(&handle, &["ann", "bob", "cat"]).await;
    assert!(handle.command("ann", Command::ForceStart).await.is_success());

    for _ in 0..2000 {
        if !store.history().await.is_empty() {
            break;
        }
        match handle.status().await.unwrap().current_bettor {
            Some(name) => {
                assert!(handle.command(name, Command::AllIn).await.is_success());
            }
            None => sleep(Duration::from_secs(10)).await,
        }
    }

    let history = store.history().await;
    assert_eq!(history.len(), 1);
    let standings = &history[0];
    assert_eq!(standings.placements.len(), 3);
    let winner = standings.winner.clone().unwrap();
    assert_eq!(standings.placements[0], winner);

    let line = store.load_player(&winner).await.unwrap().unwrap();
    assert_eq!(line.int(StatKey::TournamentsWon), Some(1));
    assert_eq!(line.int(StatKey::TournamentsPlayed), Some(1));
    for loser in &standings.placements[1..] {
        let line = store.load_player(loser).await.unwrap().unwrap();
        assert_eq!(line.int(StatKey::TournamentsWon), Some(0));
    }

    let status = handle.status().await.unwrap();
    assert_eq!(status.state, TournamentState::Registering);
    assert!(status.players.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_closed_table_rejects_commands() {
    let (handle, _rx) = spawn_table(config(), Arc::new(MemoryStatStore::new())).await;
    let (response, rx) = tokio::sync::oneshot::channel();
    handle.send(TableMessage::Close { response }).await.unwrap();
    assert_eq!(rx.await.unwrap(), TableResponse::Success);

    // Give the actor a moment to drop its inbox.
    sleep(Duration::from_millis(10)).await;
    assert_eq!(
        handle.command("ann", Command::Join).await,
        TableResponse::Error(holdem_tourney::GameError::TableClosed)
    );
    assert!(handle.status().await.is_none());
}
