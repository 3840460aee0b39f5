//! File-backed tournament history.
//!
//! Every finished tournament is appended to a file as one JSON line.
//! Player lines live in memory; on open the history file is replayed so
//! tournament counters survive a restart.

use async_trait::async_trait;
use holdem_tourney::{
    Username,
    game::stats::{PlayerStats, StatLine},
    store::{StatStore, StoreResult},
    tournament::FinalStandings,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tokio::{
    fs::OpenOptions,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::{Mutex, RwLock},
};

pub struct JsonlHistory {
    path: PathBuf,
    players: RwLock<HashMap<Username, StatLine>>,
    /// Serializes appends to the history file
    writer: Mutex<()>,
}

impl JsonlHistory {
    /// Open `path`, creating it on first append. Existing records are
    /// replayed into the player counters; unreadable lines are skipped.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut counters: HashMap<Username, PlayerStats> = HashMap::new();

        match tokio::fs::File::open(&path).await {
            Ok(file) => {
                let mut lines = BufReader::new(file).lines();
                let mut number = 0;
                while let Some(line) = lines.next_line().await? {
                    number += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<FinalStandings>(&line) {
                        Ok(standings) => tally(&mut counters, &standings),
                        Err(e) => log::warn!("{}:{}: skipping bad record: {}", path.display(), number, e),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        log::info!(
            "history {} loaded with {} known players",
            path.display(),
            counters.len()
        );
        let players = counters
            .into_iter()
            .map(|(name, stats)| {
                let line = stats.to_line(name.as_str(), 0);
                (name, line)
            })
            .collect();

        Ok(Self {
            path,
            players: RwLock::new(players),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in the history file, oldest first
    pub async fn read_all(&self) -> StoreResult<Vec<FinalStandings>> {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(&line)?);
            }
        }
        Ok(records)
    }
}

fn tally(counters: &mut HashMap<Username, PlayerStats>, standings: &FinalStandings) {
    for name in &standings.placements {
        let stats = counters.entry(name.clone()).or_default();
        stats.tournaments_played += 1;
        if standings.winner.as_ref() == Some(name) {
            stats.tournaments_won += 1;
        }
    }
}

#[async_trait]
impl StatStore for JsonlHistory {
    async fn load_player(&self, name: &Username) -> StoreResult<Option<StatLine>> {
        Ok(self.players.read().await.get(name).cloned())
    }

    async fn save_player(&self, name: &Username, line: StatLine) -> StoreResult<()> {
        self.players.write().await.insert(name.clone(), line);
        Ok(())
    }

    async fn record_tournament(&self, standings: &FinalStandings) -> StoreResult<()> {
        let mut record = serde_json::to_string(standings)?;
        record.push('\n');

        let _guard = self.writer.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.as_bytes()).await?;
        file.flush().await?;
        log::debug!("recorded tournament {} to {}", standings.id, self.path.display());
        Ok(())
    }
}
