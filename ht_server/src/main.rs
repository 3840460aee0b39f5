//! Console host for hold'em tournament tables.
//!
//! Opens one TableActor per configured channel through a TableManager and
//! feeds it channel lines read from stdin.

mod config;
mod console;
mod history;
mod logging;

use std::{path::PathBuf, sync::Arc};

use anyhow::Error;
use ctrlc::set_handler;
use holdem_tourney::{
    StandardOracle,
    store::{MemoryStatStore, StatStore},
    table::TableManager,
};
use pico_args::Arguments;
use tracing::info;

use crate::{
    config::{Overrides, ServerConfig},
    history::JsonlHistory,
};

const HELP: &str = "\
Run hold'em elimination tournaments from the console

USAGE:
  ht_server [OPTIONS]

OPTIONS:
  --channels   LIST        Comma-separated channels to open tables on  [default: env TOURNEY_CHANNELS or #poker]
  --history    PATH        Append finished tournaments to this file    [default: env TOURNEY_HISTORY, in memory]
  --delay      SECS        Seconds between a start request and the first hand
  --stack      CHIPS       Starting stack

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TOURNEY_OPERATORS        Handles allowed to use fstart/ffold/fcheck/fstop
  TOURNEY_MIN_BET          Opening big blind
  RUST_LOG                 Log filter (logs go to stderr)
  (See .env.example for all configuration options)

INPUT:
  One line per channel message: [#channel] <handle> <verb> [amount]
  Type `help` once running for the list of verbs.
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        channels: pargs.opt_value_from_str("--channels")?,
        history: pargs.opt_value_from_os_str("--history", |s| Ok::<_, String>(PathBuf::from(s)))?,
        start_delay_secs: pargs.opt_value_from_str("--delay")?,
        starting_stack: pargs.opt_value_from_str("--stack")?,
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;
    let config = Arc::new(config);

    let store: Arc<dyn StatStore> = match &config.history {
        Some(path) => {
            let history = JsonlHistory::open(path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open history {}: {}", path.display(), e))?;
            info!("Recording tournaments to {}", history.path().display());
            Arc::new(history)
        }
        None => {
            info!("No history file configured, statistics kept in memory");
            Arc::new(MemoryStatStore::new())
        }
    };

    let manager = Arc::new(TableManager::new(Arc::new(StandardOracle::default()), store));

    for (subscriber, channel) in config.channels.iter().enumerate() {
        let table = manager
            .create_table(config.table_for(channel))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open table on {}: {}", channel, e))?;
        console::follow(table, subscriber as u64)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to follow {}: {}", channel, e))?;
        info!("Table open on {}", channel);
    }

    info!(
        "Ready with {} table(s); blinds start at {}/{}",
        manager.active_table_count().await,
        config.table_defaults.min_bet / 2,
        config.table_defaults.min_bet
    );

    console::run(Arc::clone(&config), Arc::clone(&manager)).await?;

    for channel in manager.list_tables().await {
        if let Err(e) = manager.close_table(&channel).await {
            tracing::warn!("Closing {} failed: {}", channel, e);
        }
    }
    info!("Shutting down");

    Ok(())
}
