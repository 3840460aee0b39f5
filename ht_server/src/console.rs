//! Line-oriented console front-end.
//!
//! Each input line is one channel message:
//!
//! ```text
//! [#channel] <handle> <verb> [amount]
//! ```
//!
//! The channel may be left out when only one table is open. Table events
//! are printed as they arrive; private events (hole cards) are printed with
//! the recipient's handle.

use crate::{config::ServerConfig, logging};
use holdem_tourney::{
    GameEvent,
    table::{Command, TableHandle, TableManager, TableResponse, TableSnapshot},
};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

/// Per-subscriber event buffer
const EVENT_BUFFER: usize = 256;

/// What a console line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Table {
        channel: String,
        handle: String,
        command: Command,
    },
    Status {
        channel: String,
    },
    Tables,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("expected: [#channel] <handle> <verb> [amount]")]
    MissingVerb,
    #[error("unknown command '{0}'")]
    UnknownVerb(String),
    #[error("'{0}' needs an amount")]
    MissingAmount(String),
}

/// Parse one console line. `default_channel` is used when the line does
/// not name one.
pub fn parse_line(line: &str, default_channel: &str) -> Result<Request, ParseError> {
    let mut words = line.split_whitespace().peekable();
    let first = words.peek().copied().ok_or(ParseError::Empty)?;

    match first {
        "help" | "?" => return Ok(Request::Help),
        "tables" => return Ok(Request::Tables),
        _ => {}
    }

    let channel = if first.starts_with('#') {
        words.next();
        first.to_string()
    } else {
        default_channel.to_string()
    };

    let handle = words.next().ok_or(ParseError::MissingVerb)?;
    if handle == "status" {
        return Ok(Request::Status { channel });
    }
    let verb = words.next().ok_or(ParseError::MissingVerb)?;
    let mut amount = || {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingAmount(verb.to_string()))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "join" | "j" => Command::Join,
        "leave" | "quit" => Command::Leave,
        "start" => Command::Start,
        "stop" => Command::Stop,
        "bet" | "b" => Command::Bet(amount()?),
        "raise" | "r" => Command::Raise(amount()?),
        "call" | "c" => Command::Call,
        "check" | "x" => Command::Check,
        "fold" | "f" => Command::Fold,
        "allin" | "all-in" | "shove" => Command::AllIn,
        "fstart" => Command::ForceStart,
        "ffold" => Command::ForceFold,
        "fcheck" => Command::ForceCheck,
        "fstop" => Command::ForceStop,
        other => return Err(ParseError::UnknownVerb(other.to_string())),
    };

    Ok(Request::Table {
        channel,
        handle: handle.to_string(),
        command,
    })
}

pub fn is_force(command: &Command) -> bool {
    matches!(
        command,
        Command::ForceStart | Command::ForceFold | Command::ForceCheck | Command::ForceStop
    )
}

const USAGE: &str = "\
[#channel] <handle> join|leave|start|stop
[#channel] <handle> bet N|raise N|call|check|fold|allin
[#channel] <handle> fstart|ffold|fcheck|fstop   (operators)
[#channel] status | tables | help";

/// Render a line of the table transcript
pub fn render_event(channel: &str, event: &GameEvent) -> String {
    match event.recipient() {
        Some(name) => format!("[{channel} -> {name}] {event}"),
        None => format!("[{channel}] {event}"),
    }
}

pub fn render_status(status: &TableSnapshot) -> String {
    let mut out = format!(
        "[{}] {:?}, hand #{} {:?} on {}, blinds {}",
        status.name, status.state, status.hand_number, status.phase, status.street, status.blinds
    );
    if !status.board.is_empty() {
        let board: Vec<String> = status.board.iter().map(ToString::to_string).collect();
        out.push_str(&format!(", board {}", board.join(" ")));
    }
    for seat in &status.players {
        let mut flags = Vec::new();
        if status.current_bettor.as_ref() == Some(&seat.name) {
            flags.push("to act");
        }
        if seat.folded {
            flags.push("folded");
        }
        if seat.all_in {
            flags.push("all-in");
        }
        if seat.has_quit {
            flags.push("left");
        }
        out.push_str(&format!(
            "\n  {:<16} {:>7} (bet {}) {}",
            seat.name.as_str(),
            seat.cash,
            seat.bet,
            flags.join(", ")
        ));
    }
    out
}

/// Print every event of `table` until it closes
pub async fn follow(table: TableHandle, subscriber: u64) -> Result<(), String> {
    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    table.subscribe(subscriber, tx).await?;
    let channel = table.name().to_string();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", render_event(&channel, &event));
        }
    });
    Ok(())
}

/// Read console lines from stdin until end of input
pub async fn run(config: Arc<ServerConfig>, manager: Arc<TableManager>) -> anyhow::Result<()> {
    let default_channel = config.channels[0].clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let request = match parse_line(&line, &default_channel) {
            Ok(request) => request,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                println!("! {e}");
                continue;
            }
        };

        match request {
            Request::Help => println!("{USAGE}"),
            Request::Tables => {
                for name in manager.list_tables().await {
                    println!("{name}");
                }
            }
            Request::Status { channel } => match manager.get_table(&channel).await {
                Some(table) => match table.status().await {
                    Some(status) => println!("{}", render_status(&status)),
                    None => println!("! {channel} is closed"),
                },
                None => println!("! no table on {channel}"),
            },
            Request::Table {
                channel,
                handle,
                command,
            } => {
                let Some(table) = manager.get_table(&channel).await else {
                    println!("! no table on {channel}");
                    continue;
                };
                if is_force(&command) {
                    let allowed = config.is_operator(&handle);
                    logging::log_operator_action(&channel, &handle, &format!("{command:?}"), allowed);
                    if !allowed {
                        println!("! {handle}: operators only");
                        continue;
                    }
                }
                let verb = format!("{command:?}");
                match table.command(handle.as_str(), command).await {
                    TableResponse::Success => {}
                    TableResponse::SuccessWithMessage(message) => println!("[{channel} -> {handle}] {message}"),
                    TableResponse::Error(err) => {
                        logging::log_rejected_command(&channel, &handle, &verb, &err.to_string());
                        println!("[{channel} -> {handle}] {err}");
                    }
                }
            }
        }
    }

    tracing::info!("console input closed");
    Ok(())
}
