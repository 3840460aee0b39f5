//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem_tourney::table::TableConfig;
use std::path::PathBuf;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Channels to open a table on
    pub channels: Vec<String>,
    /// Handles allowed to issue force commands
    pub operators: Vec<String>,
    /// Tournament history file, `None` keeps history in memory only
    pub history: Option<PathBuf>,
    /// Settings shared by every table; `name` is replaced per channel
    pub table_defaults: TableConfig,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub channels: Option<String>,
    pub history: Option<PathBuf>,
    pub start_delay_secs: Option<u64>,
    pub starting_stack: Option<u32>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or unparsable
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channels = overrides
            .channels
            .or_else(|| lookup("TOURNEY_CHANNELS"))
            .unwrap_or_else(|| "#poker".to_string());
        let channels = split_list(&channels);
        if channels.is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "TOURNEY_CHANNELS".to_string(),
                hint: "Comma-separated channel names, e.g. #poker,#holdem".to_string(),
            });
        }

        let operators = lookup("TOURNEY_OPERATORS")
            .map(|list| split_list(&list))
            .unwrap_or_default();

        let history = overrides
            .history
            .or_else(|| lookup("TOURNEY_HISTORY").map(PathBuf::from));

        let defaults = TableConfig::default();
        let table_defaults = TableConfig {
            name: channels[0].clone(),
            min_bet: parse_env_or(&lookup, "TOURNEY_MIN_BET", defaults.min_bet)?,
            starting_stack: match overrides.starting_stack {
                Some(stack) => stack,
                None => parse_env_or(&lookup, "TOURNEY_STARTING_STACK", defaults.starting_stack)?,
            },
            min_players: parse_env_or(&lookup, "TOURNEY_MIN_PLAYERS", defaults.min_players)?,
            max_players: parse_env_or(&lookup, "TOURNEY_MAX_PLAYERS", defaults.max_players)?,
            start_delay_secs: match overrides.start_delay_secs {
                Some(secs) => secs,
                None => parse_env_or(&lookup, "TOURNEY_START_DELAY_SECS", defaults.start_delay_secs)?,
            },
            hand_delay_secs: parse_env_or(&lookup, "TOURNEY_HAND_DELAY_SECS", defaults.hand_delay_secs)?,
            showdown_delay_secs: parse_env_or(
                &lookup,
                "TOURNEY_SHOWDOWN_DELAY_SECS",
                defaults.showdown_delay_secs,
            )?,
            blind_doubling_hands: parse_env_or(
                &lookup,
                "TOURNEY_BLIND_DOUBLING_HANDS",
                defaults.blind_doubling_hands,
            )?,
            double_on_elimination: parse_env_or(
                &lookup,
                "TOURNEY_DOUBLE_ON_ELIMINATION",
                defaults.double_on_elimination,
            )?,
            idle_warning_secs: parse_env_or(&lookup, "TOURNEY_IDLE_WARNING_SECS", defaults.idle_warning_secs)?,
            idle_timeout_secs: parse_env_or(&lookup, "TOURNEY_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            num_decks: parse_env_or(&lookup, "TOURNEY_NUM_DECKS", defaults.num_decks)?,
        };

        Ok(ServerConfig {
            channels,
            operators,
            history,
            table_defaults,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bad) = self.channels.iter().find(|c| !c.starts_with('#')) {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_CHANNELS".to_string(),
                reason: format!("Channel names start with '#', got '{bad}'"),
            });
        }

        let mut unique = self.channels.clone();
        unique.sort();
        unique.dedup();
        if unique.len() != self.channels.len() {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_CHANNELS".to_string(),
                reason: "Channel listed twice".to_string(),
            });
        }

        self.table_defaults
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "TOURNEY_*".to_string(),
                reason,
            })
    }

    /// Table configuration for one channel
    pub fn table_for(&self, channel: &str) -> TableConfig {
        TableConfig {
            name: channel.to_string(),
            ..self.table_defaults.clone()
        }
    }

    pub fn is_operator(&self, handle: &str) -> bool {
        self.operators.iter().any(|op| op == handle)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable, falling back to `default` when it is unset
fn parse_env_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse '{raw}'"),
        }),
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
