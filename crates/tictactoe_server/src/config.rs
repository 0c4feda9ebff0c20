//! Server configuration.
//!
//! Layered: built-in defaults, then an optional TOML file, then environment
//! variables, then command-line flags.

use crate::broadcast::DEFAULT_CAPACITY;
use crate::store::CorruptBoardPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tictactoe_engine::Difficulty;
use tracing::{debug, info, instrument};

/// Database URL that selects the in-memory store.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Runtime configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// SQLite file path, or `:memory:` for the in-memory store.
    database_url: String,

    /// Deadline for a single store call, in milliseconds.
    store_timeout_ms: u64,

    /// Difficulty used when a single-player request names none.
    default_difficulty: Difficulty,

    /// How to treat stored boards that fail to decode.
    corrupt_board_policy: CorruptBoardPolicy,

    /// Fixed seed for the AI's random choices. Entropy when absent.
    ai_seed: Option<u64>,

    /// Buffered snapshots per game notification channel.
    channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "tictactoe.db".to_string(),
            store_timeout_ms: 5000,
            default_difficulty: Difficulty::default(),
            corrupt_board_policy: CorruptBoardPolicy::default(),
            ai_seed: None,
            channel_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }

    /// Applies `TICTACTOE_HOST`, `TICTACTOE_PORT` and `DATABASE_URL` from the
    /// process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies environment overrides read through `lookup`.
    #[instrument(skip(self, lookup))]
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("TICTACTOE_HOST") {
            debug!(host = %host, "Host from environment");
            self.host = host;
        }
        if let Some(port) = lookup("TICTACTOE_PORT") {
            self.port = port.parse().map_err(|e| {
                ConfigError::new(format!("Invalid TICTACTOE_PORT {:?}: {}", port, e))
            })?;
            debug!(port = self.port, "Port from environment");
        }
        if let Some(url) = lookup("DATABASE_URL") {
            debug!(database_url = %url, "Database from environment");
            self.database_url = url;
        }
        Ok(self)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database_url: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(url) = database_url {
            self.database_url = url;
        }
        self
    }

    /// Sets the store deadline.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets a fixed AI seed.
    pub fn with_ai_seed(mut self, seed: u64) -> Self {
        self.ai_seed = Some(seed);
        self
    }

    /// Sets the corrupt-board policy.
    pub fn with_corrupt_board_policy(mut self, policy: CorruptBoardPolicy) -> Self {
        self.corrupt_board_policy = policy;
        self
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Store deadline as a duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Whether the in-memory store is selected.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
