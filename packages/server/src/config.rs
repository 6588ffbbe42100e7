//! Process configuration.
//!
//! Every limit can be given as a command-line flag or an environment variable.

use std::time::Duration;

use clap::Parser;

use crate::{
    domain::{
        ExpiryPolicy, NumberRange,
        entity::{DEFAULT_ROOM_IDLE_GRACE, DEFAULT_ROOM_MAX_AGE},
        rate_limit::{DEFAULT_GUESSES_PER_SECOND, DEFAULT_MESSAGES_PER_SECOND},
        value_object::{DEFAULT_MAX_NUMBER, DEFAULT_MIN_NUMBER},
    },
    error::ServerError,
    infrastructure::{codec::DEFAULT_MAX_MESSAGE_BYTES, repository::inmemory::DEFAULT_ROOM_CAPACITY},
};

const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Two-player guess-the-number server")]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Maximum number of live rooms
    #[arg(long, env = "MAX_ROOMS", default_value_t = DEFAULT_ROOM_CAPACITY)]
    pub max_rooms: usize,

    /// Hard ceiling on a room's lifetime, in seconds
    #[arg(long, env = "ROOM_MAX_AGE_SECS", default_value_t = DEFAULT_ROOM_MAX_AGE.as_secs())]
    pub room_max_age_secs: u64,

    /// Grace period before a room with no players is reclaimed, in seconds
    #[arg(long, env = "ROOM_IDLE_GRACE_SECS", default_value_t = DEFAULT_ROOM_IDLE_GRACE.as_secs())]
    pub room_idle_grace_secs: u64,

    /// Period of the expired-room sweep, in seconds
    #[arg(long, env = "REAP_INTERVAL_SECS", default_value_t = DEFAULT_REAP_INTERVAL.as_secs())]
    pub reap_interval_secs: u64,

    /// Largest accepted inbound frame, in bytes
    #[arg(long, env = "MAX_MESSAGE_BYTES", default_value_t = DEFAULT_MAX_MESSAGE_BYTES)]
    pub max_message_bytes: usize,

    /// Inbound messages allowed per connection per second
    #[arg(long, env = "MAX_MESSAGES_PER_SEC", default_value_t = DEFAULT_MESSAGES_PER_SECOND)]
    pub max_messages_per_sec: usize,

    /// Guesses allowed per connection per second
    #[arg(long, env = "MAX_GUESSES_PER_SEC", default_value_t = DEFAULT_GUESSES_PER_SECOND)]
    pub max_guesses_per_sec: usize,

    /// Smallest playable number
    #[arg(long, env = "MIN_NUMBER", default_value_t = DEFAULT_MIN_NUMBER)]
    pub min_number: i64,

    /// Largest playable number
    #[arg(long, env = "MAX_NUMBER", default_value_t = DEFAULT_MAX_NUMBER)]
    pub max_number: i64,

    /// Comma-separated list of accepted Origin headers; empty accepts every origin
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_rooms: DEFAULT_ROOM_CAPACITY,
            room_max_age_secs: DEFAULT_ROOM_MAX_AGE.as_secs(),
            room_idle_grace_secs: DEFAULT_ROOM_IDLE_GRACE.as_secs(),
            reap_interval_secs: DEFAULT_REAP_INTERVAL.as_secs(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_messages_per_sec: DEFAULT_MESSAGES_PER_SECOND,
            max_guesses_per_sec: DEFAULT_GUESSES_PER_SECOND,
            min_number: DEFAULT_MIN_NUMBER,
            max_number: DEFAULT_MAX_NUMBER,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ServerError> {
        self.number_range()?;
        if self.max_messages_per_sec == 0 || self.max_guesses_per_sec == 0 {
            return Err(ServerError::InvalidConfig(
                "rate limits must be greater than zero".to_string(),
            ));
        }
        if self.reap_interval_secs == 0 {
            return Err(ServerError::InvalidConfig(
                "reap interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn number_range(&self) -> Result<NumberRange, ServerError> {
        NumberRange::new(self.min_number, self.max_number)
            .map_err(|e| ServerError::InvalidConfig(e.to_string()))
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy {
            max_age: Duration::from_secs(self.room_max_age_secs),
            idle_grace: Duration::from_secs(self.room_idle_grace_secs),
        }
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }

    /// Whether a connection presenting `origin` may proceed.
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        let mut allowed = self
            .allowed_origins
            .iter()
            .map(|allowed| allowed.trim())
            .filter(|allowed| !allowed.is_empty())
            .peekable();
        if allowed.peek().is_none() {
            return true;
        }
        origin.is_some_and(|origin| allowed.any(|allowed| allowed == origin.trim()))
    }
}
