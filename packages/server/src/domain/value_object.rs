//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use std::{
    fmt,
    sync::LazyLock,
    time::{Duration, Instant},
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum accepted length of a room identifier presented by a client
pub const ROOM_ID_MAX_LENGTH: usize = 128;

/// Random bytes behind every generated room identifier
pub const ROOM_ID_ENTROPY_BYTES: usize = 16;

/// Room identifier value object.
///
/// The value participants exchange out-of-band to meet in the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Create a new RoomId.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::RoomIdEmpty` for an empty string and
    /// `ValueObjectError::RoomIdTooLong` above [`ROOM_ID_MAX_LENGTH`] bytes.
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let len = id.len();
        if len > ROOM_ID_MAX_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                max: ROOM_ID_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Build a RoomId from raw entropy, URL-safe base64 encoded without padding.
    pub fn from_bytes(bytes: &[u8; ROOM_ID_ENTROPY_BYTES]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of one live WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference point of the monotonic clock, fixed on first use.
static CLOCK_ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Milliseconds on a monotonic clock that starts with the process.
///
/// Wall-clock corrections never move it backwards, so windows and ages
/// measured with it always advance with real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        let millis = CLOCK_ORIGIN.elapsed().as_millis();
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` lies in the future.
    pub fn elapsed_since(&self, earlier: Timestamp) -> Duration {
        let millis = self.0.saturating_sub(earlier.0).max(0);
        Duration::from_millis(millis as u64)
    }
}

/// The two roles a connection can take inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Joiner,
}

impl Role {
    /// The role occupying the other slot of the same room.
    pub fn counterpart(self) -> Self {
        match self {
            Role::Host => Role::Joiner,
            Role::Joiner => Role::Host,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Joiner => write!(f, "joiner"),
        }
    }
}

/// Closed interval of playable numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    min: i64,
    max: i64,
}

impl NumberRange {
    /// # Errors
    ///
    /// Returns `ValueObjectError::EmptyNumberRange` when `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, ValueObjectError> {
        if min > max {
            return Err(ValueObjectError::EmptyNumberRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Accept `value` if it lies inside the interval (bounds included).
    pub fn check(&self, value: i64) -> Result<i64, ValueObjectError> {
        if value < self.min || value > self.max {
            return Err(ValueObjectError::NumberOutOfRange {
                min: self.min,
                max: self.max,
                actual: value,
            });
        }
        Ok(value)
    }
}

impl Default for NumberRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_NUMBER,
            max: DEFAULT_MAX_NUMBER,
        }
    }
}

/// Default lower bound of the playable range
pub const DEFAULT_MIN_NUMBER: i64 = 1;

/// Default upper bound of the playable range
pub const DEFAULT_MAX_NUMBER: i64 = 1_000_000;
