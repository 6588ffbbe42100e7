//! Core domain models for the guessing game.

use std::{cmp::Ordering, fmt, time::Duration};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    error::RoomError,
    value_object::{ConnectionId, Role, RoomId, Timestamp},
};

/// Default hard ceiling on a room's lifetime
pub const DEFAULT_ROOM_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Default grace period before a room with no connected players is reclaimed
pub const DEFAULT_ROOM_IDLE_GRACE: Duration = Duration::from_secs(15 * 60);

/// Handle to one live connection, shared between its session and a room slot.
///
/// Frames pushed into `sender` are written to the socket by the connection's
/// writer task. Two handles are equal when they refer to the same connection.
#[derive(Debug, Clone)]
pub struct PlayerConnection {
    pub id: ConnectionId,
    pub sender: UnboundedSender<String>,
}

impl PlayerConnection {
    pub fn new(id: ConnectionId, sender: UnboundedSender<String>) -> Self {
        Self { id, sender }
    }
}

impl PartialEq for PlayerConnection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PlayerConnection {}

/// Outcome of comparing a guess against the secret.
///
/// Named from the guesser's point of view: `Higher` means the secret is higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessResult {
    Higher,
    Lower,
    Correct,
}

impl GuessResult {
    pub fn classify(guess: i64, secret: i64) -> Self {
        match guess.cmp(&secret) {
            Ordering::Less => GuessResult::Higher,
            Ordering::Greater => GuessResult::Lower,
            Ordering::Equal => GuessResult::Correct,
        }
    }
}

impl fmt::Display for GuessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessResult::Higher => write!(f, "higher"),
            GuessResult::Lower => write!(f, "lower"),
            GuessResult::Correct => write!(f, "correct"),
        }
    }
}

/// An accepted guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub result: GuessResult,
    /// Guesses made against the current secret, this one included
    pub guesses: u32,
    /// Host to tell about a correct guess, if still connected
    pub notify_host: Option<PlayerConnection>,
}

/// When the reaper considers a room expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Age after which a room is removed no matter what
    pub max_age: Duration,
    /// Idle time after which a room with both slots empty is removed
    pub idle_grace: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_ROOM_MAX_AGE,
            idle_grace: DEFAULT_ROOM_IDLE_GRACE,
        }
    }
}

/// One game session between a host and a joiner
#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    host: Option<PlayerConnection>,
    joiner: Option<PlayerConnection>,
    secret: Option<i64>,
    guess_count: u32,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
    /// Last accepted join, secret or guess
    pub last_activity: Timestamp,
}

impl Room {
    /// Create a room whose host slot is held by its creator
    pub fn new(id: RoomId, host: PlayerConnection, now: Timestamp) -> Self {
        Self {
            id,
            host: Some(host),
            joiner: None,
            secret: None,
            guess_count: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn occupant(&self, role: Role) -> Option<&PlayerConnection> {
        match role {
            Role::Host => self.host.as_ref(),
            Role::Joiner => self.joiner.as_ref(),
        }
    }

    pub fn secret(&self) -> Option<i64> {
        self.secret
    }

    pub fn guess_count(&self) -> u32 {
        self.guess_count
    }

    /// Both slots are empty.
    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.joiner.is_none()
    }

    /// Occupy the joiner slot.
    ///
    /// Returns the host to notify about the new joiner.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::JoinerSlotOccupied` without touching the existing joiner.
    pub fn join(
        &mut self,
        joiner: PlayerConnection,
        now: Timestamp,
    ) -> Result<Option<PlayerConnection>, RoomError> {
        if self.joiner.is_some() {
            return Err(RoomError::JoinerSlotOccupied);
        }
        self.joiner = Some(joiner);
        self.last_activity = now;
        Ok(self.host.clone())
    }

    /// Set (or replace) the secret and restart the guess count.
    pub fn set_secret(&mut self, secret: i64, now: Timestamp) {
        self.secret = Some(secret);
        self.guess_count = 0;
        self.last_activity = now;
    }

    /// Count a guess against the current secret and classify it.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::SecretNotSet` if the host has not chosen a secret yet.
    pub fn guess(&mut self, guess: i64, now: Timestamp) -> Result<GuessOutcome, RoomError> {
        let secret = self.secret.ok_or(RoomError::SecretNotSet)?;
        self.guess_count += 1;
        self.last_activity = now;

        let result = GuessResult::classify(guess, secret);
        let notify_host = match result {
            GuessResult::Correct => self.host.clone(),
            _ => None,
        };
        Ok(GuessOutcome {
            result,
            guesses: self.guess_count,
            notify_host,
        })
    }

    /// Clear `role`'s slot if it is still held by `connection_id`.
    ///
    /// Returns whether the slot was cleared. A slot that is already empty or
    /// taken by another connection is left as is.
    pub fn vacate(&mut self, role: Role, connection_id: ConnectionId) -> bool {
        let slot = match role {
            Role::Host => &mut self.host,
            Role::Joiner => &mut self.joiner,
        };
        match slot {
            Some(conn) if conn.id == connection_id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Past the age ceiling, or abandoned for longer than the idle grace.
    pub fn is_expired(&self, now: Timestamp, policy: &ExpiryPolicy) -> bool {
        if now.elapsed_since(self.created_at) >= policy.max_age {
            return true;
        }
        self.is_empty() && now.elapsed_since(self.last_activity) >= policy.idle_grace
    }
}
