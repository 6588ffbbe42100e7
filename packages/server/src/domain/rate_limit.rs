//! Sliding-window rate limiting for a single connection.

use std::{collections::VecDeque, time::Duration};

use super::value_object::Timestamp;

/// Default cap on inbound messages per connection per second
pub const DEFAULT_MESSAGES_PER_SECOND: usize = 20;

/// Default cap on guesses per connection per second
pub const DEFAULT_GUESSES_PER_SECOND: usize = 10;

const WINDOW: Duration = Duration::from_secs(1);

/// Counts events inside a trailing time window.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    limit: usize,
    window: Duration,
    /// Oldest first
    events: VecDeque<Timestamp>,
}

impl SlidingWindow {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            events: VecDeque::with_capacity(limit),
        }
    }

    /// One-second window.
    pub fn per_second(limit: usize) -> Self {
        Self::new(limit, WINDOW)
    }

    /// Record an event at `now` unless the window is already full.
    ///
    /// A rejected event leaves the window untouched.
    pub fn admit(&mut self, now: Timestamp) -> bool {
        while let Some(oldest) = self.events.front() {
            if now.elapsed_since(*oldest) >= self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
        if self.events.len() >= self.limit {
            return false;
        }
        self.events.push_back(now);
        true
    }
}

/// The two independent windows each connection carries.
#[derive(Debug, Clone)]
pub struct ConnectionRateLimits {
    pub messages: SlidingWindow,
    pub guesses: SlidingWindow,
}

impl ConnectionRateLimits {
    pub fn new(messages_per_second: usize, guesses_per_second: usize) -> Self {
        Self {
            messages: SlidingWindow::per_second(messages_per_second),
            guesses: SlidingWindow::per_second(guesses_per_second),
        }
    }
}

impl Default for ConnectionRateLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGES_PER_SECOND, DEFAULT_GUESSES_PER_SECOND)
    }
}
