//! Domain layer for the guessing game.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod rate_limit;
pub mod repository;
pub mod value_object;

pub use entity::{ExpiryPolicy, GuessOutcome, GuessResult, PlayerConnection, Room};
pub use error::{RepositoryError, RoomError, ValueObjectError};
pub use factory::RoomIdFactory;
pub use rate_limit::{ConnectionRateLimits, SlidingWindow};
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, NumberRange, Role, RoomId, Timestamp};
