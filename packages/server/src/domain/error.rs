//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("Number must be between {min} and {max} (got {actual})")]
    NumberOutOfRange { min: i64, max: i64, actual: i64 },

    #[error("Number range is empty: min {min} is greater than max {max}")]
    EmptyNumberRange { min: i64, max: i64 },
}

/// Errors related to Room domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// The joiner slot is already taken by another connection
    #[error("Room already has a joiner")]
    JoinerSlotOccupied,

    /// A guess arrived before the host chose a secret
    #[error("Secret has not been set")]
    SecretNotSet,
}

/// Errors returned by a [`RoomRepository`](super::RoomRepository)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Room limit reached: maximum {capacity} rooms allowed")]
    RoomLimitReached { capacity: usize },

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error(transparent)]
    Room(#[from] RoomError),
}
