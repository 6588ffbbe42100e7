//! Shared application state.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{NumberRange, RoomRepository},
    error::ServerError,
    infrastructure::repository::InMemoryRoomRepository,
};

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn RoomRepository>,
    pub config: ServerConfig,
    /// Playable interval for secrets and guesses
    pub number_range: NumberRange,
}

impl AppState {
    /// Build the state with an in-memory room registry sized from `config`.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let repository = Arc::new(InMemoryRoomRepository::with_capacity(config.max_rooms));
        Self::with_repository(config, repository)
    }

    pub fn with_repository(
        config: ServerConfig,
        repository: Arc<dyn RoomRepository>,
    ) -> Result<Self, ServerError> {
        config.validate()?;
        let number_range = config.number_range()?;
        Ok(Self {
            repository,
            config,
            number_range,
        })
    }
}
