//! UseCase: 推測処理

use std::sync::Arc;

use crate::domain::{
    GuessOutcome, NumberRange, RepositoryError, RoomError, RoomId, RoomRepository, Timestamp,
};

use super::error::SubmitGuessError;

/// 参加者による推測のユースケース
pub struct SubmitGuessUseCase {
    repository: Arc<dyn RoomRepository>,
    range: NumberRange,
}

impl SubmitGuessUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, range: NumberRange) -> Self {
        Self { repository, range }
    }

    /// 推測を記録し、結果と推測回数を返す
    ///
    /// 正解の場合、`GuessOutcome::notify_host` に通知先のホストが入る。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        guess: Option<i64>,
    ) -> Result<GuessOutcome, SubmitGuessError> {
        let guess = guess
            .and_then(|value| self.range.check(value).ok())
            .ok_or(SubmitGuessError::InvalidGuess {
                min: self.range.min(),
                max: self.range.max(),
            })?;

        let outcome = self
            .repository
            .submit_guess(room_id, guess, Timestamp::now())
            .await
            .map_err(|e| match e {
                RepositoryError::Room(RoomError::SecretNotSet) => SubmitGuessError::SecretNotSet,
                _ => SubmitGuessError::RoomGone,
            })?;

        tracing::debug!(
            "Guess #{} in room '{}': {}",
            outcome.guesses,
            room_id,
            outcome.result
        );
        Ok(outcome)
    }
}
