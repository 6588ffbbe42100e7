//! UseCase: 秘密の数の設定処理

use std::sync::Arc;

use crate::domain::{NumberRange, RoomId, RoomRepository, Timestamp};

use super::error::SetSecretError;

/// ホストによる秘密の数の設定のユースケース
pub struct SetSecretUseCase {
    repository: Arc<dyn RoomRepository>,
    range: NumberRange,
}

impl SetSecretUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, range: NumberRange) -> Self {
        Self { repository, range }
    }

    /// 秘密の数を設定し、推測回数をリセットする
    ///
    /// `secret` が `None`（整数として解釈できない値）または範囲外なら `InvalidSecret`。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        secret: Option<i64>,
    ) -> Result<(), SetSecretError> {
        let secret = secret
            .and_then(|value| self.range.check(value).ok())
            .ok_or(SetSecretError::InvalidSecret {
                min: self.range.min(),
                max: self.range.max(),
            })?;

        self.repository
            .set_secret(room_id, secret, Timestamp::now())
            .await
            .map_err(|_| SetSecretError::RoomGone)?;

        tracing::info!("Secret set in room '{}'", room_id);
        Ok(())
    }
}
