//! UseCase 層のエラー定義
//!
//! `Display` の文字列はそのままクライアントへの `error` メッセージになります。

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateRoomError {
    #[error("Room limit reached.")]
    RoomLimitReached,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinRoomError {
    #[error("Invalid room ID.")]
    InvalidRoomId,

    #[error("Room not found.")]
    RoomNotFound,

    #[error("Room already has a joiner.")]
    RoomAlreadyFull,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetSecretError {
    #[error("Secret must be an integer between {min} and {max}.")]
    InvalidSecret { min: i64, max: i64 },

    #[error("Room no longer exists.")]
    RoomGone,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitGuessError {
    #[error("Guess must be an integer between {min} and {max}.")]
    InvalidGuess { min: i64, max: i64 },

    #[error("Room no longer exists.")]
    RoomGone,

    #[error("Host has not set a secret yet.")]
    SecretNotSet,
}
