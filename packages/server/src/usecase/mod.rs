//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。
//! 通知が必要な接続は戻り値として返し、送信は呼び出し側が行います。

pub mod create_room;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod reap_rooms;
pub mod set_secret;
pub mod submit_guess;

pub use create_room::CreateRoomUseCase;
pub use error::{CreateRoomError, JoinRoomError, SetSecretError, SubmitGuessError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use reap_rooms::{ReapRoomsUseCase, ReapedRoom};
pub use set_secret::SetSecretUseCase;
pub use submit_guess::SubmitGuessUseCase;
