//! RoomRepository の実装
//!
//! 現在はプロセス内の HashMap を使うインメモリ実装のみ。再起動をまたいだ永続化は行いません。

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
