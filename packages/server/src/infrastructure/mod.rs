//! Infrastructure layer: wire codec, DTOs and repository implementations.

pub mod codec;
pub mod dto;
pub mod repository;
