//! Per-shopper collaborative document rooms.

pub mod room;

pub use room::{CollabRooms, DocRoom, RoomError};
