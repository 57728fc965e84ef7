//! Real-time coordination backend for a dealership assistance platform.
//!
//! Shoppers wait in a global call queue; sales representatives monitor the
//! queue over WebSocket, claim shoppers, exchange WebRTC signaling for a
//! peer-to-peer audio call, and optionally enter a shared-document
//! collaboration session synchronized through a per-shopper room.

pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry point
pub use ui::run_server;
