//! HTTP/WebSocket interface layer for the coordination server.

pub mod broadcast;
pub mod handler;
pub mod runner;
pub mod signal;
pub mod state;

pub use runner::{ServerConfig, run_server, run_with_config};
