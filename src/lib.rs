//! den-remote: a local-network remote control server for the living room
//!
//! Exposes an HTTP/JSON API that dispatches commands to a Samsung smart TV
//! (REST + WebSocket + wake-on-LAN), a Chromecast (helper binary), and a
//! PlayStation 5 (helper binary). Every command walks the same pipeline:
//! validate against a closed action registry, admit through a per-client rate
//! limiter, invoke the device under a hard deadline, and normalize the raw
//! outcome into one uniform result shape.

// Core modules
pub mod config;
pub mod devices;
pub mod error;
pub mod invoker;
pub mod server;
pub mod validation;

// Test support modules - available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use error::{DenError, Result};
pub use invoker::{CommandInvoker, CommandResult, Invocation, Invoker};
