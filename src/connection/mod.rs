//! Lifecycle of the session's single WebSocket connection.

mod controller;
mod state;

pub use controller::{ConnectionController, DisconnectOutcome, RELEASE_REASON};
pub use state::{ConnectionState, Controls};
