//! WebSocket tester library
//!
//! A desktop client for manually exercising WebSocket endpoints: connect to
//! a URL, send text or JSON payloads and watch the exchanged messages in a
//! timestamped log.

pub mod config;
pub mod connection;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod transport;
pub mod ui;

pub use error::ClientError;
pub use session::{Session, SessionEvent, SessionOptions};
