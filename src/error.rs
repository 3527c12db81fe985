use thiserror::Error;

/// Errors surfaced by session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The WebSocket URL was empty after trimming
    #[error("WebSocket URL cannot be empty.")]
    InvalidInput,

    /// A send was attempted without an open connection
    #[error("Not connected to WebSocket server.")]
    NotConnected,

    /// A send was attempted with a blank message
    #[error("Cannot send an empty message.")]
    EmptyMessage,

    /// The payload could not be parsed as JSON
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// The transport reported a failure
    #[error("WebSocket Error: {0}")]
    Transport(String),

    /// A connection is already being established or is still open
    #[error("A connection is already open or in progress.")]
    ConnectionInProgress,
}
