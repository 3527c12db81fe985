use crate::error::ClientError;
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

mod websocket;

#[cfg(test)]
pub(crate) mod testing;

pub use websocket::WsConnector;

/// Close code for a normal, client-initiated closure
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when a close frame carried no status
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Close code reported when the connection ended without a close handshake
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Reason sent with a client-initiated graceful close
pub const CLIENT_CLOSE_REASON: &str = "Client initiated disconnect";

/// Identifies one connection attempt and every notice it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asynchronous notification raised by a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The handshake completed and the channel is open
    Opened,

    /// A text payload arrived
    Message(String),

    /// The transport failed
    Error(String),

    /// The channel closed
    Closed { code: u16, reason: String },
}

/// A transport event tagged with the connection that raised it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportNotice {
    pub connection: ConnectionId,
    pub event: TransportEvent,
}

impl TransportNotice {
    pub fn new(connection: ConnectionId, event: TransportEvent) -> Self {
        Self { connection, event }
    }
}

/// Sender half that connections report their events through
pub type NoticeSender = mpsc::UnboundedSender<TransportNotice>;

/// Opens connections to URL-addressed text channels
pub trait Connector: Send + Sync {
    /// Start opening a connection to `url`.
    ///
    /// Returns immediately; the outcome arrives later on `notices` as
    /// `Opened`, or `Error` followed by `Closed`.
    fn open(&self, id: ConnectionId, url: &str, notices: NoticeSender)
        -> Box<dyn ConnectionHandle>;
}

/// A live connection owned by the controller
pub trait ConnectionHandle: Send {
    /// Queue a text payload for transmission
    fn send(&mut self, text: &str) -> Result<(), ClientError>;

    /// Begin a graceful close; completion is reported as a `Closed` notice
    fn close(&mut self, code: u16, reason: &str);

    /// Tear the connection down immediately without a close handshake
    fn release(&mut self);
}
