use std::fmt;

/// Lifecycle state of the session's single connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing has been attempted yet
    #[default]
    Idle,

    /// A handle exists and the handshake is in flight
    Connecting,

    /// The handle is open and can carry messages
    Connected,

    /// The connection closed
    Disconnected { code: u16, reason: String },

    /// The transport reported a failure
    Errored(String),
}

impl ConnectionState {
    /// Whether a fresh connect may start from this state
    pub fn accepts_connect(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Disconnected { .. } | Self::Errored(_)
        )
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle. Enter WebSocket URL and connect."),
            Self::Connecting => write!(f, "Connecting..."),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected { code, reason } => {
                let reason = if reason.is_empty() {
                    "No reason given"
                } else {
                    reason
                };
                write!(f, "Disconnected. Code: {}, Reason: {}", code, reason)
            }
            Self::Errored(message) => write!(f, "WebSocket Error: {}", message),
        }
    }
}

/// Enablement of the user-facing controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub url_field: bool,
    pub connect: bool,
    pub disconnect: bool,
    pub send: bool,
}

impl Controls {
    /// Controls with nothing connected
    pub const BASELINE: Controls = Controls {
        url_field: true,
        connect: true,
        disconnect: false,
        send: false,
    };

    /// Derive enablement from the connection state.
    ///
    /// `has_handle` is whether an active (not closing) handle is held;
    /// `buffer_valid` is the current outbound validation result.
    pub fn derive(state: &ConnectionState, has_handle: bool, buffer_valid: bool) -> Self {
        match state {
            ConnectionState::Connecting => Controls {
                url_field: false,
                connect: false,
                disconnect: false,
                send: false,
            },
            ConnectionState::Connected => Controls {
                url_field: false,
                connect: false,
                disconnect: true,
                send: buffer_valid,
            },
            // An errored handle still open can be closed or replaced
            ConnectionState::Errored(_) if has_handle => Controls {
                disconnect: true,
                ..Self::BASELINE
            },
            _ => Self::BASELINE,
        }
    }
}
