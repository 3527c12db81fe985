use super::state::ConnectionState;
use crate::error::ClientError;
use crate::transport::{
    ConnectionHandle, ConnectionId, Connector, NoticeSender, CLIENT_CLOSE_REASON, CLOSE_ABNORMAL,
    CLOSE_NORMAL,
};
use log::{debug, info, warn};
use std::sync::Arc;

/// Reason recorded when a handle is torn down without a close handshake
pub const RELEASE_REASON: &str = "Connection released without close handshake";

/// What `disconnect` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// No handle was held
    AlreadyDisconnected,

    /// A graceful close was started; the closure notice finishes it
    Closing,

    /// The handle was released without a handshake
    Released,
}

/// A handle together with what the controller knows about it
struct ActiveConnection {
    id: ConnectionId,
    url: String,
    open: bool,
    handle: Box<dyn ConnectionHandle>,
}

impl ActiveConnection {
    fn release(mut self) {
        debug!("Releasing connection {}", self.id);
        self.handle.release();
    }
}

/// Owns the single connection and its lifecycle state
pub struct ConnectionController {
    connector: Arc<dyn Connector>,
    notices: NoticeSender,
    state: ConnectionState,
    active: Option<ActiveConnection>,
    /// A handle that was asked to close gracefully and has not reported back
    closing: Option<ActiveConnection>,
}

impl ConnectionController {
    pub fn new(connector: Arc<dyn Connector>, notices: NoticeSender) -> Self {
        Self {
            connector,
            notices,
            state: ConnectionState::Idle,
            active: None,
            closing: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Whether an active (not closing) handle is held
    pub fn has_handle(&self) -> bool {
        self.active.is_some()
    }

    /// URL of the active connection, if any
    pub fn url(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.url.as_str())
    }

    /// Start connecting to `url`
    pub fn connect(&mut self, url: &str) -> Result<ConnectionId, ClientError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ClientError::InvalidInput);
        }
        if !self.state.accepts_connect() {
            return Err(ClientError::ConnectionInProgress);
        }

        // Only an errored handle still waiting for its closure can linger here
        if let Some(errored) = self.active.take() {
            errored.release();
        }
        if let Some(closing) = self.closing.take() {
            closing.release();
        }

        let id = ConnectionId::new();
        info!("Connecting to {} ({})", url, id);
        let handle = self.connector.open(id, url, self.notices.clone());
        self.active = Some(ActiveConnection {
            id,
            url: url.to_string(),
            open: false,
            handle,
        });
        self.state = ConnectionState::Connecting;

        Ok(id)
    }

    /// The handle finished its handshake. Returns whether state changed.
    pub fn on_opened(&mut self, id: ConnectionId) -> bool {
        match self.active.as_mut() {
            Some(active) if active.id == id && self.state == ConnectionState::Connecting => {
                info!("Connected to {}", active.url);
                active.open = true;
                self.state = ConnectionState::Connected;
                true
            }
            _ => {
                warn!("Ignoring open notice from stale connection {}", id);
                false
            }
        }
    }

    /// The transport reported a failure. Returns whether state changed.
    pub fn on_error(&mut self, id: ConnectionId, message: &str) -> bool {
        if self.is_closing(id) {
            if let Some(closing) = self.closing.take() {
                closing.release();
            }
            return false;
        }
        if !self.is_active(id) {
            warn!("Ignoring error from stale connection {}: {}", id, message);
            return false;
        }

        self.state = ConnectionState::Errored(message.to_string());
        // Never reached open, so there is no handshake to wait for
        if self.active.as_ref().is_some_and(|active| !active.open) {
            if let Some(active) = self.active.take() {
                active.release();
            }
        }
        true
    }

    /// The channel closed. Returns whether state changed.
    pub fn on_closed(&mut self, id: ConnectionId, code: u16, reason: &str) -> bool {
        if self.is_active(id) {
            if let Some(active) = self.active.take() {
                info!("Connection to {} closed: {} {}", active.url, code, reason);
            }
            self.state = ConnectionState::Disconnected {
                code,
                reason: reason.to_string(),
            };
            return true;
        }

        if self.is_closing(id) {
            self.closing = None;
            if self.active.is_none() && matches!(self.state, ConnectionState::Disconnected { .. }) {
                self.state = ConnectionState::Disconnected {
                    code,
                    reason: reason.to_string(),
                };
                return true;
            }
            return false;
        }

        warn!("Ignoring close notice from stale connection {}", id);
        false
    }

    /// Drop the active connection, gracefully when possible
    pub fn disconnect(&mut self, notify_peer: bool) -> DisconnectOutcome {
        let Some(mut active) = self.active.take() else {
            return DisconnectOutcome::AlreadyDisconnected;
        };

        if notify_peer && active.open {
            info!("Closing connection to {}", active.url);
            active.handle.close(CLOSE_NORMAL, CLIENT_CLOSE_REASON);
            if let Some(previous) = self.closing.replace(active) {
                previous.release();
            }
            self.state = ConnectionState::Disconnected {
                code: CLOSE_NORMAL,
                reason: CLIENT_CLOSE_REASON.to_string(),
            };
            DisconnectOutcome::Closing
        } else {
            active.release();
            self.state = ConnectionState::Disconnected {
                code: CLOSE_ABNORMAL,
                reason: RELEASE_REASON.to_string(),
            };
            DisconnectOutcome::Released
        }
    }

    /// Hand `text` to the open connection
    pub fn transmit(&mut self, text: &str) -> Result<(), ClientError> {
        match self.active.as_mut() {
            Some(active) if active.open && self.state.is_connected() => {
                debug!("Sending {} bytes to {}", text.len(), active.url);
                active.handle.send(text)
            }
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Whether `id` is the active or the closing handle
    pub fn owns(&self, id: ConnectionId) -> bool {
        self.is_active(id) || self.is_closing(id)
    }

    fn is_active(&self, id: ConnectionId) -> bool {
        self.active.as_ref().is_some_and(|active| active.id == id)
    }

    fn is_closing(&self, id: ConnectionId) -> bool {
        self.closing.as_ref().is_some_and(|closing| closing.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingConnector;
    use crate::transport::TransportNotice;
    use tokio::sync::mpsc;

    fn controller() -> (ConnectionController, RecordingConnector) {
        let connector = RecordingConnector::new();
        let (tx, _rx) = mpsc::unbounded_channel::<TransportNotice>();
        let controller = ConnectionController::new(Arc::new(connector.clone()), tx);
        (controller, connector)
    }

    #[test]
    fn blank_url_is_rejected_without_state_change() {
        let (mut controller, connector) = controller();
        assert_eq!(controller.connect("   "), Err(ClientError::InvalidInput));
        assert_eq!(controller.state(), &ConnectionState::Idle);
        assert!(connector.calls().opened.is_empty());
    }

    #[test]
    fn connect_trims_url() {
        let (mut controller, connector) = controller();
        controller.connect("  ws://localhost:9001 ").expect("connect");
        assert_eq!(connector.calls().opened[0].1, "ws://localhost:9001");
        assert_eq!(controller.url(), Some("ws://localhost:9001"));
    }

    #[test]
    fn second_connect_while_connecting_is_rejected() {
        let (mut controller, connector) = controller();
        controller.connect("ws://a").expect("connect");
        assert_eq!(
            controller.connect("ws://b"),
            Err(ClientError::ConnectionInProgress)
        );
        assert_eq!(connector.calls().opened.len(), 1);
    }

    #[test]
    fn error_before_open_releases_handle() {
        let (mut controller, connector) = controller();
        let id = controller.connect("ws://a").expect("connect");

        assert!(controller.on_error(id, "refused"));
        assert_eq!(
            controller.state(),
            &ConnectionState::Errored("refused".into())
        );
        assert!(!controller.has_handle());
        assert_eq!(connector.calls().releases, 1);
        assert!(connector.calls().closes.is_empty());

        // The trailing closure from the released handle is stale
        assert!(!controller.on_closed(id, CLOSE_ABNORMAL, ""));
        assert_eq!(
            controller.state(),
            &ConnectionState::Errored("refused".into())
        );
    }

    #[test]
    fn error_after_open_waits_for_closure() {
        let (mut controller, connector) = controller();
        let id = controller.connect("ws://a").expect("connect");
        controller.on_opened(id);

        controller.on_error(id, "reset");
        assert!(controller.has_handle());
        assert_eq!(connector.calls().releases, 0);

        controller.on_closed(id, CLOSE_ABNORMAL, "");
        assert!(!controller.has_handle());
        assert!(matches!(
            controller.state(),
            ConnectionState::Disconnected { code: CLOSE_ABNORMAL, .. }
        ));
    }

    #[test]
    fn connect_after_error_on_open_handle_replaces_it() {
        let (mut controller, connector) = controller();
        let first = controller.connect("ws://a").expect("connect");
        controller.on_opened(first);
        controller.on_error(first, "reset");
        assert!(controller.has_handle());

        let second = controller.connect("ws://b").expect("connect from errored");
        assert_ne!(first, second);
        assert_eq!(controller.state(), &ConnectionState::Connecting);
        assert_eq!(controller.url(), Some("ws://b"));
        assert_eq!(connector.calls().releases, 1);
        assert!(connector.calls().closes.is_empty());

        // The replaced handle's closure no longer counts
        assert!(!controller.on_closed(first, CLOSE_ABNORMAL, ""));
        assert_eq!(controller.state(), &ConnectionState::Connecting);
    }

    #[test]
    fn graceful_disconnect_then_peer_closure() {
        let (mut controller, connector) = controller();
        let id = controller.connect("ws://a").expect("connect");
        controller.on_opened(id);

        assert_eq!(controller.disconnect(true), DisconnectOutcome::Closing);
        assert_eq!(
            connector.calls().closes,
            [(CLOSE_NORMAL, CLIENT_CLOSE_REASON.to_string())]
        );
        assert!(!controller.has_handle());
        assert!(controller.owns(id));

        assert!(controller.on_closed(id, CLOSE_NORMAL, "bye"));
        assert_eq!(
            controller.state(),
            &ConnectionState::Disconnected {
                code: CLOSE_NORMAL,
                reason: "bye".into()
            }
        );
        assert!(!controller.owns(id));
    }

    #[test]
    fn disconnect_while_connecting_is_forced() {
        let (mut controller, connector) = controller();
        controller.connect("ws://a").expect("connect");

        assert_eq!(controller.disconnect(true), DisconnectOutcome::Released);
        assert!(connector.calls().closes.is_empty());
        assert_eq!(connector.calls().releases, 1);
        assert_eq!(
            controller.state(),
            &ConnectionState::Disconnected {
                code: CLOSE_ABNORMAL,
                reason: RELEASE_REASON.into()
            }
        );
    }

    #[test]
    fn connect_during_graceful_close_releases_old_handle() {
        let (mut controller, connector) = controller();
        let first = controller.connect("ws://a").expect("connect");
        controller.on_opened(first);
        controller.disconnect(true);

        let second = controller.connect("ws://b").expect("reconnect");
        assert_eq!(connector.calls().releases, 1);

        // Late closure of the first handle must not disturb the new attempt
        assert!(!controller.on_closed(first, CLOSE_NORMAL, ""));
        assert_eq!(controller.state(), &ConnectionState::Connecting);
        assert!(controller.on_opened(second));
    }

    #[test]
    fn transmit_requires_open_connection() {
        let (mut controller, connector) = controller();
        assert_eq!(controller.transmit("x"), Err(ClientError::NotConnected));

        let id = controller.connect("ws://a").expect("connect");
        assert_eq!(controller.transmit("x"), Err(ClientError::NotConnected));

        controller.on_opened(id);
        assert_eq!(controller.transmit("x"), Ok(()));
        assert_eq!(connector.calls().sent, ["x"]);
    }
}
