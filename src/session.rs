//! The single session shared by every UI consumer.
//!
//! A [`Session`] owns the connection controller, the message pipeline and
//! the status line. User intents and transport notices are applied one at a
//! time through `&mut self`, and every resulting change is published to
//! subscribers as a [`SessionEvent`].

use crate::config::ClientConfig;
use crate::connection::{ConnectionController, ConnectionState, Controls, DisconnectOutcome};
use crate::error::ClientError;
use crate::pipeline::{
    LogEntry, MessageLog, MessagePipeline, ValidationResult, NOTHING_TO_FORMAT_MESSAGE,
};
use crate::transport::{ConnectionId, Connector, TransportEvent, TransportNotice};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Capacity of the subscriber channel
const EVENT_CAPACITY: usize = 256;

pub const ALREADY_DISCONNECTED_STATUS: &str = "Already disconnected or never connected.";
pub const DISCONNECTED_STATUS: &str = "Disconnected";
pub const LOG_CLEARED_STATUS: &str = "Message log cleared.";

/// How the status line should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Connecting,
    Connected,
    Error,
}

/// The status display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, StatusLevel::Info)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, StatusLevel::Error)
    }
}

/// A change observable by session subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(ConnectionState),
    StatusChanged(StatusLine),
    ValidationChanged(ValidationResult),
    LogAppended(LogEntry),
    LogCleared,
}

/// Options taken from the client configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Reject payloads that are not valid JSON when sending
    pub enforce_json_on_send: bool,
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            enforce_json_on_send: config.pipeline.enforce_json_on_send,
        }
    }
}

/// One interactive testing session
pub struct Session {
    controller: ConnectionController,
    pipeline: MessagePipeline,
    status: StatusLine,
    notices: mpsc::UnboundedReceiver<TransportNotice>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a session that opens connections through `connector`
    pub fn new(connector: Arc<dyn Connector>, options: SessionOptions) -> Self {
        let (notice_tx, notices) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let controller = ConnectionController::new(connector, notice_tx);
        let status = StatusLine::info(controller.state().to_string());

        Self {
            controller,
            pipeline: MessagePipeline::new(options.enforce_json_on_send),
            status,
            notices,
            events,
        }
    }

    /// Receive every change made to this session from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> &ConnectionState {
        self.controller.state()
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn validation(&self) -> &ValidationResult {
        self.pipeline.validation()
    }

    pub fn buffer(&self) -> &str {
        self.pipeline.buffer()
    }

    pub fn log(&self) -> &MessageLog {
        self.pipeline.log()
    }

    pub fn controls(&self) -> Controls {
        Controls::derive(
            self.controller.state(),
            self.controller.has_handle(),
            self.pipeline.validation().valid,
        )
    }

    /// Start connecting to `url`
    pub fn connect(&mut self, url: &str) -> Result<ConnectionId, ClientError> {
        match self.controller.connect(url) {
            Ok(id) => {
                self.emit_state();
                self.set_status(StatusLine::new(
                    format!("Connecting to {}...", url.trim()),
                    StatusLevel::Connecting,
                ));
                Ok(id)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Close the connection; see [`ConnectionController::disconnect`]
    pub fn disconnect(&mut self, notify_peer: bool) -> DisconnectOutcome {
        let outcome = self.controller.disconnect(notify_peer);
        match outcome {
            DisconnectOutcome::AlreadyDisconnected => {
                self.set_status(StatusLine::info(ALREADY_DISCONNECTED_STATUS));
            }
            DisconnectOutcome::Closing | DisconnectOutcome::Released => {
                self.emit_state();
                self.set_status(StatusLine::info(DISCONNECTED_STATUS));
            }
        }
        let cleared = self.pipeline.clear_validation().clone();
        self.emit(SessionEvent::ValidationChanged(cleared));
        outcome
    }

    /// Record an edit of the outbound buffer
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        let result = self.pipeline.set_buffer(text).clone();
        self.emit(SessionEvent::ValidationChanged(result));
    }

    /// Pretty-print the outbound buffer
    pub fn format_buffer(&mut self) -> Result<(), ClientError> {
        match self.pipeline.format_buffer() {
            Ok(result) => {
                let result = result.clone();
                self.emit(SessionEvent::ValidationChanged(result));
                Ok(())
            }
            Err(e) if e.message == NOTHING_TO_FORMAT_MESSAGE => {
                self.set_status(StatusLine::error(NOTHING_TO_FORMAT_MESSAGE));
                Err(ClientError::Parse(e.message))
            }
            Err(e) => {
                self.set_status(StatusLine::error(format!("Unable to format: {}", e)));
                Err(ClientError::Parse(e.message))
            }
        }
    }

    /// Send the outbound buffer
    pub fn send(&mut self) -> Result<(), ClientError> {
        let text = self.pipeline.buffer().to_string();
        self.send_text(&text)
    }

    /// Send `text` as-is, bypassing the buffer
    pub fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        if !self.state().is_connected() {
            return Err(self.report(ClientError::NotConnected));
        }
        if let Err(e) = self.pipeline.check_outbound(text) {
            return Err(self.report(e));
        }
        if let Err(e) = self.controller.transmit(text) {
            return Err(self.report(e));
        }

        let entry = self.pipeline.record_sent(text).clone();
        self.emit(SessionEvent::LogAppended(entry));
        Ok(())
    }

    pub fn clear_log(&mut self) {
        self.pipeline.clear_log();
        self.emit(SessionEvent::LogCleared);
        self.set_status(StatusLine::info(LOG_CLEARED_STATUS));
    }

    /// Apply every notice that has already arrived. Returns how many.
    pub fn pump_notices(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(notice) = self.notices.try_recv() {
            self.handle_notice(notice);
            handled += 1;
        }
        handled
    }

    /// Wait for the next notice and apply it
    pub async fn next_notice(&mut self) -> Option<TransportEvent> {
        let notice = self.notices.recv().await?;
        let event = notice.event.clone();
        self.handle_notice(notice);
        Some(event)
    }

    /// Apply one transport notice
    pub fn handle_notice(&mut self, notice: TransportNotice) {
        let TransportNotice { connection, event } = notice;
        match event {
            TransportEvent::Opened => self.on_opened(connection),
            TransportEvent::Message(raw) => self.on_message(connection, &raw),
            TransportEvent::Error(message) => self.on_error(connection, &message),
            TransportEvent::Closed { code, reason } => self.on_closed(connection, code, &reason),
        }
    }

    fn on_opened(&mut self, id: ConnectionId) {
        if !self.controller.on_opened(id) {
            return;
        }
        self.emit_state();
        let url = self.controller.url().unwrap_or_default().to_string();
        self.set_status(StatusLine::new(
            format!("Connected to {}", url),
            StatusLevel::Connected,
        ));
        // The gate may open now that the connection is live
        let result = self.pipeline.revalidate().clone();
        self.emit(SessionEvent::ValidationChanged(result));
    }

    fn on_message(&mut self, id: ConnectionId, raw: &str) {
        // Frames can still drain from a handle that is closing gracefully
        if !self.controller.owns(id) {
            warn!("Dropping message from stale connection {}", id);
            return;
        }
        let entry = self.pipeline.on_receive(raw).clone();
        self.emit(SessionEvent::LogAppended(entry));
    }

    fn on_error(&mut self, id: ConnectionId, message: &str) {
        if !self.controller.on_error(id, message) {
            return;
        }
        let err = ClientError::Transport(message.to_string());
        error!("{}", err);
        self.emit_state();
        self.set_status(StatusLine::error(err.to_string()));
    }

    fn on_closed(&mut self, id: ConnectionId, code: u16, reason: &str) {
        if !self.controller.on_closed(id, code, reason) {
            return;
        }
        self.emit_state();
        self.set_status(StatusLine::info(self.state().to_string()));
    }

    /// Surface an intent failure on the status line and hand it back
    fn report(&mut self, err: ClientError) -> ClientError {
        info!("Rejected: {}", err);
        self.set_status(StatusLine::error(err.to_string()));
        err
    }

    fn set_status(&mut self, status: StatusLine) {
        self.status = status.clone();
        self.emit(SessionEvent::StatusChanged(status));
    }

    fn emit_state(&self) {
        self.emit(SessionEvent::StateChanged(self.state().clone()));
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}
