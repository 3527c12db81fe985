use crate::session::Session;
use log::debug;

/// User intents collected while drawing a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Connect to the given URL
    Connect(String),
    /// Close the connection gracefully
    Disconnect,
    /// The outbound message was edited
    BufferEdited(String),
    /// Pretty-print the outbound message
    Format,
    /// Send the outbound message
    Send,
    /// Empty the message log
    ClearLog,
}

impl AppEvent {
    /// Apply this intent to the session.
    ///
    /// Failures are already shown on the session's status line.
    pub fn apply(self, session: &mut Session) {
        let result = match self {
            AppEvent::Connect(url) => session.connect(&url).map(|_| ()),
            AppEvent::Disconnect => {
                session.disconnect(true);
                Ok(())
            }
            AppEvent::BufferEdited(text) => {
                session.set_buffer(text);
                Ok(())
            }
            AppEvent::Format => session.format_buffer(),
            AppEvent::Send => session.send(),
            AppEvent::ClearLog => {
                session.clear_log();
                Ok(())
            }
        };

        if let Err(e) = result {
            debug!("Intent failed: {}", e);
        }
    }
}
