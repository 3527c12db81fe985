use super::{ConnectionHandle, ConnectionId, Connector, NoticeSender, TransportEvent, TransportNotice};
use crate::error::ClientError;
use std::sync::{Arc, Mutex};

/// Everything the recording connector and its handles were asked to do
#[derive(Debug, Default)]
pub struct Calls {
    pub opened: Vec<(ConnectionId, String)>,
    pub sent: Vec<String>,
    pub closes: Vec<(u16, String)>,
    pub releases: usize,
    notices: Option<NoticeSender>,
}

/// Connector that records calls and lets tests raise notices by hand
#[derive(Clone, Default)]
pub struct RecordingConnector {
    calls: Arc<Mutex<Calls>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().expect("calls lock poisoned")
    }

    /// Id of the most recently opened connection
    pub fn last_id(&self) -> ConnectionId {
        self.calls().opened.last().expect("nothing opened").0
    }

    /// Raise `event` for connection `id`
    pub fn notify(&self, id: ConnectionId, event: TransportEvent) {
        let calls = self.calls();
        let notices = calls.notices.as_ref().expect("nothing opened");
        notices
            .send(TransportNotice::new(id, event))
            .expect("session dropped");
    }
}

impl Connector for RecordingConnector {
    fn open(
        &self,
        id: ConnectionId,
        url: &str,
        notices: NoticeSender,
    ) -> Box<dyn ConnectionHandle> {
        let mut calls = self.calls();
        calls.opened.push((id, url.to_string()));
        calls.notices = Some(notices);
        Box::new(RecordingHandle {
            calls: self.calls.clone(),
        })
    }
}

struct RecordingHandle {
    calls: Arc<Mutex<Calls>>,
}

impl RecordingHandle {
    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().expect("calls lock poisoned")
    }
}

impl ConnectionHandle for RecordingHandle {
    fn send(&mut self, text: &str) -> Result<(), ClientError> {
        self.calls().sent.push(text.to_string());
        Ok(())
    }

    fn close(&mut self, code: u16, reason: &str) {
        self.calls().closes.push((code, reason.to_string()));
    }

    fn release(&mut self) {
        self.calls().releases += 1;
    }
}
