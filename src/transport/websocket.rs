use super::{
    ConnectionHandle, ConnectionId, Connector, NoticeSender, TransportEvent, TransportNotice,
    CLOSE_ABNORMAL, CLOSE_NO_STATUS,
};
use crate::error::ClientError;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Commands the session sends to a running connection task
#[derive(Debug)]
enum Command {
    Send(String),
    Close { code: u16, reason: String },
}

/// Opens WebSocket connections on a tokio runtime
#[derive(Clone)]
pub struct WsConnector {
    runtime: Handle,
}

impl WsConnector {
    /// Create a connector that spawns connection tasks on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Connector for WsConnector {
    fn open(
        &self,
        id: ConnectionId,
        url: &str,
        notices: NoticeSender,
    ) -> Box<dyn ConnectionHandle> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = self
            .runtime
            .spawn(run_connection(id, url.to_string(), command_rx, notices));

        Box::new(WsHandle {
            commands: command_tx,
            task,
        })
    }
}

/// Handle to a connection task
struct WsHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl ConnectionHandle for WsHandle {
    fn send(&mut self, text: &str) -> Result<(), ClientError> {
        self.commands
            .send(Command::Send(text.to_string()))
            .map_err(|_| ClientError::Transport("connection task has stopped".to_string()))
    }

    fn close(&mut self, code: u16, reason: &str) {
        let _ = self.commands.send(Command::Close {
            code,
            reason: reason.to_string(),
        });
    }

    fn release(&mut self) {
        self.task.abort();
    }
}

impl Drop for WsHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drive one WebSocket connection until it closes
async fn run_connection(
    id: ConnectionId,
    url: String,
    mut commands: mpsc::UnboundedReceiver<Command>,
    notices: NoticeSender,
) {
    let notify = |event: TransportEvent| {
        // The session may already be gone during shutdown
        let _ = notices.send(TransportNotice::new(id, event));
    };

    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            error!("Failed to connect to {}: {}", url, e);
            notify(TransportEvent::Error(e.to_string()));
            notify(TransportEvent::Closed {
                code: CLOSE_ABNORMAL,
                reason: String::new(),
            });
            return;
        }
    };

    info!("Connection {} open to {}", id, url);
    notify(TransportEvent::Opened);

    let (mut sink, mut source) = stream.split();
    let mut commands_open = true;

    loop {
        tokio::select! {
            command = commands.recv(), if commands_open => match command {
                Some(Command::Send(text)) => {
                    debug!("Connection {} sending {} bytes", id, text.len());
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        error!("Error writing message: {}", e);
                        notify(TransportEvent::Error(e.to_string()));
                        notify(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: String::new(),
                        });
                        return;
                    }
                }
                Some(Command::Close { code, reason }) => {
                    debug!("Connection {} closing with code {}", id, code);
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.into(),
                    };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        error!("Error sending close frame: {}", e);
                    }
                }
                None => commands_open = false,
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => notify(TransportEvent::Message(text)),
                Some(Ok(Message::Binary(data))) => {
                    notify(TransportEvent::Message(String::from_utf8_lossy(&data).into_owned()))
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                        None => (CLOSE_NO_STATUS, String::new()),
                    };
                    info!("Connection {} closed by peer: {} {}", id, code, reason);
                    // Flushes the close reply; the peer may already be gone
                    let _ = sink.close().await;
                    notify(TransportEvent::Closed { code, reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("Error reading message: {}", e);
                    notify(TransportEvent::Error(e.to_string()));
                    notify(TransportEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    return;
                }
                None => {
                    notify(TransportEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    return;
                }
            },
        }
    }
}
