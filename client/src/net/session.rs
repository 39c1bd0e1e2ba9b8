//! Websocket session for the `/ws/chat` channel.
//!
//! A session splits the socket into a writer task fed by an unbounded
//! channel and a reader task that decodes inbound JSON into
//! [`SessionEvent`]s. The owner of the session never touches the socket.
//!
//! ERROR HANDLING
//! ==============
//! Malformed or unrecognized payloads are logged and skipped. Transport
//! failures close the session and emit [`SessionEvent::Closed`] once; there
//! is no reconnect, the user has to start a new session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use frames::{ClientMessage, OutboundFrame, ServerMessage};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::Transport;
use crate::config::ClientConfig;
use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Something the reader task observed on the socket.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Message(ServerMessage),
    /// The socket closed. Emitted once, always last.
    Closed,
}

pub struct ChatSession {
    outbound: mpsc::UnboundedSender<Message>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    open: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ChatSession {
    /// Connect to the chat channel described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the cookie header is
    /// malformed, the handshake fails, or it exceeds the connect timeout.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let url = config.ws_url()?;
        let mut request = url.as_str().into_client_request()?;
        if let Some(cookie) = &config.session_cookie {
            request.headers_mut().insert(COOKIE, HeaderValue::from_str(cookie)?);
        }

        let (stream, _) = tokio::time::timeout(config.connect_timeout, connect_async(request))
            .await
            .map_err(|_| ClientError::ConnectTimeout(url.clone()))??;
        info!(%url, "chat websocket connected");

        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: WsStream) -> Self {
        let (sink, stream) = stream.split();
        let open = Arc::new(AtomicBool::new(true));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(write_loop(sink, outbound_rx, Arc::clone(&open)));
        let reader = tokio::spawn(read_loop(stream, events_tx, Arc::clone(&open)));

        Self { outbound: outbound_tx, events: events_rx, open, reader, writer }
    }

    /// Serialize and send a typed request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session is closed.
    pub fn send_request(&self, request: &ClientMessage) -> Result<(), ClientError> {
        self.send(OutboundFrame::Text(frames::encode_request(request)?))
    }

    /// Wait for the next event. Returns `None` once the reader has finished
    /// and every event has been consumed.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Send a close frame and give both tasks a grace period to finish.
    pub async fn close(mut self) {
        if self.is_open() {
            let _ = self.outbound.send(Message::Close(None));
        }
        let _ = tokio::time::timeout(CLOSE_GRACE, &mut self.writer).await;
        let _ = tokio::time::timeout(CLOSE_GRACE, &mut self.reader).await;
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

impl Transport for ChatSession {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send(&self, frame: OutboundFrame) -> Result<(), ClientError> {
        if !self.is_open() {
            return Err(ClientError::NotConnected);
        }
        let message = match frame {
            OutboundFrame::Text(text) => Message::Text(text.into()),
            OutboundFrame::Binary(bytes) => Message::Binary(bytes.into()),
        };
        self.outbound.send(message).map_err(|_| ClientError::NotConnected)
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    open: Arc<AtomicBool>,
) {
    while let Some(message) = outbound.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(error) = sink.send(message).await {
            warn!(%error, "websocket send failed");
            break;
        }
        if closing {
            break;
        }
    }
    open.store(false, Ordering::SeqCst);
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    events: mpsc::UnboundedSender<SessionEvent>,
    open: Arc<AtomicBool>,
) {
    while let Some(next) = stream.next().await {
        match next {
            Ok(Message::Text(text)) => match frames::decode_server_message(text.as_str()) {
                Ok(ServerMessage::Unknown) => {
                    warn!(payload = %text.as_str(), "unrecognized payload from websocket");
                }
                Ok(message) => {
                    if events.send(SessionEvent::Message(message)).is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "malformed payload from websocket"),
            },
            Ok(Message::Binary(bytes)) => debug!(len = bytes.len(), "ignoring binary frame"),
            Ok(Message::Close(frame)) => {
                info!(?frame, "websocket closed by server");
                break;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(%error, "websocket receive failed");
                break;
            }
        }
    }
    open.store(false, Ordering::SeqCst);
    let _ = events.send(SessionEvent::Closed);
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
