//! Crate-level error type.

/// Errors surfaced by the session, HTTP, state and preference layers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL is not `http://` or `https://`.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    /// A send was attempted while the websocket was not open.
    #[error("websocket is not open")]
    NotConnected,
    /// The websocket handshake or transport failed.
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    /// The handshake did not finish within the connect timeout.
    #[error("timed out connecting to {0}")]
    ConnectTimeout(String),
    /// An HTTP request failed before a response was received.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} for {path}")]
    HttpStatus { status: u16, path: String },
    /// A header value (session cookie) contained invalid characters.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    /// Encoding or decoding a wire frame failed.
    #[error("frame codec error: {0}")]
    Codec(#[from] frames::CodecError),
    /// Reading an attachment or the preference file failed.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Preference data could not be (de)serialized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The attachment file type is not recognized.
    #[error("unsupported attachment: {0}")]
    UnsupportedAttachment(String),
    /// A required tool input was left empty.
    #[error("missing required input `{0}`")]
    MissingInput(String),
    /// There is no open tool-inputs form to act on.
    #[error("no pending input request")]
    NoInputRequest,
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WsConnect(Box::new(error))
    }
}
