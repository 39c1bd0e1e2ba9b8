//! Shared wire model for the `/ws/chat` channel.
//!
//! This crate owns the wire representation used by the chat client and by
//! whatever backend decodes its traffic. Two things travel over the socket:
//!
//! - JSON text frames, typed by [`protocol::ClientMessage`],
//!   [`protocol::PlainChat`] and [`protocol::ServerMessage`].
//! - Binary attachment frames, produced by [`media::encode_chat_message`]
//!   whenever a chat message carries audio or image bytes.
//!
//! The split between the two is decided per message: binary framing only
//! activates when an attachment exists.

mod de;
pub mod media;
pub mod protocol;

pub use media::{
    ChatSubmission, ImageAttachment, MediaFrame, MediaMetadata, SEPARATOR, decode_any_media_frame,
    decode_legacy_media_frame, decode_media_frame, encode_chat_message, encode_media_frame,
};
pub use protocol::{
    ClientMessage, ClientText, GptModel, HistoryEntry, JournalEntry, NotificationKind, PlainChat,
    ServerMessage, Transaction, decode_client_text, decode_server_message, encode_request,
};

/// Error returned by the encoders and decoders in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The buffer ended before a fixed-size field could be read.
    #[error("frame truncated: needed {expected} bytes, {available} available")]
    Truncated { expected: usize, available: usize },
    /// The length header points past the end of the buffer.
    #[error("metadata length {declared} exceeds remaining {available} bytes")]
    MetadataOutOfBounds { declared: usize, available: usize },
    /// The serialized metadata does not fit the 4-byte length header.
    #[error("metadata of {0} bytes does not fit the length header")]
    MetadataTooLarge(usize),
    /// Metadata or message JSON failed to (de)serialize.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The byte after the metadata segment is not the `|` separator.
    #[error("missing separator at offset {offset}")]
    MissingSeparator { offset: usize },
    /// A declared attachment size is larger than the bytes left in the frame.
    #[error("{segment} segment of {declared} bytes exceeds remaining {available} bytes")]
    SegmentOutOfBounds { segment: &'static str, declared: u64, available: usize },
    /// Bytes remain after every declared segment was consumed.
    #[error("{count} trailing bytes after image segment")]
    TrailingBytes { count: usize },
    /// A declared size does not fit in `usize` on this platform.
    #[error("declared size {0} does not fit in memory")]
    SizeOverflow(u64),
}

/// A single outbound websocket frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundFrame {
    /// JSON text frame.
    Text(String),
    /// Attachment frame built by [`media::encode_media_frame`].
    Binary(Vec<u8>),
}

impl OutboundFrame {
    /// Returns `true` for binary attachment frames.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Size of the frame body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the frame body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
