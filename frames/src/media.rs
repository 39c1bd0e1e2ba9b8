//! Attachment framing codec.
//!
//! A chat message with audio and/or image attachments is sent as one binary
//! frame:
//!
//! ```text
//! +-----------+----------------+-----+-------------+-------------+
//! | len (u32) | metadata JSON  | '|' | audio bytes | image bytes |
//! | 4 bytes BE| len bytes      | 1   | audio_size  | image_size  |
//! +-----------+----------------+-----+-------------+-------------+
//! ```
//!
//! The metadata boundary always comes from the length header, never from
//! searching for `|`: message text may legally contain that byte. The
//! separator is kept as a boundary check so that frames are still readable
//! by eye and so legacy frames (no header) share the same tail layout.
//!
//! Legacy frames start directly with the JSON object. They are decoded by
//! parsing the first JSON value and using its byte length as the split
//! point, which gives the same guarantee without a header.

use serde::{Deserialize, Serialize};

use crate::protocol::PlainChat;
use crate::{CodecError, OutboundFrame, de};

/// Byte between the metadata segment and the binary payloads.
pub const SEPARATOR: u8 = b'|';

/// Size of the big-endian metadata length header.
pub const HEADER_LEN: usize = 4;

/// JSON envelope describing an outgoing chat message and its attachments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(deserialize_with = "de::flag")]
    pub use_tools: bool,
    #[serde(deserialize_with = "de::flag")]
    pub extract_inputs: bool,
    /// Byte length of the audio segment, `None` when no audio is attached.
    pub audio_size: Option<u64>,
    /// Byte length of the image segment, `None` when no image is attached.
    pub image_size: Option<u64>,
    /// MIME type of the attached image.
    pub image_type: Option<String>,
    pub message: String,
}

/// Image bytes plus the MIME type reported by the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Everything the user submitted for one chat message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatSubmission {
    pub message: String,
    pub use_tools: bool,
    pub extract_inputs: bool,
    pub audio: Option<Vec<u8>>,
    pub image: Option<ImageAttachment>,
}

impl ChatSubmission {
    /// Returns `true` if any binary attachment is present.
    #[must_use]
    pub fn has_attachment(&self) -> bool {
        self.audio.is_some() || self.image.is_some()
    }
}

/// A decoded attachment frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFrame {
    pub metadata: MediaMetadata,
    pub audio: Option<Vec<u8>>,
    pub image: Option<Vec<u8>>,
}

/// Encode a submission into the frame the transport should send.
///
/// Without attachments this is a plain JSON text frame with exactly
/// `message`, `use_tools` and `extract_inputs`. With at least one
/// attachment it is a binary frame in the layout described at module level.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails and
/// [`CodecError::MetadataTooLarge`] if the metadata exceeds `u32::MAX` bytes.
pub fn encode_chat_message(submission: &ChatSubmission) -> Result<OutboundFrame, CodecError> {
    if !submission.has_attachment() {
        let plain = PlainChat {
            message: submission.message.clone(),
            use_tools: submission.use_tools,
            extract_inputs: submission.extract_inputs,
        };
        return Ok(OutboundFrame::Text(serde_json::to_string(&plain)?));
    }

    let frame = MediaFrame {
        metadata: MediaMetadata {
            use_tools: submission.use_tools,
            extract_inputs: submission.extract_inputs,
            audio_size: None,
            image_size: None,
            image_type: submission.image.as_ref().map(|image| image.mime_type.clone()),
            message: submission.message.clone(),
        },
        audio: submission.audio.clone(),
        image: submission.image.as_ref().map(|image| image.bytes.clone()),
    };
    encode_media_frame(&frame).map(OutboundFrame::Binary)
}

/// Encode a media frame in the length-prefixed layout.
///
/// The payloads are authoritative: `audio_size` and `image_size` are
/// rewritten from the attached byte lengths before serialization.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails and
/// [`CodecError::MetadataTooLarge`] if the metadata exceeds `u32::MAX` bytes.
pub fn encode_media_frame(frame: &MediaFrame) -> Result<Vec<u8>, CodecError> {
    let mut metadata = frame.metadata.clone();
    metadata.audio_size = frame.audio.as_ref().map(|bytes| bytes.len() as u64);
    metadata.image_size = frame.image.as_ref().map(|bytes| bytes.len() as u64);
    if frame.image.is_none() {
        metadata.image_type = None;
    }

    let json = serde_json::to_vec(&metadata)?;
    let len = u32::try_from(json.len()).map_err(|_| CodecError::MetadataTooLarge(json.len()))?;

    let audio = frame.audio.as_deref().unwrap_or_default();
    let image = frame.image.as_deref().unwrap_or_default();
    let mut out = Vec::with_capacity(HEADER_LEN + json.len() + 1 + audio.len() + image.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&json);
    out.push(SEPARATOR);
    out.extend_from_slice(audio);
    out.extend_from_slice(image);
    Ok(out)
}

/// Decode a length-prefixed media frame.
///
/// # Errors
///
/// Returns a [`CodecError`] describing the first structural problem found.
pub fn decode_media_frame(bytes: &[u8]) -> Result<MediaFrame, CodecError> {
    let header: [u8; HEADER_LEN] = bytes
        .get(..HEADER_LEN)
        .and_then(|head| head.try_into().ok())
        .ok_or(CodecError::Truncated { expected: HEADER_LEN, available: bytes.len() })?;
    let declared = u32::from_be_bytes(header) as usize;

    let body = &bytes[HEADER_LEN..];
    let json = body
        .get(..declared)
        .ok_or(CodecError::MetadataOutOfBounds { declared, available: body.len() })?;
    let metadata: MediaMetadata = serde_json::from_slice(json)?;

    split_payloads(metadata, bytes, HEADER_LEN + declared)
}

/// Decode a legacy frame: metadata JSON, `|`, audio, image, with no header.
///
/// The metadata boundary is the byte length of the leading JSON object, so a
/// `|` inside the message text cannot cause a mis-split.
///
/// # Errors
///
/// Returns a [`CodecError`] describing the first structural problem found.
pub fn decode_legacy_media_frame(bytes: &[u8]) -> Result<MediaFrame, CodecError> {
    let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<MediaMetadata>();
    let metadata = match stream.next() {
        Some(result) => result?,
        None => return Err(CodecError::Truncated { expected: 1, available: bytes.len() }),
    };
    let end = stream.byte_offset();

    split_payloads(metadata, bytes, end)
}

/// Decode either layout.
///
/// Legacy frames begin with `{` (optionally preceded by JSON whitespace). A
/// length header can only begin with one of those bytes if the metadata is
/// hundreds of megabytes long, so the first byte is a reliable discriminator.
///
/// # Errors
///
/// Returns a [`CodecError`] from the selected decoder.
pub fn decode_any_media_frame(bytes: &[u8]) -> Result<MediaFrame, CodecError> {
    match bytes.first() {
        Some(b'{' | b' ' | b'\t' | b'\n' | b'\r') => decode_legacy_media_frame(bytes),
        _ => decode_media_frame(bytes),
    }
}

fn split_payloads(
    metadata: MediaMetadata,
    bytes: &[u8],
    metadata_end: usize,
) -> Result<MediaFrame, CodecError> {
    if bytes.get(metadata_end) != Some(&SEPARATOR) {
        return Err(CodecError::MissingSeparator { offset: metadata_end });
    }
    let mut rest = &bytes[metadata_end + 1..];

    let audio = match metadata.audio_size {
        Some(size) => {
            let (segment, tail) = take_segment(rest, size, "audio")?;
            rest = tail;
            Some(segment.to_vec())
        }
        None => None,
    };

    let image = match metadata.image_size {
        Some(size) => {
            let (segment, tail) = take_segment(rest, size, "image")?;
            if !tail.is_empty() {
                return Err(CodecError::TrailingBytes { count: tail.len() });
            }
            Some(segment.to_vec())
        }
        None if rest.is_empty() => None,
        None => Some(rest.to_vec()),
    };

    Ok(MediaFrame { metadata, audio, image })
}

fn take_segment<'a>(
    rest: &'a [u8],
    declared: u64,
    segment: &'static str,
) -> Result<(&'a [u8], &'a [u8]), CodecError> {
    let size = usize::try_from(declared).map_err(|_| CodecError::SizeOverflow(declared))?;
    if size > rest.len() {
        return Err(CodecError::SegmentOutOfBounds { segment, declared, available: rest.len() });
    }
    Ok(rest.split_at(size))
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
