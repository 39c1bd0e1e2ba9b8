//! Pending audio and image attachments for the next chat message.

use std::path::Path;

use frames::ImageAttachment;
use tracing::debug;

use crate::error::ClientError;

/// MIME type of audio captured by the recorder.
pub const RECORDED_AUDIO_MIME: &str = "audio/webm";

/// At most one audio clip and one image waiting to be sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttachmentDraft {
    audio: Option<Vec<u8>>,
    image: Option<ImageAttachment>,
}

impl AttachmentDraft {
    /// Replace the pending audio clip.
    pub fn set_audio(&mut self, bytes: Vec<u8>) {
        self.audio = Some(bytes);
    }

    /// Replace the pending image.
    pub fn set_image(&mut self, image: ImageAttachment) {
        self.image = Some(image);
    }

    pub fn cancel_audio(&mut self) {
        self.audio = None;
    }

    pub fn cancel_image(&mut self) {
        self.image = None;
    }

    #[must_use]
    pub fn audio(&self) -> Option<&[u8]> {
        self.audio.as_deref()
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.image.is_none()
    }

    /// Take both attachments, leaving the draft empty.
    pub fn take(&mut self) -> (Option<Vec<u8>>, Option<ImageAttachment>) {
        (self.audio.take(), self.image.take())
    }
}

/// Read an audio clip from disk.
///
/// # Errors
///
/// Returns [`ClientError::Io`] if the file cannot be read.
pub async fn load_audio(path: &Path) -> Result<Vec<u8>, ClientError> {
    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), len = bytes.len(), "loaded audio attachment");
    Ok(bytes)
}

/// Read an image from disk, inferring its MIME type from the extension.
///
/// # Errors
///
/// Returns [`ClientError::UnsupportedAttachment`] for unknown extensions and
/// [`ClientError::Io`] if the file cannot be read.
pub async fn load_image(path: &Path) -> Result<ImageAttachment, ClientError> {
    let mime_type = image_mime_for(path)?;
    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), len = bytes.len(), mime_type, "loaded image attachment");
    Ok(ImageAttachment { bytes, mime_type: mime_type.to_owned() })
}

/// MIME type for an image path, by extension.
///
/// # Errors
///
/// Returns [`ClientError::UnsupportedAttachment`] if the extension is not a
/// known image type.
pub fn image_mime_for(path: &Path) -> Result<&'static str, ClientError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(ClientError::UnsupportedAttachment(path.display().to_string())),
    }
}

#[cfg(test)]
#[path = "attachments_test.rs"]
mod tests;
