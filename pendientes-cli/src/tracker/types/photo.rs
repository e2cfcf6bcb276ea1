//! Photo attachments stored inline as data URLs

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// An image attached to an item, kept as a `data:<mime>;base64,...` URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(String);

impl Photo {
    /// Encode raw image bytes as a data URL
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    /// Read an image file from disk.
    ///
    /// Returns `Ok(None)` when the file does not look like an image.
    pub async fn from_file(path: &Path) -> std::io::Result<Option<Self>> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Ok(None);
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Some(Self::from_bytes(mime.essence_str(), &bytes)))
    }

    /// MIME type declared in the data URL, if any
    pub fn mime(&self) -> Option<&str> {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|m| !m.is_empty())
    }

    /// Decode the image bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = self.0.split_once(',').map_or(self.0.as_str(), |(_, p)| p);
        STANDARD.decode(payload)
    }

    /// Approximate decoded size in bytes
    pub fn size_hint(&self) -> usize {
        match self.0.split_once(',') {
            Some((_, payload)) => payload.len() / 4 * 3,
            None => self.0.len(),
        }
    }
}
