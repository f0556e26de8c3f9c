use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Result, StudioError};

/// Opaque handle to a displayable generated image.
///
/// Usually a `data:<mime>;base64,<bytes>` URL as produced by
/// [`ImagenClient`](crate::ImagenClient), but any locator string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap an arbitrary locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Build a data URL from base64-encoded image bytes.
    pub fn from_base64(mime_type: &str, data: &str) -> Self {
        Self(format!("data:{};base64,{}", mime_type, data))
    }

    /// The raw locator string.
    pub fn locator(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// MIME type of a data URL locator, `None` for other locators.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split_once(',')?.0;
        let mime = header.split(';').next().unwrap_or("");
        if mime.is_empty() {
            None
        } else {
            Some(mime)
        }
    }

    /// File extension matching the MIME type (`"jpg"`, `"png"`, ...).
    pub fn file_extension(&self) -> &str {
        match self.mime_type() {
            Some("image/png") => "png",
            Some("image/webp") => "webp",
            Some("image/gif") => "gif",
            _ => "jpg",
        }
    }

    /// Decode the image bytes carried by a base64 data URL.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| StudioError::Decode("locator is not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::Decode("data URL has no payload".into()))?;
        if !header.ends_with(";base64") {
            return Err(StudioError::Decode("data URL is not base64-encoded".into()));
        }
        STANDARD
            .decode(payload)
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Decode and write the image to `path`. Returns the number of bytes written.
    pub fn save(&self, path: &Path) -> Result<usize> {
        let bytes = self.decode()?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
