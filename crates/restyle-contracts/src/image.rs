use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Which slot an accepted file lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    /// Supplies the subject matter and composition to keep.
    Input,
    /// Supplies the palette, texture and artistic style to transfer.
    Concept,
}

impl ImageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageRole::Input => "input",
            ImageRole::Concept => "concept",
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageRole {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "input" | "content" => Ok(ImageRole::Input),
            "concept" | "style" => Ok(ImageRole::Concept),
            other => Err(format!("unknown image role '{other}'")),
        }
    }
}

/// Base64 image payload plus its MIME type.
///
/// Only built whole: either both fields are valid or no value exists.
/// `mime_type` always starts with `image/` and `data` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    data: String,
    mime_type: String,
}

impl EncodedImage {
    /// Encodes raw bytes. Returns `None` for empty bytes or a non-image MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Self::from_base64(BASE64.encode(bytes), mime_type)
    }

    /// Wraps an already encoded payload. Returns `None` when `data` is empty
    /// or `mime_type` is not an image type.
    pub fn from_base64(data: impl Into<String>, mime_type: &str) -> Option<Self> {
        let data = data.into();
        let mime_type = mime_type.trim().to_string();
        if data.trim().is_empty() || !is_image_mime(&mime_type) {
            return None;
        }
        Some(Self { data, mime_type })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// File extension matching the MIME type, `png` when unknown.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let lowered = mime_type.to_ascii_lowercase();
    if lowered.contains("jpeg") || lowered.contains("jpg") {
        return "jpg";
    }
    if lowered.contains("webp") {
        return "webp";
    }
    if lowered.contains("gif") {
        return "gif";
    }
    "png"
}
