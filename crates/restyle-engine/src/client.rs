use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use restyle_contracts::errors::GenerationError;
use restyle_contracts::image::{is_image_mime, EncodedImage, DEFAULT_IMAGE_MIME};
use restyle_contracts::state::GenerationResult;
use serde_json::{json, Value};

pub const STYLE_TRANSFER_INSTRUCTION: &str = "The first image is the content image and the \
second image is the style reference. Redraw the first image using only the visual style of \
the second image: its color palette, brushwork, texture, lighting and overall artistic \
treatment. Keep the subject, composition and layout of the first image exactly as they are. \
Do not add, remove or blend in any objects, people or subject matter from the second image.";

/// Shared flag a caller can flip to abandon a generate call.
///
/// Nothing cancels by default; clients check the flag around their
/// network call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), GenerationError> {
        if self.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }
        Ok(())
    }
}

/// One content + style round trip against a generation service.
pub trait GenerationClient: Send + Sync {
    fn name(&self) -> &str;
    fn generate(
        &self,
        input: &EncodedImage,
        concept: &EncodedImage,
        cancel: &CancelToken,
    ) -> Result<GenerationResult, GenerationError>;
}

fn inline_part(image: &EncodedImage) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type(),
            "data": image.data(),
        }
    })
}

/// `generateContent` body: content image, style image, then the instruction.
pub(crate) fn build_request_body(input: &EncodedImage, concept: &EncodedImage) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                inline_part(input),
                inline_part(concept),
                { "text": STYLE_TRANSFER_INSTRUCTION },
            ],
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE", "TEXT"],
        },
    })
}

/// Folds every response part into one result. Later text parts replace
/// earlier ones, and likewise for image parts.
pub(crate) fn result_from_response(payload: &Value) -> Result<GenerationResult> {
    let mut result = GenerationResult::default();
    let candidates = payload
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for candidate in candidates {
        let parts = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                result.text = Some(text.to_string());
            }
            let Some(inline) = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(Value::as_object)
            else {
                continue;
            };
            let data = inline
                .get("data")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if data.is_empty() {
                continue;
            }
            BASE64
                .decode(data.as_bytes())
                .context("response image is not valid base64")?;
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .filter(|mime| is_image_mime(mime))
                .unwrap_or(DEFAULT_IMAGE_MIME);
            result.image = EncodedImage::from_base64(data, mime_type);
        }
    }

    Ok(result)
}
