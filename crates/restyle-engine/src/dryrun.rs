use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use restyle_contracts::errors::GenerationError;
use restyle_contracts::image::EncodedImage;
use restyle_contracts::state::GenerationResult;
use sha2::{Digest, Sha256};

use crate::client::{CancelToken, GenerationClient};

const DRYRUN_SIDE: u32 = 256;

/// Offline client: answers with a flat PNG whose colour is derived from
/// both inputs, plus a short note. Same inputs give the same image.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryrunClient;

impl DryrunClient {
    fn render(input: &EncodedImage, concept: &EncodedImage) -> Result<Vec<u8>> {
        let (r, g, b) = color_from_inputs(input, concept);
        let mut canvas = RgbImage::new(DRYRUN_SIDE, DRYRUN_SIDE);
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("dryrun png encode failed")?;
        Ok(bytes)
    }
}

impl GenerationClient for DryrunClient {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate(
        &self,
        input: &EncodedImage,
        concept: &EncodedImage,
        cancel: &CancelToken,
    ) -> Result<GenerationResult, GenerationError> {
        cancel.check()?;
        let bytes = Self::render(input, concept)
            .map_err(|err| GenerationError::Request(format!("{err:#}")))?;
        let (r, g, b) = color_from_inputs(input, concept);
        Ok(GenerationResult {
            image: EncodedImage::from_bytes(&bytes, "image/png"),
            text: Some(format!(
                "Dry run: {} content image restyled with {} palette #{r:02x}{g:02x}{b:02x}.",
                input.mime_type(),
                concept.mime_type()
            )),
        })
    }
}

fn color_from_inputs(input: &EncodedImage, concept: &EncodedImage) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(input.data().as_bytes());
    hasher.update(concept.data().as_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}
