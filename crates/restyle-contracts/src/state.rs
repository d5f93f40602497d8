use serde::Serialize;

use crate::image::{EncodedImage, ImageRole};

pub const GENERATION_FAILED_TEXT: &str = "Generation failed.";

/// What one generate round trip produced. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub image: Option<EncodedImage>,
    pub text: Option<String>,
}

impl GenerationResult {
    /// The result stored when a round trip fails. Replaces, never merges.
    pub fn failed() -> Self {
        Self {
            image: None,
            text: Some(GENERATION_FAILED_TEXT.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }
}

/// The single source of truth for one session.
///
/// Fields are read-only from outside; every change goes through the
/// setters below so `is_loading` is only true between
/// [`AppState::begin_generation`] and [`AppState::complete_generation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    input_image: Option<EncodedImage>,
    concept_image: Option<EncodedImage>,
    is_loading: bool,
    result: GenerationResult,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_image(&self) -> Option<&EncodedImage> {
        self.input_image.as_ref()
    }

    pub fn concept_image(&self) -> Option<&EncodedImage> {
        self.concept_image.as_ref()
    }

    pub fn image(&self, role: ImageRole) -> Option<&EncodedImage> {
        match role {
            ImageRole::Input => self.input_image(),
            ImageRole::Concept => self.concept_image(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    /// Overwrites the slot for `role`. The previous image is dropped.
    pub fn set_image(&mut self, role: ImageRole, image: EncodedImage) {
        match role {
            ImageRole::Input => self.input_image = Some(image),
            ImageRole::Concept => self.concept_image = Some(image),
        }
    }

    /// Both slots filled and nothing in flight.
    pub fn can_generate(&self) -> bool {
        self.input_image.is_some() && self.concept_image.is_some() && !self.is_loading
    }

    /// Clones the two images for a request, or `None` when generating is not allowed.
    pub fn generation_inputs(&self) -> Option<(EncodedImage, EncodedImage)> {
        if !self.can_generate() {
            return None;
        }
        match (&self.input_image, &self.concept_image) {
            (Some(input), Some(concept)) => Some((input.clone(), concept.clone())),
            _ => None,
        }
    }

    pub fn begin_generation(&mut self) {
        self.result = GenerationResult::default();
        self.is_loading = true;
    }

    pub fn complete_generation(&mut self, result: GenerationResult) {
        self.result = result;
        self.is_loading = false;
    }
}
