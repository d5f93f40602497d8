use serde::Serialize;

use crate::state::AppState;

/// Render instructions for the view adapter. Carries no state of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub show_input_preview: bool,
    pub show_concept_preview: bool,
    pub input_preview_data_uri: Option<String>,
    pub concept_preview_data_uri: Option<String>,
    pub generate_enabled: bool,
    pub show_loader: bool,
    pub show_result_placeholder: bool,
    pub show_result_image: bool,
    pub result_image_data_uri: Option<String>,
    pub result_text: Option<String>,
}

impl ViewModel {
    pub fn without_generation(mut self) -> Self {
        self.generate_enabled = false;
        self
    }
}

pub fn project(state: &AppState) -> ViewModel {
    let loading = state.is_loading();
    let result = state.result();
    let result_image = if loading { None } else { result.image.as_ref() };

    ViewModel {
        show_input_preview: state.input_image().is_some(),
        show_concept_preview: state.concept_image().is_some(),
        input_preview_data_uri: state.input_image().map(|image| image.data_uri()),
        concept_preview_data_uri: state.concept_image().map(|image| image.data_uri()),
        generate_enabled: state.can_generate(),
        show_loader: loading,
        show_result_placeholder: !loading && result_image.is_none(),
        show_result_image: result_image.is_some(),
        result_image_data_uri: result_image.map(|image| image.data_uri()),
        result_text: if loading { None } else { result.text.clone() },
    }
}

#[cfg(test)]
mod tests {
    use super::project;
    use crate::image::{EncodedImage, ImageRole};
    use crate::state::{AppState, GenerationResult};

    fn png(data: &str) -> EncodedImage {
        EncodedImage::from_base64(data, "image/png").unwrap()
    }

    #[test]
    fn empty_state_shows_only_placeholder() {
        let view = project(&AppState::new());
        assert!(!view.show_input_preview);
        assert!(!view.show_concept_preview);
        assert!(!view.generate_enabled);
        assert!(!view.show_loader);
        assert!(view.show_result_placeholder);
        assert!(!view.show_result_image);
        assert_eq!(view.result_image_data_uri, None);
        assert_eq!(view.result_text, None);
    }

    #[test]
    fn generate_enabled_iff_both_images_and_idle() {
        for input_set in [false, true] {
            for concept_set in [false, true] {
                for loading in [false, true] {
                    let mut state = AppState::new();
                    if input_set {
                        state.set_image(ImageRole::Input, png("AAAA"));
                    }
                    if concept_set {
                        state.set_image(ImageRole::Concept, png("BBBB"));
                    }
                    if loading {
                        state.begin_generation();
                    }
                    let view = project(&state);
                    assert_eq!(view.generate_enabled, input_set && concept_set && !loading);
                    assert_eq!(view.show_input_preview, input_set);
                    assert_eq!(view.show_concept_preview, concept_set);
                    assert_eq!(view.show_loader, loading);
                }
            }
        }
    }

    #[test]
    fn loading_hides_result_and_placeholder() {
        let mut state = AppState::new();
        state.set_image(ImageRole::Input, png("AAAA"));
        state.set_image(ImageRole::Concept, png("BBBB"));
        state.begin_generation();

        let view = project(&state);
        assert!(view.show_loader);
        assert!(!view.show_result_placeholder);
        assert!(!view.show_result_image);
        assert_eq!(view.result_text, None);
    }

    #[test]
    fn finished_result_is_projected_as_data_uri_and_text() {
        let mut state = AppState::new();
        state.complete_generation(GenerationResult {
            image: Some(png("CCCC")),
            text: Some("Applied impressionist palette".to_string()),
        });

        let view = project(&state);
        assert!(view.show_result_image);
        assert!(!view.show_result_placeholder);
        assert_eq!(
            view.result_image_data_uri.as_deref(),
            Some("data:image/png;base64,CCCC")
        );
        assert_eq!(
            view.result_text.as_deref(),
            Some("Applied impressionist palette")
        );
    }

    #[test]
    fn text_only_result_keeps_placeholder() {
        let mut state = AppState::new();
        state.complete_generation(GenerationResult::failed());
        let view = project(&state);
        assert!(view.show_result_placeholder);
        assert!(!view.show_result_image);
        assert_eq!(view.result_text.as_deref(), Some("Generation failed."));
    }

    #[test]
    fn without_generation_only_touches_the_button() {
        let mut state = AppState::new();
        state.set_image(ImageRole::Input, png("AAAA"));
        state.set_image(ImageRole::Concept, png("BBBB"));
        let view = project(&state);
        let disabled = view.clone().without_generation();
        assert!(view.generate_enabled);
        assert!(!disabled.generate_enabled);
        assert_eq!(disabled.input_preview_data_uri, view.input_preview_data_uri);
    }
}
