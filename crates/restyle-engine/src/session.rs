use restyle_contracts::errors::{InputError, ServiceInitError};
use restyle_contracts::events::{EventLog, SessionEvent, SkipReason};
use restyle_contracts::image::ImageRole;
use restyle_contracts::state::{AppState, GenerationResult};
use restyle_contracts::view::{project, ViewModel};

use crate::client::{CancelToken, GenerationClient};
use crate::codec::{encode, SourceFile};

/// Where render passes and user-facing warnings go.
pub trait View {
    fn render(&mut self, view: &ViewModel);
    fn warn(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Preconditions not met; nothing changed.
    Skipped,
    Completed,
    /// The round trip failed and the fixed failure result was stored.
    Failed,
}

/// Owns the app state and drives every transition on it.
///
/// File acceptance and the generate flow both end in a render pass. A
/// session started without a client keeps the generate path disabled.
pub struct Session<V: View> {
    state: AppState,
    client: Option<Box<dyn GenerationClient>>,
    view: V,
    events: Option<EventLog>,
    cancel: CancelToken,
}

impl<V: View> Session<V> {
    pub fn start(
        view: V,
        client: Result<Box<dyn GenerationClient>, ServiceInitError>,
        events: Option<EventLog>,
    ) -> Self {
        let mut session = Self {
            state: AppState::new(),
            client: None,
            view,
            events,
            cancel: CancelToken::new(),
        };
        match client {
            Ok(client) => {
                session.log(SessionEvent::SessionStarted {
                    client: client.name().to_string(),
                });
                session.client = Some(client);
            }
            Err(err) => {
                let message = format!("image generation unavailable: {err}");
                session.log(SessionEvent::ServiceUnavailable {
                    error: err.to_string(),
                });
                session.view.warn(&message);
            }
        }
        session.render();
        session
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_generation_available(&self) -> bool {
        self.client.is_some()
    }

    /// Handle for aborting the in-flight request from another thread. A cancel
    /// covers one generation; the token is cleared once it completes.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn view_model(&self) -> ViewModel {
        let model = project(&self.state);
        if self.client.is_some() {
            model
        } else {
            model.without_generation()
        }
    }

    /// Single entry point for picked and dropped files.
    ///
    /// On any failure the slot for `role` keeps its previous image.
    pub fn accept_file(&mut self, file: &SourceFile, role: ImageRole) -> Result<(), InputError> {
        let encoded = if file.is_image() {
            encode(file)
        } else {
            Err(InputError::InvalidFileType {
                declared: file.declared_type().to_string(),
            })
        };

        match encoded {
            Ok(image) => {
                self.log(SessionEvent::ImageAccepted {
                    role,
                    path: file.path().to_string_lossy().into_owned(),
                    mime_type: image.mime_type().to_string(),
                    encoded_len: image.data().len(),
                });
                self.state.set_image(role, image);
                self.render();
                Ok(())
            }
            Err(err) => {
                self.log(SessionEvent::ImageRejected {
                    role,
                    path: file.path().to_string_lossy().into_owned(),
                    kind: err.kind(),
                    error: err.to_string(),
                });
                self.view.warn(&err.to_string());
                Err(err)
            }
        }
    }

    /// Runs one generation round trip if both images are present, nothing is
    /// in flight and a client exists. Otherwise a no-op.
    pub fn generate(&mut self) -> GenerateOutcome {
        let Some(client) = self.client.as_deref() else {
            self.log(SessionEvent::GenerationSkipped {
                reason: SkipReason::ServiceUnavailable,
            });
            return GenerateOutcome::Skipped;
        };
        let Some((input, concept)) = self.state.generation_inputs() else {
            let reason = if self.state.is_loading() {
                SkipReason::InFlight
            } else {
                SkipReason::MissingImage
            };
            self.log(SessionEvent::GenerationSkipped { reason });
            return GenerateOutcome::Skipped;
        };

        self.state.begin_generation();
        self.log(SessionEvent::GenerationStarted {
            client: client.name().to_string(),
            input_mime_type: input.mime_type().to_string(),
            concept_mime_type: concept.mime_type().to_string(),
        });
        let loading_view = self.view_model();
        self.view.render(&loading_view);

        let reply = client.generate(&input, &concept, &self.cancel);
        let outcome = match reply {
            Ok(result) => {
                self.log(SessionEvent::GenerationFinished {
                    has_image: result.image.is_some(),
                    has_text: result.text.is_some(),
                });
                self.state.complete_generation(result);
                GenerateOutcome::Completed
            }
            Err(err) => {
                self.log(SessionEvent::GenerationFailed {
                    error: err.to_string(),
                });
                self.state.complete_generation(GenerationResult::failed());
                self.view.warn(&format!("generation failed: {err}"));
                GenerateOutcome::Failed
            }
        };
        self.cancel.reset();
        self.render();
        outcome
    }

    fn render(&mut self) {
        let model = self.view_model();
        self.view.render(&model);
    }

    fn log(&self, event: SessionEvent) {
        let Some(events) = &self.events else {
            return;
        };
        if let Err(err) = events.emit(&event) {
            eprintln!("restyle: event log write failed: {err:#}");
        }
    }
}
