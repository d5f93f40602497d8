use std::path::PathBuf;

use thiserror::Error;

/// Failures while accepting a file into one of the image slots.
///
/// Every variant is recovered locally: the slot keeps whatever it held
/// before and the user is shown a warning.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{declared:?} is not an image type; please choose an image file")]
    InvalidFileType { declared: String },

    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", path.display())]
    EmptyFile { path: PathBuf },
}

impl InputError {
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::InvalidFileType { .. } => "invalid_file_type",
            InputError::Read { .. } | InputError::EmptyFile { .. } => "read_error",
        }
    }
}

/// The generation service could not be set up. Fatal for the session.
#[derive(Debug, Error)]
pub enum ServiceInitError {
    #[error("GEMINI_API_KEY or GOOGLE_API_KEY not set")]
    MissingApiKey,

    #[error("invalid GEMINI_REQUEST_TIMEOUT value {0:?}")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// A single generate round trip failed. Nothing it produced is kept.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Request(String),

    #[error("generation cancelled")]
    Cancelled,
}
