pub mod client;
pub mod codec;
pub mod config;
mod dryrun;
mod gemini;
pub mod session;

pub use client::{CancelToken, GenerationClient, STYLE_TRANSFER_INSTRUCTION};
pub use codec::{encode, SourceFile};
pub use config::ServiceConfig;
pub use dryrun::DryrunClient;
pub use gemini::GeminiClient;
pub use session::{GenerateOutcome, Session, View};
