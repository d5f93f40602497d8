use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::image::ImageRole;

/// Why a generate request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ServiceUnavailable,
    InFlight,
    MissingImage,
}

/// Everything a session writes to its log. The variant name becomes the
/// row's `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        client: String,
    },
    ServiceUnavailable {
        error: String,
    },
    ImageAccepted {
        role: ImageRole,
        path: String,
        mime_type: String,
        encoded_len: usize,
    },
    ImageRejected {
        role: ImageRole,
        path: String,
        kind: &'static str,
        error: String,
    },
    GenerationStarted {
        client: String,
        input_mime_type: String,
        concept_mime_type: String,
    },
    GenerationFinished {
        has_image: bool,
        has_text: bool,
    },
    GenerationFailed {
        error: String,
    },
    GenerationSkipped {
        reason: SkipReason,
    },
}

#[derive(Serialize)]
struct EventRow<'a> {
    #[serde(flatten)]
    event: &'a SessionEvent,
    session_id: &'a str,
    ts: String,
}

/// Append-only JSONL log for one session. Clones share the open file.
#[derive(Debug, Clone)]
pub struct EventLog {
    sink: Arc<Mutex<Sink>>,
}

#[derive(Debug)]
struct Sink {
    path: PathBuf,
    session_id: String,
    file: Option<File>,
}

impl Sink {
    fn file(&mut self) -> anyhow::Result<&mut File> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| format!("failed to open {}", self.path.display()))?;
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .context("event log file was not opened")
    }
}

impl EventLog {
    /// The file is created on the first event, not here.
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink {
                path: path.into(),
                session_id: session_id.into(),
                file: None,
            })),
        }
    }

    pub fn emit(&self, event: &SessionEvent) -> anyhow::Result<()> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
        let mut line = serde_json::to_string(&EventRow {
            event,
            session_id: &sink.session_id,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })?;
        line.push('\n');
        sink.file()?.write_all(line.as_bytes())?;
        Ok(())
    }
}
