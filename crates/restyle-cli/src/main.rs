use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use restyle_contracts::chat::{parse_command, SessionCommand, SESSION_HELP_COMMANDS};
use restyle_contracts::errors::ServiceInitError;
use restyle_contracts::events::EventLog;
use restyle_contracts::image::ImageRole;
use restyle_contracts::state::AppState;
use restyle_contracts::view::ViewModel;
use restyle_engine::{
    DryrunClient, GeminiClient, GenerateOutcome, GenerationClient, ServiceConfig, Session,
    SourceFile, View,
};

#[derive(Debug, Parser)]
#[command(name = "restyle-rs", version, about = "Transfer the style of one image onto another")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Generate(GenerateArgs),
    Session(SessionArgs),
}

#[derive(Debug, Args)]
struct ServiceArgs {
    /// JSONL event log path.
    #[arg(long)]
    events: Option<PathBuf>,
    /// Overrides GEMINI_IMAGE_MODEL.
    #[arg(long)]
    model: Option<String>,
    /// Use the offline client instead of Gemini.
    #[arg(long)]
    dryrun: bool,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Content image whose subject is kept.
    #[arg(long)]
    input: PathBuf,
    /// Style image whose palette and texture are transferred.
    #[arg(long)]
    concept: PathBuf,
    /// File or directory for the generated image.
    #[arg(long, default_value = ".")]
    out: PathBuf,
    #[command(flatten)]
    service: ServiceArgs,
}

#[derive(Debug, Parser)]
struct SessionArgs {
    #[command(flatten)]
    service: ServiceArgs,
}

/// Prints each distinct render pass as one status line.
#[derive(Default)]
struct TerminalView {
    last: Option<ViewModel>,
}

impl View for TerminalView {
    fn render(&mut self, view: &ViewModel) {
        if self.last.as_ref() == Some(view) {
            return;
        }
        println!("{}", describe_view(view));
        if let Some(text) = view.result_text.as_deref() {
            println!("  {text}");
        }
        self.last = Some(view.clone());
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("restyle-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Session(args) => {
            run_session(args)?;
            Ok(0)
        }
    }
}

fn build_client(service: &ServiceArgs) -> Result<Box<dyn GenerationClient>, ServiceInitError> {
    if service.dryrun {
        return Ok(Box::new(DryrunClient));
    }
    let config = ServiceConfig::from_env()?.with_model(service.model.as_deref());
    Ok(Box::new(GeminiClient::new(config)?))
}

fn start_session(service: &ServiceArgs) -> Session<TerminalView> {
    let events = service
        .events
        .as_ref()
        .map(|path| EventLog::new(path, uuid::Uuid::new_v4().to_string()));
    Session::start(TerminalView::default(), build_client(service), events)
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let mut session = start_session(&args.service);
    if !session.is_generation_available() {
        return Ok(1);
    }
    if session
        .accept_file(&SourceFile::from_path(&args.input), ImageRole::Input)
        .is_err()
        || session
            .accept_file(&SourceFile::from_path(&args.concept), ImageRole::Concept)
            .is_err()
    {
        return Ok(1);
    }

    match session.generate() {
        GenerateOutcome::Completed => {
            match save_result(session.state(), &args.out)? {
                Some(path) => println!("Saved {}", path.display()),
                None => println!("The service returned no image."),
            }
            Ok(0)
        }
        GenerateOutcome::Failed | GenerateOutcome::Skipped => Ok(1),
    }
}

fn run_session(args: SessionArgs) -> Result<()> {
    let mut session = start_session(&args.service);
    println!("Restyle session started. Type /help for commands.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        match parse_command(&line) {
            SessionCommand::Noop => {}
            SessionCommand::Quit => break,
            SessionCommand::Help => {
                println!("Commands: {}", SESSION_HELP_COMMANDS.join("  "));
            }
            SessionCommand::Status => {
                println!("{}", serde_json::to_string_pretty(&status_summary(&session))?);
            }
            SessionCommand::Pick { role, path } => {
                session.accept_file(&SourceFile::from_path(path), role).ok();
            }
            SessionCommand::Drop {
                role,
                path,
                mime_type,
            } => {
                let file = match mime_type {
                    Some(mime_type) => SourceFile::with_type(path, &mime_type),
                    None => SourceFile::from_path(path),
                };
                session.accept_file(&file, role).ok();
            }
            SessionCommand::Generate => {
                if session.generate() == GenerateOutcome::Skipped {
                    println!("Generate is not available yet.");
                }
            }
            SessionCommand::Save { path } => match save_result(session.state(), &path) {
                Ok(Some(saved)) => println!("Saved {}", saved.display()),
                Ok(None) => println!("No result image to save."),
                Err(err) => eprintln!("warning: {err:#}"),
            },
            SessionCommand::Invalid { reason, .. } => println!("{reason}"),
            SessionCommand::Unknown { command, .. } if command.is_empty() => {
                println!("Use /input and /concept to choose images. Type /help for commands.");
            }
            SessionCommand::Unknown { command, .. } => {
                println!("Unknown command: /{command}");
            }
        }
    }

    Ok(())
}

/// Writes the result image, if any. A directory target gets a generated name.
fn save_result(state: &AppState, out: &Path) -> Result<Option<PathBuf>> {
    let Some(image) = state.result().image.as_ref() else {
        return Ok(None);
    };
    let bytes = image.decode().context("result image is not valid base64")?;
    let path = if out.is_dir() {
        out.join(format!("restyled-{}.{}", timestamp_millis(), image.extension()))
    } else {
        out.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}

fn describe_view(view: &ViewModel) -> String {
    let mark = |on: bool| if on { "x" } else { " " };
    let result = if view.show_loader {
        "generating..."
    } else if view.show_result_image {
        "image ready"
    } else {
        "none"
    };
    format!(
        "[{}] input  [{}] concept  [{}] generate  result: {result}",
        mark(view.show_input_preview),
        mark(view.show_concept_preview),
        mark(view.generate_enabled),
    )
}

fn status_summary<V: View>(session: &Session<V>) -> serde_json::Value {
    let state = session.state();
    let view = session.view_model();
    serde_json::json!({
        "input": state.input_image().map(|image| image.mime_type()),
        "concept": state.concept_image().map(|image| image.mime_type()),
        "loading": state.is_loading(),
        "generation_available": session.is_generation_available(),
        "generate_enabled": view.generate_enabled,
        "result_image": state.result().image.as_ref().map(|image| image.mime_type()),
        "result_text": state.result().text,
    })
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use restyle_contracts::image::{EncodedImage, ImageRole};
    use restyle_contracts::state::{AppState, GenerationResult};
    use restyle_contracts::view::project;

    use super::{describe_view, save_result};

    fn finished_state() -> AppState {
        let mut state = AppState::new();
        state.set_image(
            ImageRole::Input,
            EncodedImage::from_base64("AAAA", "image/jpeg").unwrap(),
        );
        state.complete_generation(GenerationResult {
            image: EncodedImage::from_bytes(b"fake-png", "image/png"),
            text: Some("done".to_string()),
        });
        state
    }

    #[test]
    fn save_result_writes_decoded_bytes_to_a_file() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let target = temp.path().join("nested").join("out.png");
        let saved = save_result(&finished_state(), &target)?;
        assert_eq!(saved.as_deref(), Some(target.as_path()));
        assert_eq!(std::fs::read(&target)?, b"fake-png");
        Ok(())
    }

    #[test]
    fn save_result_names_files_inside_a_directory() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let saved = save_result(&finished_state(), temp.path())?.expect("saved path");
        assert_eq!(saved.parent(), Some(temp.path()));
        assert_eq!(saved.extension().and_then(|ext| ext.to_str()), Some("png"));
        Ok(())
    }

    #[test]
    fn save_result_without_image_is_none() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        assert!(save_result(&AppState::new(), temp.path())?.is_none());
        Ok(())
    }

    #[test]
    fn describe_view_marks_visible_parts() {
        let line = describe_view(&project(&finished_state()));
        assert_eq!(line, "[x] input  [ ] concept  [ ] generate  result: image ready");
    }
}
