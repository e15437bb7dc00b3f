//! Interactive `mentor watch` session.
//!
//! Screen capture and analysis run in the background while the terminal
//! reads chat lines. Lines starting with `/` are commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mentor_models::{Role, SessionStats};
use mentor_persistence::Credentials;
use mentor_runtime::{
    CaptureOutcome, ConsoleSpeech, Dashboard, DashboardEvent, MentorBackend, RuntimeConfig,
    ScreenshotFileSource,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::commands::Result;

pub struct WatchOptions {
    pub path: PathBuf,
    pub interval_secs: u64,
    pub voice: bool,
}

/// A parsed line of watch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Capture,
    Start,
    Stop,
    Voice,
    Stats,
    Help,
    Quit,
    Chat(String),
    Unknown(String),
    Empty,
}

impl WatchCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Chat(line.to_string());
        };
        match command.split_whitespace().next().unwrap_or("").to_lowercase().as_str() {
            "capture" | "c" => Self::Capture,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "voice" | "v" => Self::Voice,
            "stats" => Self::Stats,
            "help" | "h" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

const HELP: &str = "Commands:
  /capture   analyse the screen now
  /start     resume automatic capture
  /stop      pause automatic capture
  /voice     toggle spoken feedback
  /stats     show session stats
  /quit      leave
Anything else is sent to the mentor as a chat message.";

fn format_stats(stats: &SessionStats) -> String {
    format!(
        "Code quality: {:.1}/10 | Suggestions: {} | Session: {}m {:02}s | Health: {:.1}",
        stats.code_quality,
        stats.suggestions,
        stats.session_time / 60,
        stats.session_time % 60,
        stats.health_score
    )
}

fn print_event(event: &DashboardEvent) {
    match event {
        DashboardEvent::TurnAppended(turn) if turn.role == Role::Assistant => {
            println!("\n🤖 {}\n", turn.content);
        }
        DashboardEvent::TurnAppended(_) => {}
        DashboardEvent::AnalysisSuppressed { .. } => debug!("No new code on screen"),
        DashboardEvent::CaptureStarted => println!("📸 Watching the screen."),
        DashboardEvent::CaptureStopped => println!("⏸  Screen capture stopped."),
        DashboardEvent::AnalysisFailed { error } => eprintln!("⚠️  Analysis failed: {}", error),
    }
}

async fn print_events(mut events: broadcast::Receiver<DashboardEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => print_event(&event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event printer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Reads lines on a plain thread; rustyline blocks.
fn spawn_reader(prompt: String) -> Result<mpsc::UnboundedReceiver<String>> {
    let mut editor = DefaultEditor::new()?;
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                let quit = WatchCommand::parse(&line) == WatchCommand::Quit;
                if tx.send(line).is_err() || quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                let _ = tx.send("/quit".to_string());
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                let _ = tx.send("/quit".to_string());
                break;
            }
        }
    });
    Ok(rx)
}

async fn start(dashboard: &Dashboard) {
    match dashboard.start_capture().await {
        Ok(true) => {}
        Ok(false) => println!("Already watching."),
        Err(e) => eprintln!("Could not start capture: {}", e),
    }
}

/// Runs the session until `/quit` or end of input.
pub async fn run(
    options: WatchOptions,
    backend: Arc<dyn MentorBackend>,
    credentials: &Credentials,
) -> Result<()> {
    let config = RuntimeConfig::new()
        .with_server_url(credentials.server_url.clone())
        .with_capture_interval(Duration::from_secs(options.interval_secs));
    let source = Arc::new(ScreenshotFileSource::new(&options.path));
    let dashboard = Arc::new(Dashboard::new(&config, backend, source, Arc::new(ConsoleSpeech)));
    dashboard.set_muted(!options.voice);

    println!("HackMentor v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Signed in as {}. Watching {} every {:?}.",
        credentials.user.name,
        options.path.display(),
        config.capture_interval
    );
    println!("Type /help for commands, /quit to exit");
    println!();

    let printer = tokio::spawn(print_events(dashboard.subscribe()));
    start(&dashboard).await;

    let mut lines = spawn_reader("you> ".to_string())?;
    while let Some(line) = lines.recv().await {
        let command = WatchCommand::parse(&line);
        debug!(?command, "Parsed input");
        match command {
            WatchCommand::Empty => {}
            WatchCommand::Chat(message) => {
                let dashboard = Arc::clone(&dashboard);
                tokio::spawn(async move {
                    dashboard.send_message(&message).await;
                });
            }
            WatchCommand::Capture => match dashboard.capture_now().await {
                Ok(CaptureOutcome::Dispatched) => println!("🔍 Analysing..."),
                Ok(CaptureOutcome::Busy) => println!("Still analysing the last capture."),
                Ok(CaptureOutcome::NotReady) => println!("Nothing to capture yet."),
                Err(e) => println!("{} (use /start)", e),
            },
            WatchCommand::Start => start(&dashboard).await,
            WatchCommand::Stop => {
                if !dashboard.stop_capture() {
                    println!("Not watching.");
                }
            }
            WatchCommand::Voice => {
                let enabled = dashboard.toggle_voice();
                println!("Voice {}", if enabled { "on 🔊" } else { "off 🔇" });
            }
            WatchCommand::Stats => println!("{}", format_stats(&dashboard.stats())),
            WatchCommand::Help => println!("{}", HELP),
            WatchCommand::Unknown(name) => println!("Unknown command: /{} (try /help)", name),
            WatchCommand::Quit => break,
        }
    }

    dashboard.stop_capture();
    printer.abort();
    println!("Goodbye!");
    Ok(())
}
