//! yogaflow Entry Point
//!
//! Launches a guided practice in the terminal.
//!
//! Usage:
//!   yogaflow [SEQUENCE] [OPTIONS]
//!
//! Options:
//!   --config <FILE>        Config file (default: ~/.config/yogaflow/practice.toml)
//!   --api-url <URL>        Sequence API base URL
//!   --offline              Use the built-in catalog
//!   --warning-secs <SECS>  Transition warning window
//!   --volume <0..1>        Cue volume
//!   --lead-in              Count in before the first pose
//!   --muted                Start with cues muted
//!   --log-file <FILE>      Where to write logs
//!   --list                 Print the built-in sequences and exit

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use practice_core::{
    load_config_from_path, CatalogSequenceSource, ConfigOverrides, EngineOptions,
    HttpSequenceSource, HttpSessionRecorder, LogRecorder, PlaybackEngine, PracticeConfig,
    PracticeOutcome, PracticeRunner, SequenceId, SequenceSource, SessionRecorder,
};

use yogaflow_tui::cues::TerminalBell;
use yogaflow_tui::App;

/// yogaflow - guided yoga practice in the terminal
#[derive(Parser, Debug)]
#[command(name = "yogaflow")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sequence to practise
    #[arg(default_value = "sun-salutation")]
    sequence: String,

    /// Configuration file path
    #[arg(short = 'c', long, env = "YOGAFLOW_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sequence API base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Use the built-in catalog instead of the API
    #[arg(long)]
    offline: bool,

    /// Seconds before a pose ends to show what comes next
    #[arg(long, value_name = "SECS")]
    warning_secs: Option<u32>,

    /// Cue volume between 0 and 1
    #[arg(long, value_name = "VOLUME")]
    volume: Option<f32>,

    /// Count down the preparation time before the first pose
    #[arg(long)]
    lead_in: bool,

    /// Start with cues muted
    #[arg(long)]
    muted: bool,

    /// Log file path
    #[arg(long, env = "YOGAFLOW_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print the built-in sequences and exit
    #[arg(long)]
    list: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(url) = self.api_url.clone() {
            overrides = overrides.with_base_url(url);
        }
        if self.offline {
            overrides = overrides.with_offline(true);
        }
        if let Some(secs) = self.warning_secs {
            overrides = overrides.with_transition_warning_secs(secs);
        }
        if let Some(volume) = self.volume {
            overrides = overrides.with_volume(volume);
        }
        if self.lead_in {
            overrides = overrides.with_lead_in(true);
        }
        if self.muted {
            overrides = overrides.with_start_muted(true);
        }
        overrides
    }
}

/// Default log file under the user data dir
fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("yogaflow")
        .join("yogaflow.log")
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {parent:?}"))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {path:?}"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("yogaflow=info,yogaflow_tui=info,practice_core=info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}

fn print_catalog() {
    let catalog = CatalogSequenceSource::builtin();
    let mut sequences: Vec<_> = catalog.sequences().collect();
    sequences.sort_by(|a, b| a.id().cmp(b.id()));
    for sequence in sequences {
        let minutes = (sequence.total_duration_seconds() + 30) / 60;
        println!(
            "{:<20} {:<24} {:>2} poses  {:>3} min",
            sequence.id().as_str(),
            sequence.name(),
            sequence.len(),
            minutes
        );
    }
}

fn build_source(config: &PracticeConfig) -> Result<Arc<dyn SequenceSource>> {
    match config.base_url.as_deref() {
        Some(url) if !config.use_catalog() => Ok(Arc::new(HttpSequenceSource::with_timeout(
            url,
            config.timeout,
        )?)),
        _ => Ok(Arc::new(CatalogSequenceSource::builtin())),
    }
}

fn build_recorder(config: &PracticeConfig) -> Result<Arc<dyn SessionRecorder>> {
    match config.base_url.as_deref() {
        Some(url) if !config.use_catalog() => {
            Ok(Arc::new(HttpSessionRecorder::new(url, config.timeout)?))
        }
        _ => Ok(Arc::new(LogRecorder)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print_catalog();
        return Ok(());
    }

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    let mut config = load_config_from_path(
        args.config
            .clone()
            .or_else(practice_core::default_config_path),
    )?;
    args.overrides().apply(&mut config);
    config.validate()?;
    tracing::info!(
        source = %config.source(),
        catalog = config.use_catalog(),
        sequence = %args.sequence,
        "Starting practice"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: yogaflow requires a terminal (TTY)");
        eprintln!();
        eprintln!("Run it interactively, or use `yogaflow --list` to see the sequences.");
        std::process::exit(1);
    }

    let source = build_source(&config)?;
    let recorder = build_recorder(&config)?;
    let (tx, messages) = mpsc::unbounded_channel();
    let engine = PlaybackEngine::new(
        SequenceId::new(args.sequence.clone()),
        config.settings,
        EngineOptions {
            lead_in: config.lead_in,
            start_muted: config.start_muted,
        },
        Box::new(TerminalBell::stdout()),
        recorder,
        tx,
    );
    let (handle, practice) = PracticeRunner::new(engine, source).spawn();

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(handle, messages);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Leaving the UI drops the handle, which the runner treats as an exit
    let goodbye = app.goodbye().map(str::to_string);
    drop(app);
    let outcome = practice.await.context("Practice task failed")?;
    result?;

    match outcome {
        PracticeOutcome::Completed(summary) => {
            println!(
                "\n\x1b[32myogaflow:\x1b[0m {} ({} poses, {} min)\n",
                goodbye.as_deref().unwrap_or("Namaste."),
                summary.poses_completed,
                summary.duration_minutes
            );
        }
        PracticeOutcome::Failed(kind) => {
            eprintln!(
                "\nCould not start '{}' ({}). See {}\n",
                args.sequence,
                kind.label(),
                log_path.display()
            );
        }
        PracticeOutcome::Exited => {}
    }

    Ok(())
}
