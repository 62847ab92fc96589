//! upkeep - System maintenance TUI for Manjaro and Arch

mod app;
mod config;
mod constants;
mod tasks;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use config::Config;
use tasks::recipes::Recipe;
use tasks::TaskMessage;

/// System maintenance for Manjaro and Arch
#[derive(Parser)]
#[command(name = "upkeep")]
#[command(version)]
#[command(about = "System maintenance TUI - updates, cleanup, and dependency checks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the mirror list and sync databases
    Mirrors,
    /// Full system upgrade (pacman -Syu)
    #[command(alias = "upgrade")]
    Update,
    /// Upgrade AUR packages via yay or paru
    Aur,
    /// Check installed packages for missing or altered files
    Check,
    /// Re-sync and upgrade to resolve dependency problems
    Fix,
    /// Clean the package cache
    Cache,
    /// Remove orphaned packages
    Orphans,
    /// Vacuum journal and rotated logs
    Logs,
    /// Cache + orphans + logs in one best-effort pass
    Clean,
    /// Mirrors, upgrade, AUR, and cache in one run
    Auto,
}

impl Commands {
    fn recipe(&self) -> Recipe {
        match self {
            Commands::Mirrors => Recipe::RefreshMirrors,
            Commands::Update => Recipe::FullUpgrade,
            Commands::Aur => Recipe::AurUpgrade,
            Commands::Check => Recipe::CheckDependencies,
            Commands::Fix => Recipe::FixDependencies,
            Commands::Cache => Recipe::CleanCache,
            Commands::Orphans => Recipe::RemoveOrphans,
            Commands::Logs => Recipe::VacuumLogs,
            Commands::Clean => Recipe::FullClean,
            Commands::Auto => Recipe::AutoMaintenance,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Privileged commands escalate per-command via sudo; running the whole
    // UI as root would also run the AUR helper as root, which is unsupported.
    if nix::unistd::Uid::effective().is_root() {
        eprintln!("upkeep must not run as root; it elevates individual commands with sudo.");
        std::process::exit(1);
    }

    // Set up logging to file
    let log_dir = constants::data_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "upkeep.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("upkeep starting");

    let cli = Cli::parse();
    let initial = cli.command.map(|c| c.recipe());

    run_tui(initial).await
}

async fn run_tui(initial: Option<Recipe>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Config::load());

    // Create task channel
    let (task_tx, mut task_rx) = mpsc::channel::<TaskMessage>(constants::TASK_CHANNEL_SIZE);
    app.set_task_sender(task_tx);

    let result = run_app(&mut terminal, &mut app, &mut task_rx, initial).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Print log path
    println!("Screen log: {}", app.screen_log_path.display());

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        return Err(err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_rx: &mut mpsc::Receiver<TaskMessage>,
    initial: Option<Recipe>,
) -> Result<()> {
    if let Some(recipe) = initial {
        app.start_recipe(recipe)?;
    }

    // Create async event stream for responsive input
    let mut event_stream = EventStream::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = Duration::from_millis(constants::EVENT_POLL_TIMEOUT_MS);

        tokio::select! {
            biased;  // Prioritize in order: keys, task messages, timeout

            // Terminal key events (instant response)
            Some(Ok(event)) = event_stream.next() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code).await?;
                    }
                }
            }
            // Output and progress from the task worker
            Some(msg) = task_rx.recv() => {
                app.handle_task_message(msg).await?;
            }
            // Timeout for spinner animation and redraw
            _ = tokio::time::sleep(timeout) => {}
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
