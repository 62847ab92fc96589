//! Application state management
//!
//! This module contains the core application state and is split into:
//! - `state.rs` - State type definitions (AppMode, TaskState, etc.)
//! - `handlers.rs` - Keyboard input handlers
//! - `messages.rs` - Task message handling

mod handlers;
mod messages;
pub mod state;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::constants::SPINNER_TICK_MS;
use crate::tasks::executor::TaskControl;
use crate::tasks::recipes::{self, Recipe};
use crate::tasks::runner::TaskContext;
use crate::tasks::TaskMessage;

// Re-export commonly used types
pub use state::{
    AppMode, ConfirmPrompt, RunState, StepState, StepStatus, TaskPhase, TaskState,
};

/// Main application state
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub show_exit_confirm: bool,
    pub spinner_state: usize,
    pub last_tick: Instant,
    pub error: Option<String>,
    pub config: Config,
    control: Arc<TaskControl>,
    pub(crate) task_tx: Option<mpsc::Sender<TaskMessage>>,
    screen_log: Option<File>,
    pub screen_log_path: PathBuf,
}

impl App {
    pub fn new(config: Config) -> Self {
        // Set up screen log file
        let log_dir = crate::constants::data_dir();
        let _ = std::fs::create_dir_all(&log_dir);
        let screen_log_path = log_dir.join(crate::constants::SCREEN_LOG_FILE);

        // Open log file (truncate existing)
        let mut screen_log = match File::create(&screen_log_path) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Failed to create screen log file: {}", e);
                None
            }
        };

        if let Some(ref mut file) = screen_log {
            let _ = writeln!(file, "=== Upkeep Screen Log ===\n");
            let _ = file.flush();
        }

        Self {
            mode: AppMode::MainMenu { selected: 0 },
            should_quit: false,
            show_exit_confirm: false,
            spinner_state: 0,
            last_tick: Instant::now(),
            error: None,
            config,
            control: Arc::new(TaskControl::new()),
            task_tx: None,
            screen_log,
            screen_log_path,
        }
    }

    pub fn set_task_sender(&mut self, tx: mpsc::Sender<TaskMessage>) {
        self.task_tx = Some(tx);
    }

    /// Write a line to the screen log file
    pub fn log_to_screen(&mut self, line: &str) {
        if let Some(ref mut file) = self.screen_log {
            let _ = writeln!(file, "{}", line);
            let _ = file.flush();
        }
    }

    /// Called on each tick to update animations
    pub fn tick(&mut self) {
        if self.last_tick.elapsed().as_millis() >= SPINNER_TICK_MS {
            self.spinner_state = (self.spinner_state + 1) % 10;
            self.last_tick = Instant::now();
        }
    }

    /// Coarse run state derived from the current mode
    pub fn run_state(&self) -> RunState {
        match &self.mode {
            AppMode::Task(task) => match &task.phase {
                TaskPhase::Running { cancelling: true } => RunState::Cancelling,
                TaskPhase::Running { cancelling: false }
                | TaskPhase::AwaitingConfirmation(_) => RunState::Running,
                TaskPhase::Complete { .. } => RunState::Idle,
            },
            _ => RunState::Idle,
        }
    }

    /// Start a maintenance recipe.
    ///
    /// One task at a time: a start request while a task is active is a
    /// caller error and is ignored, not queued.
    pub fn start_recipe(&mut self, recipe: Recipe) -> Result<()> {
        if self.run_state() != RunState::Idle {
            tracing::warn!("Ignoring start of '{}': a task is already active", recipe.title());
            return Ok(());
        }
        let Some(tx) = &self.task_tx else {
            anyhow::bail!("task channel not initialized");
        };

        tracing::info!("Starting recipe: {}", recipe.title());
        self.error = None;
        self.control.reset();
        self.mode = AppMode::Task(TaskState::new(recipe));

        let ctx = TaskContext::new(tx.clone(), self.control.clone(), self.config.clone());
        recipes::start(recipe, ctx);
        Ok(())
    }

    /// Request cancellation of the active task
    pub fn cancel_task(&mut self) {
        if let AppMode::Task(task) = &mut self.mode {
            if let TaskPhase::Running { cancelling } = &mut task.phase {
                if !*cancelling {
                    *cancelling = true;
                    task.output
                        .push_back("Stopping after the current command...".to_string());
                }
            }
        }
        self.control.cancel();
    }
}
