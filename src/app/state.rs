//! Application state types and enums

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::tasks::recipes::Recipe;
use crate::tasks::TaskOutcome;

/// Application mode/screen
#[derive(Debug)]
pub enum AppMode {
    MainMenu { selected: usize },
    Task(TaskState),
}

/// Coarse run state governing which controls are enabled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    Idle,
    Running,
    Cancelling,
}

/// State of one maintenance run.
///
/// Phases: `Running -> (AwaitingConfirmation -> Running)* -> Complete`.
/// Cancellation can land in any running phase; every terminal outcome
/// returns the app to the main menu.
#[derive(Debug)]
pub struct TaskState {
    pub recipe: Recipe,
    pub phase: TaskPhase,
    pub steps: Vec<StepStatus>,
    pub output: VecDeque<String>,
}

impl TaskState {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            phase: TaskPhase::Running { cancelling: false },
            steps: Vec::new(),
            output: VecDeque::new(),
        }
    }
}

#[derive(Debug)]
pub enum TaskPhase {
    Running {
        cancelling: bool,
    },
    /// The worker is suspended on the prompt's reply channel
    AwaitingConfirmation(ConfirmPrompt),
    Complete {
        outcome: TaskOutcome,
        /// None = auto-scroll, Some(n) = manual scroll at position n
        scroll_offset: Option<usize>,
    },
}

/// A confirmation prompt lifted out of the worker's ConfirmRequest
#[derive(Debug)]
pub struct ConfirmPrompt {
    pub title: String,
    pub details: Vec<String>,
    /// Taken when the user decides; the worker resumes on send
    pub reply: Option<oneshot::Sender<bool>>,
}

/// Step progress status
#[derive(Debug, Clone)]
pub struct StepStatus {
    pub name: String,
    pub status: StepState,
}

impl StepStatus {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StepState::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepState {
    Pending,
    Running,
    Complete,
    Failed,
    Skipped,
}
