//! Maintenance task execution module

pub mod errors;
pub mod executor;
pub mod pacman;
pub mod recipes;
pub mod runner;
pub mod sequence;

use tokio::sync::oneshot;

/// Final outcome of one maintenance task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Every step succeeded
    Completed,
    /// Best-effort run finished but some steps failed
    CompletedWithWarnings,
    /// Aborted at the named step
    Failed { step: String },
    /// Stopped by the user, or a confirmation gate was declined
    Cancelled,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Completed | TaskOutcome::CompletedWithWarnings)
    }
}

/// A pending yes/no confirmation, answered through the reply channel.
///
/// The worker that sent this is suspended until the reply arrives; a dropped
/// channel counts as a decline.
#[derive(Debug)]
pub struct ConfirmRequest {
    pub title: String,
    /// Literal description of what will be affected (e.g. orphan package names)
    pub details: Vec<String>,
    pub reply: oneshot::Sender<bool>,
}

/// Messages sent from a task worker to the UI
#[derive(Debug)]
pub enum TaskMessage {
    /// The ordered step labels for this run (sent once, before any step)
    Plan { steps: Vec<String> },
    /// One line of combined subprocess output
    Line(String),
    /// Step is now running
    StepStarted { step: String },
    /// Step completed successfully
    StepComplete { step: String },
    /// Step failed with error
    StepFailed { step: String, error: String },
    /// Step was skipped
    StepSkipped { step: String },
    /// The worker is suspended awaiting a user decision
    Confirm(ConfirmRequest),
    /// Task fully finished
    Done { outcome: TaskOutcome },
}
