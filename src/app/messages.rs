//! Task message handling for the application

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use super::state::{AppMode, ConfirmPrompt, StepState, StepStatus, TaskPhase};
use super::App;
use crate::constants::OUTPUT_BUFFER_SIZE;
use crate::tasks::errors::ParsedError;
use crate::tasks::{TaskMessage, TaskOutcome};

/// Regex to match ANSI escape codes.
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// Strip ANSI escape codes from a string
fn strip_ansi_codes(s: &str) -> String {
    ANSI_RE.replace_all(s, "").to_string()
}

impl App {
    /// Handle messages from the running task worker
    pub async fn handle_task_message(&mut self, msg: TaskMessage) -> Result<()> {
        match msg {
            TaskMessage::Plan { steps } => {
                if let AppMode::Task(task) = &mut self.mode {
                    task.steps = steps.iter().map(|s| StepStatus::new(s)).collect();
                }
            }
            TaskMessage::Line(line) => {
                self.append_output(&line);
            }
            TaskMessage::StepStarted { step } => {
                self.set_step_state(&step, StepState::Running);
            }
            TaskMessage::StepComplete { step } => {
                self.log_to_screen(&format!("[ok] Step complete: {}", step));
                self.set_step_state(&step, StepState::Complete);
            }
            TaskMessage::StepFailed { step, error } => {
                self.handle_step_failed(&step, &error);
            }
            TaskMessage::StepSkipped { step } => {
                self.log_to_screen(&format!("[--] Step skipped: {}", step));
                self.set_step_state(&step, StepState::Skipped);
            }
            TaskMessage::Confirm(req) => {
                if let AppMode::Task(task) = &mut self.mode {
                    task.phase = TaskPhase::AwaitingConfirmation(ConfirmPrompt {
                        title: req.title,
                        details: req.details,
                        reply: Some(req.reply),
                    });
                }
            }
            TaskMessage::Done { outcome } => {
                self.handle_task_done(outcome);
            }
        }
        Ok(())
    }

    fn append_output(&mut self, line: &str) {
        let clean_line = strip_ansi_codes(line);
        self.log_to_screen(&clean_line);

        if let AppMode::Task(task) = &mut self.mode {
            task.output.push_back(clean_line);
            while task.output.len() > OUTPUT_BUFFER_SIZE {
                task.output.pop_front();
            }
        }
    }

    fn set_step_state(&mut self, step_name: &str, state: StepState) {
        if let AppMode::Task(task) = &mut self.mode {
            if let Some(s) = task.steps.iter_mut().find(|s| s.name == step_name) {
                s.status = state;
            }
        }
    }

    fn handle_step_failed(&mut self, step_name: &str, error: &str) {
        self.log_to_screen(&format!("[!!] Step failed: {} ({})", step_name, error));
        self.set_step_state(step_name, StepState::Failed);

        // A cancelled step is not an error worth diagnosing
        if error == "cancelled" {
            return;
        }

        // Categorize from the recent output tail for a readable diagnosis
        if let AppMode::Task(task) = &mut self.mode {
            let tail: Vec<String> = task.output.iter().rev().take(40).rev().cloned().collect();
            let parsed = ParsedError::from_output(&tail.join("\n"), step_name);

            task.output.push_back(String::new());
            task.output.push_back(format!("Error: {}", parsed.summary));
            if let Some(detail) = &parsed.detail {
                task.output.push_back(format!("  {}", detail));
            }
            task.output
                .push_back(format!("Suggestion: {}", parsed.suggestion));
            self.error = Some(parsed.summary);
        }
    }

    fn handle_task_done(&mut self, outcome: TaskOutcome) {
        self.log_to_screen(&format!("\n=== Task finished: {:?} ===\n", outcome));

        if let AppMode::Task(task) = &mut self.mode {
            task.phase = TaskPhase::Complete {
                outcome,
                scroll_offset: None, // None = auto-scroll continues
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tasks::recipes::Recipe;
    use crate::tasks::ConfirmRequest;
    use tokio::sync::oneshot;

    fn running_app() -> App {
        let mut app = App::new(Config::default());
        app.mode = AppMode::Task(super::super::state::TaskState::new(Recipe::FullUpgrade));
        app
    }

    #[test]
    fn test_strip_ansi_codes() {
        assert_eq!(strip_ansi_codes("\x1b[1;32mok\x1b[0m done"), "ok done");
        assert_eq!(strip_ansi_codes("plain"), "plain");
    }

    #[tokio::test]
    async fn test_plan_builds_pending_steps() {
        let mut app = running_app();
        app.handle_task_message(TaskMessage::Plan {
            steps: vec!["One".to_string(), "Two".to_string()],
        })
        .await
        .unwrap();

        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert_eq!(task.steps.len(), 2);
        assert!(task.steps.iter().all(|s| s.status == StepState::Pending));
    }

    #[tokio::test]
    async fn test_step_lifecycle_updates_status() {
        let mut app = running_app();
        app.handle_task_message(TaskMessage::Plan {
            steps: vec!["One".to_string()],
        })
        .await
        .unwrap();
        app.handle_task_message(TaskMessage::StepStarted {
            step: "One".to_string(),
        })
        .await
        .unwrap();

        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert_eq!(task.steps[0].status, StepState::Running);

        app.handle_task_message(TaskMessage::StepComplete {
            step: "One".to_string(),
        })
        .await
        .unwrap();
        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert_eq!(task.steps[0].status, StepState::Complete);
    }

    #[tokio::test]
    async fn test_output_buffer_is_bounded() {
        let mut app = running_app();
        for i in 0..(OUTPUT_BUFFER_SIZE + 50) {
            app.handle_task_message(TaskMessage::Line(format!("line {}", i)))
                .await
                .unwrap();
        }
        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert_eq!(task.output.len(), OUTPUT_BUFFER_SIZE);
        assert_eq!(task.output.back().unwrap(), &format!("line {}", OUTPUT_BUFFER_SIZE + 49));
    }

    #[tokio::test]
    async fn test_confirm_moves_to_awaiting_phase() {
        let mut app = running_app();
        let (reply, _rx) = oneshot::channel();
        app.handle_task_message(TaskMessage::Confirm(ConfirmRequest {
            title: "Proceed?".to_string(),
            details: vec!["libfoo".to_string()],
            reply,
        }))
        .await
        .unwrap();

        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert!(matches!(task.phase, TaskPhase::AwaitingConfirmation(_)));
    }

    #[tokio::test]
    async fn test_done_moves_to_complete() {
        let mut app = running_app();
        app.handle_task_message(TaskMessage::Done {
            outcome: TaskOutcome::Cancelled,
        })
        .await
        .unwrap();

        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert!(matches!(
            task.phase,
            TaskPhase::Complete {
                outcome: TaskOutcome::Cancelled,
                ..
            }
        ));
        assert_eq!(app.run_state(), super::super::RunState::Idle);
    }

    #[tokio::test]
    async fn test_step_failed_appends_diagnosis() {
        let mut app = running_app();
        app.handle_task_message(TaskMessage::Plan {
            steps: vec!["Upgrading system".to_string()],
        })
        .await
        .unwrap();
        app.handle_task_message(TaskMessage::Line(
            "error: failed to init transaction (unable to lock database)".to_string(),
        ))
        .await
        .unwrap();
        app.handle_task_message(TaskMessage::StepFailed {
            step: "Upgrading system".to_string(),
            error: "exit code 1".to_string(),
        })
        .await
        .unwrap();

        assert!(app.error.as_deref().unwrap().contains("locked"));
        let AppMode::Task(task) = &app.mode else {
            panic!("expected task mode")
        };
        assert_eq!(task.steps[0].status, StepState::Failed);
        assert!(task.output.iter().any(|l| l.starts_with("Suggestion:")));
    }
}
