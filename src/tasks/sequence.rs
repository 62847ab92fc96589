//! Ordered step execution
//!
//! A step list is plain data: a display label and an opaque shell command.
//! `execute_sequence` runs the list in order, reporting progress through the
//! task channel, and stops on failure or cancellation depending on policy.

use super::runner::TaskContext;
use super::TaskOutcome;

/// One maintenance step: a shell command and its display name
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub label: String,
    pub command: String,
}

impl Step {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// What to do when a step exits non-zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePolicy {
    /// Stop the sequence at the first failure
    Abort,
    /// Keep going; report warnings at the end
    BestEffort,
}

/// Run steps strictly in order.
///
/// Cancellation is honored at step boundaries and re-checked after the
/// running step returns, so a cancelled run reports `Cancelled` rather than
/// `Failed` even when SIGTERM made the current child exit non-zero.
pub async fn execute_sequence(
    ctx: &TaskContext,
    steps: &[Step],
    policy: FailurePolicy,
) -> TaskOutcome {
    let mut warned = false;

    for step in steps {
        if ctx.cancel_requested() {
            ctx.out("Operation cancelled by user.").await;
            return TaskOutcome::Cancelled;
        }

        ctx.step_started(&step.label).await;
        ctx.out(&format!("--- {} ---", step.label)).await;

        let result = ctx.run(&step.command).await;

        if ctx.cancel_requested() {
            ctx.step_failed(&step.label, "cancelled").await;
            ctx.out("Operation cancelled by user.").await;
            return TaskOutcome::Cancelled;
        }

        if result.succeeded {
            ctx.step_complete(&step.label).await;
        } else {
            ctx.step_failed(&step.label, &format!("exit code {}", result.exit_code))
                .await;
            match policy {
                FailurePolicy::Abort => {
                    return TaskOutcome::Failed {
                        step: step.label.clone(),
                    };
                }
                FailurePolicy::BestEffort => warned = true,
            }
        }
    }

    if warned {
        TaskOutcome::CompletedWithWarnings
    } else {
        TaskOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tasks::executor::TaskControl;
    use crate::tasks::TaskMessage;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn test_ctx() -> (TaskContext, Arc<TaskControl>, mpsc::Receiver<TaskMessage>) {
        let (tx, rx) = mpsc::channel(200);
        let control = Arc::new(TaskControl::new());
        let ctx = TaskContext::new(tx, control.clone(), Config::default());
        (ctx, control, rx)
    }

    /// Drain all step-level events, in arrival order
    fn step_events(messages: &[TaskMessage]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|msg| match msg {
                TaskMessage::StepStarted { step } => Some(format!("start:{}", step)),
                TaskMessage::StepComplete { step } => Some(format!("ok:{}", step)),
                TaskMessage::StepFailed { step, .. } => Some(format!("fail:{}", step)),
                TaskMessage::StepSkipped { step } => Some(format!("skip:{}", step)),
                _ => None,
            })
            .collect()
    }

    async fn drain(mut rx: mpsc::Receiver<TaskMessage>) -> Vec<TaskMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }
        messages
    }

    fn abc_steps() -> Vec<Step> {
        vec![
            Step::new("Step A", "echo A"),
            Step::new("Step B", "false"),
            Step::new("Step C", "echo C"),
        ]
    }

    #[tokio::test]
    async fn test_all_success_reports_each_step_once_in_order() {
        let (ctx, _control, rx) = test_ctx();
        let steps = vec![
            Step::new("First", "echo 1"),
            Step::new("Second", "echo 2"),
            Step::new("Third", "echo 3"),
        ];

        let outcome = execute_sequence(&ctx, &steps, FailurePolicy::Abort).await;
        drop(ctx);

        assert_eq!(outcome, TaskOutcome::Completed);
        let events = step_events(&drain(rx).await);
        assert_eq!(
            events,
            vec![
                "start:First",
                "ok:First",
                "start:Second",
                "ok:Second",
                "start:Third",
                "ok:Third"
            ]
        );
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let (ctx, _control, rx) = test_ctx();

        let outcome = execute_sequence(&ctx, &abc_steps(), FailurePolicy::Abort).await;
        drop(ctx);

        assert_eq!(
            outcome,
            TaskOutcome::Failed {
                step: "Step B".to_string()
            }
        );

        let messages = drain(rx).await;
        let events = step_events(&messages);
        assert_eq!(
            events,
            vec!["start:Step A", "ok:Step A", "start:Step B", "fail:Step B"]
        );
        // Step A's output was streamed, Step C's never produced
        let lines: Vec<&str> = messages
            .iter()
            .filter_map(|m| match m {
                TaskMessage::Line(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert!(lines.contains(&"A"));
        assert!(!lines.contains(&"C"));
    }

    #[tokio::test]
    async fn test_best_effort_policy_attempts_every_step() {
        let (ctx, _control, rx) = test_ctx();

        let outcome = execute_sequence(&ctx, &abc_steps(), FailurePolicy::BestEffort).await;
        drop(ctx);

        assert_eq!(outcome, TaskOutcome::CompletedWithWarnings);

        let messages = drain(rx).await;
        let events = step_events(&messages);
        assert_eq!(
            events,
            vec![
                "start:Step A",
                "ok:Step A",
                "start:Step B",
                "fail:Step B",
                "start:Step C",
                "ok:Step C"
            ]
        );
        // C's output is still captured after B's failure
        assert!(messages
            .iter()
            .any(|m| matches!(m, TaskMessage::Line(l) if l == "C")));
    }

    #[tokio::test]
    async fn test_cancel_before_sequence_runs_nothing() {
        let (ctx, control, rx) = test_ctx();
        control.cancel();

        let outcome = execute_sequence(&ctx, &abc_steps(), FailurePolicy::Abort).await;
        drop(ctx);

        assert_eq!(outcome, TaskOutcome::Cancelled);
        assert!(step_events(&drain(rx).await).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_step_skips_the_rest() {
        let (ctx, control, rx) = test_ctx();
        let steps = vec![
            Step::new("Quick", "echo quick"),
            Step::new("Slow", "sleep 30"),
            Step::new("Never", "echo never"),
        ];

        let control2 = control.clone();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            control2.cancel();
        });

        let outcome = execute_sequence(&ctx, &steps, FailurePolicy::Abort).await;
        canceller.await.unwrap();
        drop(ctx);

        assert_eq!(outcome, TaskOutcome::Cancelled);
        let events = step_events(&drain(rx).await);
        assert_eq!(
            events,
            vec!["start:Quick", "ok:Quick", "start:Slow", "fail:Slow"]
        );
    }

    #[tokio::test]
    async fn test_empty_sequence_completes() {
        let (ctx, _control, _rx) = test_ctx();
        let outcome = execute_sequence(&ctx, &[], FailurePolicy::Abort).await;
        assert_eq!(outcome, TaskOutcome::Completed);
    }
}
