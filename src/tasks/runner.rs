//! Task context shared by all maintenance recipes
//!
//! Wraps the message channel, the cancellation handle, and the configuration
//! so recipe code reads as a sequence of high-level operations.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use super::executor::{run_shell, RunResult, TaskControl};
use super::{ConfirmRequest, TaskMessage, TaskOutcome};
use crate::config::Config;

#[derive(Clone)]
pub struct TaskContext {
    tx: mpsc::Sender<TaskMessage>,
    control: Arc<TaskControl>,
    config: Config,
}

impl TaskContext {
    pub fn new(tx: mpsc::Sender<TaskMessage>, control: Arc<TaskControl>, config: Config) -> Self {
        Self {
            tx,
            control,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancel_requested(&self) -> bool {
        self.control.cancel_requested()
    }

    /// Send an output line
    pub async fn out(&self, msg: &str) {
        let _ = self.tx.send(TaskMessage::Line(msg.to_string())).await;
    }

    /// Print a header with title
    pub async fn header(&self, title: &str) {
        self.out("").await;
        self.out("==============================================").await;
        self.out(&format!("  {}", title)).await;
        self.out("==============================================").await;
        self.out("").await;
    }

    /// Announce the ordered step labels for this run
    pub async fn plan<S: Into<String>>(&self, steps: impl IntoIterator<Item = S>) {
        let _ = self
            .tx
            .send(TaskMessage::Plan {
                steps: steps.into_iter().map(Into::into).collect(),
            })
            .await;
    }

    pub async fn step_started(&self, step: &str) {
        let _ = self
            .tx
            .send(TaskMessage::StepStarted {
                step: step.to_string(),
            })
            .await;
    }

    pub async fn step_complete(&self, step: &str) {
        let _ = self
            .tx
            .send(TaskMessage::StepComplete {
                step: step.to_string(),
            })
            .await;
    }

    pub async fn step_failed(&self, step: &str, error: &str) {
        let _ = self
            .tx
            .send(TaskMessage::StepFailed {
                step: step.to_string(),
                error: error.to_string(),
            })
            .await;
    }

    pub async fn step_skipped(&self, step: &str) {
        let _ = self
            .tx
            .send(TaskMessage::StepSkipped {
                step: step.to_string(),
            })
            .await;
    }

    /// Send the final outcome
    pub async fn done(&self, outcome: TaskOutcome) {
        let _ = self.tx.send(TaskMessage::Done { outcome }).await;
    }

    /// Run one shell command, streaming its output through the channel
    pub async fn run(&self, command: &str) -> RunResult {
        run_shell(&self.control, &self.tx, command).await
    }

    /// Suspend until the user answers the confirmation prompt.
    ///
    /// Returns false when the prompt is declined or the UI went away.
    pub async fn confirm(&self, title: &str, details: Vec<String>) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        let sent = self
            .tx
            .send(TaskMessage::Confirm(ConfirmRequest {
                title: title.to_string(),
                details,
                reply: reply_tx,
            }))
            .await;
        if sent.is_err() {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }
}

/// Spawn a recipe worker with consistent error handling.
///
/// Recipe errors never propagate as faults: they are surfaced as a log line
/// plus a failed outcome, and the app returns to idle.
pub fn spawn_task<F, Fut>(ctx: TaskContext, operation: &'static str, f: F)
where
    F: FnOnce(TaskContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send,
{
    tokio::spawn(async move {
        if let Err(e) = f(ctx.clone()).await {
            tracing::error!("{} failed: {:#}", operation, e);
            ctx.out(&format!("Error: {:#}", e)).await;
            ctx.done(TaskOutcome::Failed {
                step: operation.to_string(),
            })
            .await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ctx(capacity: usize) -> (TaskContext, mpsc::Receiver<TaskMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let ctx = TaskContext::new(tx, Arc::new(TaskControl::new()), Config::default());
        (ctx, rx)
    }

    #[tokio::test]
    async fn test_out() {
        let (ctx, mut rx) = test_ctx(10);
        ctx.out("test message").await;

        match rx.recv().await.unwrap() {
            TaskMessage::Line(s) => assert_eq!(s, "test message"),
            other => panic!("Expected Line, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_header_emits_five_lines() {
        let (ctx, mut rx) = test_ctx(10);
        ctx.header("Test Title").await;
        drop(ctx);

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn test_confirm_accepted() {
        let (ctx, mut rx) = test_ctx(10);

        let worker = tokio::spawn(async move { ctx.confirm("Proceed?", vec![]).await });

        match rx.recv().await.unwrap() {
            TaskMessage::Confirm(req) => {
                assert_eq!(req.title, "Proceed?");
                req.reply.send(true).unwrap();
            }
            other => panic!("Expected Confirm, got {:?}", other),
        }
        assert!(worker.await.unwrap());
    }

    #[tokio::test]
    async fn test_confirm_dropped_reply_counts_as_decline() {
        let (ctx, mut rx) = test_ctx(10);

        let worker = tokio::spawn(async move { ctx.confirm("Proceed?", vec![]).await });

        match rx.recv().await.unwrap() {
            TaskMessage::Confirm(req) => drop(req.reply),
            other => panic!("Expected Confirm, got {:?}", other),
        }
        assert!(!worker.await.unwrap());
    }

    #[tokio::test]
    async fn test_spawn_task_surfaces_error_as_failed_done() {
        let (ctx, mut rx) = test_ctx(10);

        spawn_task(ctx, "Broken task", |_ctx| async {
            anyhow::bail!("boom")
        });

        let mut saw_line = false;
        let mut outcome = None;
        while let Some(msg) = rx.recv().await {
            match msg {
                TaskMessage::Line(l) if l.contains("boom") => saw_line = true,
                TaskMessage::Done { outcome: o } => {
                    outcome = Some(o);
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_line);
        assert_eq!(
            outcome,
            Some(TaskOutcome::Failed {
                step: "Broken task".to_string()
            })
        );
    }
}
