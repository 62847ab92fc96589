//! Named maintenance recipes
//!
//! Each recipe is a thin configuration list over the sequence engine: it
//! announces its step plan, optionally gates on user confirmation, queries
//! transient system state for dynamic steps, and reports a final outcome.
//! Recipe workers never fault; every error path lands back at `Done`.

use anyhow::Result;

use super::pacman;
use super::runner::{spawn_task, TaskContext};
use super::sequence::{execute_sequence, FailurePolicy, Step};
use super::TaskOutcome;

/// Standard step labels for consistent progress display
pub mod steps {
    pub const MIRRORS: &str = "Refreshing mirrors";
    pub const UPGRADE: &str = "Upgrading system";
    pub const AUR: &str = "Upgrading AUR packages";
    pub const CACHE: &str = "Cleaning package cache";
    pub const ORPHANS: &str = "Removing orphaned packages";
    pub const LOGS: &str = "Vacuuming logs";
    pub const CHECK: &str = "Checking package integrity";
    pub const RECHECK: &str = "Re-checking package integrity";
}

/// The available maintenance recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    RefreshMirrors,
    FullUpgrade,
    AurUpgrade,
    CheckDependencies,
    FixDependencies,
    CleanCache,
    RemoveOrphans,
    VacuumLogs,
    FullClean,
    AutoMaintenance,
}

impl Recipe {
    pub const ALL: &'static [Recipe] = &[
        Recipe::AutoMaintenance,
        Recipe::RefreshMirrors,
        Recipe::FullUpgrade,
        Recipe::AurUpgrade,
        Recipe::CheckDependencies,
        Recipe::FixDependencies,
        Recipe::CleanCache,
        Recipe::RemoveOrphans,
        Recipe::VacuumLogs,
        Recipe::FullClean,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Recipe::RefreshMirrors => "Refresh mirrors",
            Recipe::FullUpgrade => "Full system upgrade",
            Recipe::AurUpgrade => "AUR upgrade",
            Recipe::CheckDependencies => "Check dependencies",
            Recipe::FixDependencies => "Fix dependencies",
            Recipe::CleanCache => "Clean package cache",
            Recipe::RemoveOrphans => "Remove orphaned packages",
            Recipe::VacuumLogs => "Vacuum logs",
            Recipe::FullClean => "Full system clean",
            Recipe::AutoMaintenance => "Auto maintenance",
        }
    }
}

/// Spawn the worker for a recipe
pub fn start(recipe: Recipe, ctx: TaskContext) {
    match recipe {
        Recipe::RefreshMirrors => spawn_task(ctx, "Refresh mirrors", refresh_mirrors),
        Recipe::FullUpgrade => spawn_task(ctx, "Full system upgrade", full_upgrade),
        Recipe::AurUpgrade => spawn_task(ctx, "AUR upgrade", aur_upgrade),
        Recipe::CheckDependencies => spawn_task(ctx, "Check dependencies", check_dependencies),
        Recipe::FixDependencies => spawn_task(ctx, "Fix dependencies", fix_dependencies),
        Recipe::CleanCache => spawn_task(ctx, "Clean package cache", clean_cache),
        Recipe::RemoveOrphans => spawn_task(ctx, "Remove orphaned packages", remove_orphans),
        Recipe::VacuumLogs => spawn_task(ctx, "Vacuum logs", vacuum_logs),
        Recipe::FullClean => spawn_task(ctx, "Full system clean", full_clean),
        Recipe::AutoMaintenance => spawn_task(ctx, "Auto maintenance", auto_maintenance),
    }
}

/// Gate a step list on user confirmation, then run it.
///
/// Declining runs nothing and reports `Cancelled`.
pub async fn run_confirmed_sequence(
    ctx: &TaskContext,
    title: &str,
    details: Vec<String>,
    steps: &[Step],
    policy: FailurePolicy,
) -> TaskOutcome {
    if !ctx.confirm(title, details).await {
        ctx.out("Declined; nothing was changed.").await;
        return TaskOutcome::Cancelled;
    }
    execute_sequence(ctx, steps, policy).await
}

/// Steps for removing the given orphans; empty input yields no steps
pub fn orphan_cleanup_steps(config: &crate::config::Config, orphans: &[String]) -> Vec<Step> {
    if orphans.is_empty() {
        return Vec::new();
    }
    vec![Step::new(
        steps::ORPHANS,
        pacman::orphan_removal_command(config, orphans),
    )]
}

async fn refresh_mirrors(ctx: TaskContext) -> Result<()> {
    ctx.header("Refreshing mirrors").await;
    ctx.plan([steps::MIRRORS]).await;

    let step = Step::new(steps::MIRRORS, pacman::mirror_refresh_command(ctx.config()));
    let outcome = execute_sequence(&ctx, &[step], FailurePolicy::Abort).await;
    ctx.done(outcome).await;
    Ok(())
}

async fn full_upgrade(ctx: TaskContext) -> Result<()> {
    ctx.header("Full system upgrade").await;
    ctx.plan([steps::UPGRADE]).await;

    let step = Step::new(steps::UPGRADE, pacman::upgrade_command(ctx.config()));
    let outcome = execute_sequence(&ctx, &[step], FailurePolicy::Abort).await;
    ctx.done(outcome).await;
    Ok(())
}

async fn aur_upgrade(ctx: TaskContext) -> Result<()> {
    ctx.header("AUR upgrade").await;
    ctx.plan([steps::AUR]).await;

    // Optional tool: missing helper skips with a warning instead of failing
    let Some(helper) = pacman::detect_aur_helper(ctx.config()).await else {
        ctx.out("No AUR helper (yay/paru) found; skipping AUR upgrade.")
            .await;
        ctx.step_skipped(steps::AUR).await;
        ctx.done(TaskOutcome::CompletedWithWarnings).await;
        return Ok(());
    };

    let step = Step::new(steps::AUR, pacman::aur_upgrade_command(&helper));
    let outcome = execute_sequence(&ctx, &[step], FailurePolicy::Abort).await;
    ctx.done(outcome).await;
    Ok(())
}

async fn check_dependencies(ctx: TaskContext) -> Result<()> {
    ctx.header("Checking dependencies").await;
    ctx.plan([steps::CHECK]).await;
    ctx.step_started(steps::CHECK).await;

    let issues = pacman::integrity_issues().await?;
    if issues.is_empty() {
        ctx.out("No problems found.").await;
        ctx.step_complete(steps::CHECK).await;
        ctx.done(TaskOutcome::Completed).await;
        return Ok(());
    }

    ctx.out(&format!("{} problem(s) found:", issues.len())).await;
    for issue in &issues {
        ctx.out(&format!("  {}", issue)).await;
    }
    ctx.out("Run the fix dependencies task to repair.").await;
    ctx.step_complete(steps::CHECK).await;
    ctx.done(TaskOutcome::CompletedWithWarnings).await;
    Ok(())
}

async fn fix_dependencies(ctx: TaskContext) -> Result<()> {
    ctx.header("Fixing dependencies").await;
    ctx.plan([steps::CHECK, steps::UPGRADE, steps::RECHECK, steps::ORPHANS])
        .await;

    ctx.step_started(steps::CHECK).await;
    let issues = pacman::integrity_issues().await?;
    if issues.is_empty() {
        ctx.out("No problems found; nothing to fix.").await;
        ctx.step_complete(steps::CHECK).await;
        ctx.step_skipped(steps::UPGRADE).await;
        ctx.step_skipped(steps::RECHECK).await;
        ctx.step_skipped(steps::ORPHANS).await;
        ctx.done(TaskOutcome::Completed).await;
        return Ok(());
    }
    ctx.out(&format!("{} problem(s) found:", issues.len())).await;
    for issue in &issues {
        ctx.out(&format!("  {}", issue)).await;
    }
    ctx.step_complete(steps::CHECK).await;

    if !ctx
        .confirm(
            "Broken packages detected. Upgrade the system to repair them?",
            issues,
        )
        .await
    {
        ctx.out("Declined; nothing was changed.").await;
        ctx.done(TaskOutcome::Cancelled).await;
        return Ok(());
    }

    let upgrade = Step::new(steps::UPGRADE, pacman::upgrade_command(ctx.config()));
    let outcome = execute_sequence(&ctx, &[upgrade], FailurePolicy::Abort).await;
    if !outcome.is_success() {
        ctx.done(outcome).await;
        return Ok(());
    }

    ctx.step_started(steps::RECHECK).await;
    let remaining = pacman::integrity_issues().await?;
    let mut warned = false;
    if remaining.is_empty() {
        ctx.out("All problems repaired.").await;
    } else {
        ctx.out(&format!(
            "{} problem(s) remain after the upgrade:",
            remaining.len()
        ))
        .await;
        for issue in &remaining {
            ctx.out(&format!("  {}", issue)).await;
        }
        warned = true;
    }
    ctx.step_complete(steps::RECHECK).await;

    // Offer orphan removal; declining this optional offer skips the step
    // rather than cancelling the repair that already happened
    let orphans = pacman::list_orphans().await?;
    if orphans.is_empty() {
        ctx.out("No orphaned packages.").await;
        ctx.step_skipped(steps::ORPHANS).await;
    } else if ctx
        .confirm(
            &format!("Found {} orphaned package(s). Remove them?", orphans.len()),
            orphans.clone(),
        )
        .await
    {
        let cleanup = orphan_cleanup_steps(ctx.config(), &orphans);
        let outcome = execute_sequence(&ctx, &cleanup, FailurePolicy::Abort).await;
        if !outcome.is_success() {
            ctx.done(outcome).await;
            return Ok(());
        }
    } else {
        ctx.out("Keeping orphaned packages.").await;
        ctx.step_skipped(steps::ORPHANS).await;
    }

    ctx.done(if warned {
        TaskOutcome::CompletedWithWarnings
    } else {
        TaskOutcome::Completed
    })
    .await;
    Ok(())
}

async fn clean_cache(ctx: TaskContext) -> Result<()> {
    ctx.header("Cleaning package cache").await;
    ctx.plan([steps::CACHE]).await;

    let step = Step::new(steps::CACHE, pacman::cache_clean_command(ctx.config()));
    let outcome = execute_sequence(&ctx, &[step], FailurePolicy::Abort).await;
    ctx.done(outcome).await;
    Ok(())
}

async fn remove_orphans(ctx: TaskContext) -> Result<()> {
    ctx.header("Removing orphaned packages").await;
    ctx.plan([steps::ORPHANS]).await;

    let orphans = pacman::list_orphans().await?;
    if orphans.is_empty() {
        ctx.out("No orphaned packages found.").await;
        ctx.step_skipped(steps::ORPHANS).await;
        ctx.done(TaskOutcome::Completed).await;
        return Ok(());
    }

    let cleanup = orphan_cleanup_steps(ctx.config(), &orphans);
    let outcome = run_confirmed_sequence(
        &ctx,
        &format!("Remove {} orphaned package(s)?", orphans.len()),
        orphans,
        &cleanup,
        FailurePolicy::Abort,
    )
    .await;
    ctx.done(outcome).await;
    Ok(())
}

async fn vacuum_logs(ctx: TaskContext) -> Result<()> {
    ctx.header("Vacuuming logs").await;
    ctx.plan([steps::LOGS]).await;

    let step = Step::new(steps::LOGS, pacman::vacuum_logs_command(ctx.config()));
    let outcome = execute_sequence(&ctx, &[step], FailurePolicy::Abort).await;
    ctx.done(outcome).await;
    Ok(())
}

/// Cache + orphans + logs, best-effort: individual failures don't stop the
/// remaining cleanup steps.
async fn full_clean(ctx: TaskContext) -> Result<()> {
    ctx.header("Full system clean").await;

    let orphans = pacman::list_orphans().await?;
    let mut details = vec!["Clean the package cache".to_string()];
    if orphans.is_empty() {
        details.push("No orphaned packages to remove".to_string());
    } else {
        details.push(format!("Remove {} orphaned package(s):", orphans.len()));
        details.extend(orphans.iter().map(|o| format!("  {}", o)));
    }
    details.push("Vacuum journal logs".to_string());

    ctx.plan([steps::CACHE, steps::ORPHANS, steps::LOGS]).await;

    if !ctx.confirm("Run full system clean?", details).await {
        ctx.out("Declined; nothing was changed.").await;
        ctx.done(TaskOutcome::Cancelled).await;
        return Ok(());
    }

    let mut warned = false;

    let cache = Step::new(steps::CACHE, pacman::cache_clean_command(ctx.config()));
    match execute_sequence(&ctx, &[cache], FailurePolicy::BestEffort).await {
        TaskOutcome::Cancelled => {
            ctx.done(TaskOutcome::Cancelled).await;
            return Ok(());
        }
        TaskOutcome::CompletedWithWarnings => warned = true,
        _ => {}
    }

    if orphans.is_empty() {
        ctx.out("No orphaned packages found.").await;
        ctx.step_skipped(steps::ORPHANS).await;
    } else {
        let cleanup = orphan_cleanup_steps(ctx.config(), &orphans);
        match execute_sequence(&ctx, &cleanup, FailurePolicy::BestEffort).await {
            TaskOutcome::Cancelled => {
                ctx.done(TaskOutcome::Cancelled).await;
                return Ok(());
            }
            TaskOutcome::CompletedWithWarnings => warned = true,
            _ => {}
        }
    }

    let logs = Step::new(steps::LOGS, pacman::vacuum_logs_command(ctx.config()));
    match execute_sequence(&ctx, &[logs], FailurePolicy::BestEffort).await {
        TaskOutcome::Cancelled => {
            ctx.done(TaskOutcome::Cancelled).await;
            return Ok(());
        }
        TaskOutcome::CompletedWithWarnings => warned = true,
        _ => {}
    }

    ctx.done(if warned {
        TaskOutcome::CompletedWithWarnings
    } else {
        TaskOutcome::Completed
    })
    .await;
    Ok(())
}

/// Mirrors, upgrade, AUR, cache - abort on the first failure
async fn auto_maintenance(ctx: TaskContext) -> Result<()> {
    ctx.header("Full auto maintenance").await;
    ctx.plan([steps::MIRRORS, steps::UPGRADE, steps::AUR, steps::CACHE])
        .await;

    if !ctx
        .confirm(
            "Run full auto maintenance?",
            vec![
                "1. Refresh mirrors".to_string(),
                "2. Full system upgrade".to_string(),
                "3. AUR upgrade (if a helper is installed)".to_string(),
                "4. Clean package cache".to_string(),
            ],
        )
        .await
    {
        ctx.out("Declined; nothing was changed.").await;
        ctx.done(TaskOutcome::Cancelled).await;
        return Ok(());
    }

    let config = ctx.config().clone();
    let first = [
        Step::new(steps::MIRRORS, pacman::mirror_refresh_command(&config)),
        Step::new(steps::UPGRADE, pacman::upgrade_command(&config)),
    ];
    let outcome = execute_sequence(&ctx, &first, FailurePolicy::Abort).await;
    if !outcome.is_success() {
        ctx.done(outcome).await;
        return Ok(());
    }

    match pacman::detect_aur_helper(&config).await {
        Some(helper) => {
            let aur = Step::new(steps::AUR, pacman::aur_upgrade_command(&helper));
            let outcome = execute_sequence(&ctx, &[aur], FailurePolicy::Abort).await;
            if !outcome.is_success() {
                ctx.done(outcome).await;
                return Ok(());
            }
        }
        None => {
            ctx.out("No AUR helper (yay/paru) found; skipping AUR upgrade.")
                .await;
            ctx.step_skipped(steps::AUR).await;
        }
    }

    let cache = Step::new(steps::CACHE, pacman::cache_clean_command(&config));
    let outcome = execute_sequence(&ctx, &[cache], FailurePolicy::Abort).await;
    ctx.done(outcome).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tasks::executor::TaskControl;
    use crate::tasks::TaskMessage;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn test_ctx() -> (TaskContext, mpsc::Receiver<TaskMessage>) {
        let (tx, rx) = mpsc::channel(200);
        let ctx = TaskContext::new(tx, Arc::new(TaskControl::new()), Config::default());
        (ctx, rx)
    }

    #[test]
    fn test_recipe_titles_are_unique() {
        let mut titles: Vec<&str> = Recipe::ALL.iter().map(|r| r.title()).collect();
        let before = titles.len();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), before);
    }

    #[test]
    fn test_orphan_cleanup_steps_empty_list_yields_no_steps() {
        let config = Config::default();
        assert!(orphan_cleanup_steps(&config, &[]).is_empty());
    }

    #[test]
    fn test_orphan_cleanup_steps_builds_removal_command() {
        let config = Config::default();
        let steps = orphan_cleanup_steps(&config, &["libfoo".to_string()]);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, steps::ORPHANS);
        assert!(steps[0].command.contains("pacman -Rns libfoo"));
    }

    #[tokio::test]
    async fn test_declined_gate_runs_no_steps() {
        let (ctx, mut rx) = test_ctx();
        let steps = vec![Step::new("Echo", "echo should-not-run")];

        let worker = tokio::spawn(async move {
            run_confirmed_sequence(&ctx, "Proceed?", vec![], &steps, FailurePolicy::Abort).await
        });

        // Decline the gate, then drain
        let mut saw_step = false;
        while let Some(msg) = rx.recv().await {
            match msg {
                TaskMessage::Confirm(req) => {
                    let _ = req.reply.send(false);
                }
                TaskMessage::StepStarted { .. } | TaskMessage::StepComplete { .. } => {
                    saw_step = true;
                }
                TaskMessage::Line(l) => assert!(!l.contains("should-not-run")),
                _ => {}
            }
        }
        assert_eq!(worker.await.unwrap(), TaskOutcome::Cancelled);
        assert!(!saw_step);
    }

    #[tokio::test]
    async fn test_accepted_gate_runs_steps() {
        let (ctx, mut rx) = test_ctx();
        let steps = vec![Step::new("Echo", "echo ran")];

        let worker = tokio::spawn(async move {
            run_confirmed_sequence(&ctx, "Proceed?", vec![], &steps, FailurePolicy::Abort).await
        });

        let mut saw_output = false;
        while let Some(msg) = rx.recv().await {
            match msg {
                TaskMessage::Confirm(req) => {
                    let _ = req.reply.send(true);
                }
                TaskMessage::Line(l) if l == "ran" => saw_output = true,
                _ => {}
            }
        }
        assert_eq!(worker.await.unwrap(), TaskOutcome::Completed);
        assert!(saw_output);
    }
}
