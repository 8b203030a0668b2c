//! CLI output formatting

use crate::{
    core::{ModuleState, RunStatus, StepOutcome},
    execution::BuildEvent,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
        RunStatus::Skipped => style("SKIPPED").dim().to_string(),
    }
}

/// Format a module state for display
pub fn format_module_state(state: &ModuleState) -> String {
    match state {
        ModuleState::Pending => style("PENDING").dim().to_string(),
        ModuleState::Running { step, .. } => style(format!("RUNNING ({})", step)).yellow().to_string(),
        ModuleState::Completed { .. } => style("COMPLETED").green().to_string(),
        ModuleState::Aborted { step, .. } => style(format!("ABORTED ({})", step)).red().to_string(),
        ModuleState::Skipped { reason } => style(format!("SKIPPED ({})", reason)).dim().to_string(),
    }
}

/// Format a step outcome for display
pub fn format_step_outcome(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Success => style("ok").green().to_string(),
        StepOutcome::FailedFatal { .. } => style("failed").red().to_string(),
        StepOutcome::FailedNonFatal { .. } => style("failed (ignored)").yellow().to_string(),
        StepOutcome::Skipped { .. } => style("skipped").dim().to_string(),
    }
}

/// Format a build event for display
pub fn format_build_event(event: &BuildEvent) -> String {
    match event {
        BuildEvent::RunStarted {
            run_id,
            build_name,
            modules,
        } => format!(
            "{} Starting build {} ({}) with {} module(s)",
            ROCKET,
            style(build_name).bold(),
            style(&run_id.to_string()[..8]).dim(),
            style(modules).cyan()
        ),
        BuildEvent::ModuleSkipped { module, reason } => {
            format!("{} {} skipped: {}", SKIP, style(module).dim(), style(reason).dim())
        }
        BuildEvent::ModuleStarted { module, steps } => {
            let steps: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
            format!(
                "\n{} {} [{}]",
                INFO,
                style(module).bold(),
                style(steps.join(" → ")).dim()
            )
        }
        BuildEvent::StepStarted { module, step } => {
            format!("{} {} {}", SPINNER, style(module).cyan(), step)
        }
        BuildEvent::StepSucceeded { module, step } => {
            format!("{} {} {}", CHECK, style(module).green(), step)
        }
        BuildEvent::StepSkipped {
            module,
            step,
            reason,
        } => format!("{} {} {}: {}", SKIP, style(module).dim(), step, style(reason).dim()),
        BuildEvent::StepWarning {
            module,
            step,
            message,
        } => format!(
            "{} {} {} failed (continuing): {}",
            WARN,
            style(module).yellow(),
            step,
            style(message).dim()
        ),
        BuildEvent::StepFailed {
            module,
            step,
            error,
        } => format!("{} {} {}: {}", CROSS, style(module).red(), step, style(error).dim()),
        BuildEvent::ModuleFinished { module, aborted } => {
            if *aborted {
                format!("{} {} aborted", CROSS, style(module).red())
            } else {
                format!("{} {} done", CHECK, style(module).green())
            }
        }
        BuildEvent::RunFinished { run_id, status } => {
            let status_str = match status {
                RunStatus::Completed => format!("{} completed", style("successfully").green()),
                RunStatus::Failed => style("failed").red().to_string(),
                other => format_status(*other),
            };
            format!(
                "\n{} Build ({}) {}",
                INFO,
                style(&run_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}
