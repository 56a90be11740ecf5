//! Human-readable output formatting

use crate::engine::actions::process::Sweep;
use crate::engine::{EnforcementReport, Outcome};
use crate::output::Output;
use crate::policy::Policy;

pub fn format_human(output: &Output<'_>) -> String {
    match output {
        Output::Report(report) => format_report(report),
        Output::Plan(policy) => format_plan(policy),
        Output::Sweep(sweep) => format_sweep(sweep),
    }
}

fn format_report(report: &EnforcementReport) -> String {
    let title = format!("Policy: {}", report.policy);
    let mut output = format!("{}\n{}\n", title, "-".repeat(title.len()));
    if report.dry_run {
        output.push_str("[DRY RUN] No changes were made\n");
    }
    output.push('\n');

    output.push_str(&format!("{:<12} {:<16} {}\n", "STATUS", "KIND", "ACTION"));
    output.push_str(&"-".repeat(64));
    output.push('\n');
    for result in &report.results {
        output.push_str(&format!(
            "{:<12} {:<16} {}\n",
            result.outcome.label(),
            result.kind,
            truncate(&result.action_name, 48)
        ));
        if let Outcome::Failed(reason) = &result.outcome {
            output.push_str(&format!("{:>13}{}\n", "", reason));
        } else if result.outcome.is_change() {
            for detail in &result.details {
                output.push_str(&format!("{:>13}{}\n", "", detail));
            }
        }
    }

    if !report.hooks.is_empty() {
        output.push_str("\nHooks\n-----\n");
        for hook in &report.hooks {
            output.push_str(&format!("{:<12} {}\n", hook.outcome.label(), hook.command));
            if let Outcome::Failed(reason) = &hook.outcome {
                output.push_str(&format!("{:>13}{}\n", "", reason));
            }
        }
    }

    if let Some(reason) = &report.aborted {
        output.push_str(&format!("\nAborted: {}\n", reason));
    }

    let changed_label = if report.dry_run { "would apply" } else { "applied" };
    output.push_str(&format!(
        "\n{} {}, {} already satisfied, {} failed\n",
        report.applied_count(),
        changed_label,
        report.satisfied_count(),
        report.failed_count()
    ));
    output
}

fn format_plan(policy: &Policy) -> String {
    let title = format!("Plan: {} ({} actions)", policy.name, policy.actions.len());
    let mut output = format!("{}\n{}\n", title, "-".repeat(title.len()));
    for (i, action) in policy.actions.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {:<16} {}\n",
            i + 1,
            action.kind.label(),
            action.name
        ));
        output.push_str(&format!("     target: {}\n", action.target()));
        if action.critical {
            output.push_str("     critical: aborts the run on failure\n");
        }
        for hook in &action.notify {
            output.push_str(&format!("     notifies: {}\n", hook));
        }
    }
    output
}

fn format_sweep(sweep: &Sweep) -> String {
    let time = chrono::Local::now().format("%H:%M:%S");
    let mut output = String::new();
    for (i, detail) in sweep.details().iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("[{}] {}", time, detail));
    }
    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
