//! Output formatting

use crate::engine::actions::process::Sweep;
use crate::engine::EnforcementReport;
use crate::output::human::format_human;
use crate::output::json::format_json;
use crate::policy::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Anything the CLI prints
#[derive(Debug, Clone, Copy)]
pub enum Output<'a> {
    Report(&'a EnforcementReport),
    Plan(&'a Policy),
    Sweep(&'a Sweep),
}

pub fn format_output(output: &Output<'_>, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(output),
        OutputFormat::Json => format_json(output),
    }
}
