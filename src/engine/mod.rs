//! Enforcement engine

pub mod actions;
pub mod enforcer;
pub mod report;

pub use enforcer::Enforcer;
pub use report::{EnforcementReport, EnforcementResult, HookResult, Outcome};
