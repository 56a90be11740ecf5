//! Enforcement results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    AlreadySatisfied,
    /// Dry run: the action would have changed the host
    WouldApply,
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Outcome::Applied | Outcome::WouldApply)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::AlreadySatisfied => "ok",
            Outcome::WouldApply => "would apply",
            Outcome::Failed(_) => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementResult {
    pub action_name: String,
    pub kind: String,
    pub target: String,
    pub outcome: Outcome,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookResult {
    pub command: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementReport {
    pub policy: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<EnforcementResult>,
    pub hooks: Vec<HookResult>,
    /// Set when a critical action failed and the run stopped early
    pub aborted: Option<String>,
}

impl EnforcementReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
            + self.hooks.iter().filter(|h| pred(&h.outcome)).count()
    }

    pub fn applied_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Applied | Outcome::WouldApply))
    }

    pub fn satisfied_count(&self) -> usize {
        self.count(|o| *o == Outcome::AlreadySatisfied)
    }

    pub fn failed_count(&self) -> usize {
        self.count(Outcome::is_failed)
    }

    /// True when every action was already satisfied
    pub fn is_compliant(&self) -> bool {
        self.aborted.is_none() && self.results.iter().all(|r| r.outcome == Outcome::AlreadySatisfied)
    }
}
