//! Result metadata for engine calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an engine call left the goals untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NoActiveGoals,
    GoalNotFound,
    AutoRedistributeDisabled,
    NoExcess,
    NoRecipients,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NoActiveGoals => "no active goals",
            SkipReason::GoalNotFound => "goal not found",
            SkipReason::AutoRedistributeDisabled => "auto-redistribute is disabled",
            SkipReason::NoExcess => "no excess above target",
            SkipReason::NoRecipients => "no active goals to receive the excess",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Applied,
    Skipped(SkipReason),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}
