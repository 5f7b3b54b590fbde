//! Planner error type.

use nestegg_core::{CoreError, GoalId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Bad input rejected at the plan/goal boundary.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("goal not found: {0}")]
    GoalNotFound(GoalId),

    #[error("recurring transaction not found: {0}")]
    RecurringNotFound(String),

    #[error("goal {0} is already completed")]
    GoalCompleted(GoalId),

    #[error("row {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PlannerError {
    /// True when the caller supplied invalid data, as opposed to a storage failure.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            PlannerError::Core(_)
                | PlannerError::GoalNotFound(_)
                | PlannerError::RecurringNotFound(_)
                | PlannerError::GoalCompleted(_)
                | PlannerError::InvalidRow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
