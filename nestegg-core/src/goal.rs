//! Savings goal types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Highest urgency.
pub const PRIORITY_HIGHEST: i32 = 1;
/// Lowest urgency.
pub const PRIORITY_LOWEST: i32 = 5;
pub const DEFAULT_PRIORITY: i32 = 3;

/// Opaque goal identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(String);

impl GoalId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GoalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GoalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A user-defined savings target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    /// Optional calendar deadline.
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// 1 (highest) to 5 (lowest).
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Suggested monthly amount; the allocator recomputes it, users may override it.
    #[serde(default)]
    pub monthly_contribution: Decimal,
    #[serde(default = "default_true")]
    pub auto_redistribute: bool,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_true() -> bool {
    true
}

impl Goal {
    /// New active goal with zero progress and default priority.
    pub fn new(title: impl Into<String>, target_amount: Decimal) -> Self {
        Self {
            id: GoalId::generate(),
            title: title.into(),
            target_amount,
            current_amount: Decimal::ZERO,
            deadline: None,
            priority: DEFAULT_PRIORITY,
            monthly_contribution: Decimal::ZERO,
            auto_redistribute: true,
            is_completed: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<GoalId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_current(mut self, current_amount: Decimal) -> Self {
        self.current_amount = current_amount;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_auto_redistribute(mut self, enabled: bool) -> Self {
        self.auto_redistribute = enabled;
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    /// Creation-boundary checks. The engine itself never calls this.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::EmptyTitle);
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(CoreError::NonPositiveTarget(self.target_amount));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(CoreError::NegativeCurrent(self.current_amount));
        }
        if !(PRIORITY_HIGHEST..=PRIORITY_LOWEST).contains(&self.priority) {
            return Err(CoreError::PriorityOutOfRange(self.priority));
        }
        if self.monthly_contribution < Decimal::ZERO {
            return Err(CoreError::NegativeContribution(self.monthly_contribution));
        }
        Ok(())
    }

    /// Amount still missing, never negative.
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Surplus above target, never negative.
    pub fn excess(&self) -> Decimal {
        (self.current_amount - self.target_amount).max(Decimal::ZERO)
    }

    /// Percentage of the target reached, capped at 100.
    pub fn progress(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return dec!(100);
        }
        (self.current_amount / self.target_amount * dec!(100))
            .min(dec!(100))
            .round_dp(1)
    }

    /// True once the accumulated amount reaches the target.
    pub fn target_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Deadline that still constrains contributions, i.e. strictly after `today`.
    pub fn future_deadline(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.deadline.filter(|d| *d > today)
    }
}
