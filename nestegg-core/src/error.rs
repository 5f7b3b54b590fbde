//! Error types for invalid engine inputs.

use rust_decimal::Decimal;
use thiserror::Error;

/// Bad input reaching the domain layer.
///
/// "Nothing to do" is never an error here; see [`crate::Outcome`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("monthly income must be non-negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("savings percentage must be within 0..=100, got {0}")]
    SavingsPercentageOutOfRange(Decimal),

    #[error("goal title must not be empty")]
    EmptyTitle,

    #[error("target amount must be positive, got {0}")]
    NonPositiveTarget(Decimal),

    #[error("current amount must be non-negative, got {0}")]
    NegativeCurrent(Decimal),

    #[error("priority must be within 1..=5, got {0}")]
    PriorityOutOfRange(i32),

    #[error("contribution must be non-negative, got {0}")]
    NegativeContribution(Decimal),
}

pub type Result<T> = std::result::Result<T, CoreError>;
