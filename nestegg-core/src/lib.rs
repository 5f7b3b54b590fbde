//! nestegg-core: goal types and the contribution allocation engine.
//!
//! Everything here is pure. Callers pass the current goals, plan and date in,
//! and persist whatever comes back.

pub mod allocator;
pub mod error;
pub mod goal;
pub mod money;
pub mod outcome;
pub mod plan;
pub mod recurring;
pub mod redistributor;
pub mod time;
pub mod weighting;

pub use allocator::{allocate, Allocation, AllocationLine};
pub use error::CoreError;
pub use goal::{Goal, GoalId, DEFAULT_PRIORITY, PRIORITY_HIGHEST, PRIORITY_LOWEST};
pub use money::{parse_amount, round_currency};
pub use outcome::{Outcome, SkipReason};
pub use plan::FinancialPlan;
pub use recurring::{estimated_monthly_income, Frequency, RecurringTransaction, TransactionKind};
pub use redistributor::{redistribute_on_completion, Redistribution, Share};
pub use time::{months_between, months_left, parse_deadline, parse_timezone, today_in};
pub use weighting::priority_score;
