//! Contribution allocator: splits the monthly savings pool across active goals.
//!
//! Each active goal gets a priority-weighted share of the pool. A goal with a
//! deadline still ahead is floored at the monthly amount needed to reach its
//! target in time. Completed goals keep their last contribution.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::goal::{Goal, GoalId};
use crate::money::round_currency;
use crate::outcome::{Outcome, SkipReason};
use crate::plan::FinancialPlan;
use crate::time::months_left;
use crate::weighting::{priority_score, proportional_shares};

/// Per-goal breakdown of one allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationLine {
    pub goal_id: GoalId,
    pub score: u32,
    /// Unrounded share of the pool.
    pub priority_share: Decimal,
    /// Monthly amount the deadline demands, when one is still ahead.
    pub required_monthly: Option<Decimal>,
    /// Rounded amount written to `monthly_contribution`.
    pub contribution: Decimal,
}

impl AllocationLine {
    /// True when the deadline floor, not the priority share, decided the amount.
    pub fn deadline_bound(&self) -> bool {
        self.required_monthly
            .is_some_and(|required| required > self.priority_share)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Every input goal exactly once, in input order.
    pub goals: Vec<Goal>,
    pub total_available: Decimal,
    pub lines: Vec<AllocationLine>,
    pub outcome: Outcome,
}

/// Compute suggested monthly contributions for every active goal.
///
/// Pure: the input is not modified and `today` is supplied by the caller.
pub fn allocate(goals: &[Goal], plan: &FinancialPlan, today: NaiveDate) -> Allocation {
    let total_available = plan.total_available();

    let active: Vec<&Goal> = goals.iter().filter(|g| !g.is_completed).collect();
    if active.is_empty() {
        debug!("allocation skipped: no active goals");
        return Allocation {
            goals: goals.to_vec(),
            total_available,
            lines: Vec::new(),
            outcome: Outcome::Skipped(SkipReason::NoActiveGoals),
        };
    }

    let scores: Vec<u32> = active.iter().map(|g| priority_score(g.priority)).collect();
    let shares = proportional_shares(total_available, &scores);

    let lines: Vec<AllocationLine> = active
        .iter()
        .zip(scores.iter().zip(shares))
        .map(|(goal, (score, priority_share))| {
            let required_monthly = goal
                .future_deadline(today)
                .map(|deadline| goal.remaining() / Decimal::from(months_left(today, deadline)));

            let suggested = match required_monthly {
                Some(required) => priority_share.max(required),
                None => priority_share,
            };

            AllocationLine {
                goal_id: goal.id.clone(),
                score: *score,
                priority_share,
                required_monthly,
                contribution: round_currency(suggested),
            }
        })
        .collect();

    let mut updated = goals.to_vec();
    let mut next_line = lines.iter();
    for goal in updated.iter_mut().filter(|g| !g.is_completed) {
        if let Some(line) = next_line.next() {
            goal.monthly_contribution = line.contribution;
        }
    }

    debug!(
        active = lines.len(),
        total_available = %total_available,
        deadline_bound = lines.iter().filter(|l| l.deadline_bound()).count(),
        "allocated monthly contributions"
    );

    Allocation {
        goals: updated,
        total_available,
        lines,
        outcome: Outcome::Applied,
    }
}
