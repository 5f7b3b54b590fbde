//! Completion redistributor: moves a completed goal's surplus to the active goals.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::goal::{Goal, GoalId};
use crate::outcome::{Outcome, SkipReason};
use crate::weighting::{priority_score, split_exact};

/// Amount credited to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub goal_id: GoalId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redistribution {
    /// Every input goal exactly once, in input order.
    pub goals: Vec<Goal>,
    /// Surplus of the completed goal; zero when skipped before it was known.
    pub excess: Decimal,
    pub shares: Vec<Share>,
    pub outcome: Outcome,
}

impl Redistribution {
    fn skipped(goals: &[Goal], excess: Decimal, reason: SkipReason) -> Self {
        debug!(%reason, "redistribution skipped");
        Self {
            goals: goals.to_vec(),
            excess,
            shares: Vec::new(),
            outcome: Outcome::Skipped(reason),
        }
    }
}

/// Spread the surplus of `completed_id` over the other active goals by priority.
///
/// The completed goal itself is left as is; its `current_amount` keeps the surplus.
pub fn redistribute_on_completion(goals: &[Goal], completed_id: &GoalId) -> Redistribution {
    let Some(completed) = goals.iter().find(|g| &g.id == completed_id) else {
        return Redistribution::skipped(goals, Decimal::ZERO, SkipReason::GoalNotFound);
    };

    if !completed.auto_redistribute {
        return Redistribution::skipped(
            goals,
            Decimal::ZERO,
            SkipReason::AutoRedistributeDisabled,
        );
    }

    let excess = completed.current_amount - completed.target_amount;
    if excess <= Decimal::ZERO {
        return Redistribution::skipped(goals, Decimal::ZERO, SkipReason::NoExcess);
    }

    let is_recipient = |g: &Goal| !g.is_completed && &g.id != completed_id;
    let scores: Vec<u32> = goals
        .iter()
        .filter(|g| is_recipient(g))
        .map(|g| priority_score(g.priority))
        .collect();
    if scores.is_empty() {
        return Redistribution::skipped(goals, excess, SkipReason::NoRecipients);
    }

    let mut parts = split_exact(excess, &scores).into_iter();
    let mut updated = goals.to_vec();
    let mut shares = Vec::with_capacity(scores.len());
    for goal in updated.iter_mut().filter(|g| is_recipient(g)) {
        if let Some(amount) = parts.next() {
            goal.current_amount += amount;
            shares.push(Share {
                goal_id: goal.id.clone(),
                amount,
            });
        }
    }

    debug!(
        completed = %completed_id,
        excess = %excess,
        recipients = shares.len(),
        "redistributed surplus"
    );

    Redistribution {
        goals: updated,
        excess,
        shares,
        outcome: Outcome::Applied,
    }
}
