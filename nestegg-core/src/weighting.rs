//! Priority weighting shared by the allocator and the redistributor.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::goal::{PRIORITY_HIGHEST, PRIORITY_LOWEST};
use crate::money::{round_currency, CURRENCY_DP};

/// Weight of a priority: 1 -> 5, 5 -> 1. Out-of-range priorities are clamped first.
pub fn priority_score(priority: i32) -> u32 {
    let p = priority.clamp(PRIORITY_HIGHEST, PRIORITY_LOWEST);
    (PRIORITY_LOWEST + 1 - p) as u32
}

/// Unrounded proportional share of `pool` for each score.
///
/// Returns an empty vector when `scores` sums to zero.
pub fn proportional_shares(pool: Decimal, scores: &[u32]) -> Vec<Decimal> {
    let sum: u32 = scores.iter().sum();
    if sum == 0 {
        return Vec::new();
    }
    let sum = Decimal::from(sum);
    scores
        .iter()
        .map(|s| Decimal::from(*s) * pool / sum)
        .collect()
}

/// Split `pool` into cent parts that add up to exactly `pool` (rounded to cents).
///
/// Largest remainder: every raw share is floored to cents, then the leftover
/// cents go one by one to the largest fractional remainders. Ties favour the
/// later position. No part is ever negative.
pub fn split_exact(pool: Decimal, scores: &[u32]) -> Vec<Decimal> {
    let pool = round_currency(pool);
    let raw = proportional_shares(pool, scores);
    let cent = Decimal::new(1, CURRENCY_DP);

    let mut parts: Vec<Decimal> = raw
        .iter()
        .map(|share| share.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::ToZero))
        .collect();

    let mut by_remainder: Vec<usize> = (0..raw.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = raw[a] - parts[a];
        let rb = raw[b] - parts[b];
        rb.cmp(&ra).then(b.cmp(&a))
    });

    let mut leftover = pool - parts.iter().copied().sum::<Decimal>();
    for i in by_remainder {
        if leftover < cent {
            break;
        }
        parts[i] += cent;
        leftover -= cent;
    }
    parts
}
