//! Recurring transactions and deterministic projection of their occurrence dates.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::round_currency;
use crate::time::add_months_clamped;

/// Upper bound on dates returned by a single projection.
pub const MAX_PROJECTED_OCCURRENCES: usize = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Date of the `n`-th occurrence counted from `start` (n = 0 is `start`).
    ///
    /// Month-based steps are anchored on `start` so a 31st does not drift after February.
    pub fn nth_after(&self, start: NaiveDate, n: u32) -> NaiveDate {
        match self {
            Frequency::Daily => start
                .checked_add_signed(Duration::days(n as i64))
                .unwrap_or(NaiveDate::MAX),
            Frequency::Weekly => start
                .checked_add_signed(Duration::weeks(n as i64))
                .unwrap_or(NaiveDate::MAX),
            Frequency::Monthly => add_months_clamped(start, n),
            Frequency::Yearly => add_months_clamped(start, n.saturating_mul(12)),
        }
    }

    /// Multiplier that turns one occurrence into a monthly amount.
    pub fn per_month(&self) -> Decimal {
        match self {
            Frequency::Daily => dec!(365) / dec!(12),
            Frequency::Weekly => dec!(52) / dec!(12),
            Frequency::Monthly => Decimal::ONE,
            Frequency::Yearly => Decimal::ONE / dec!(12),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: String,
    pub title: String,
    /// Always positive; `kind` carries the direction.
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Last occurrence already turned into a real transaction.
    #[serde(default)]
    pub last_generated: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RecurringTransaction {
    pub fn new(
        title: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            amount: amount.abs(),
            kind,
            frequency,
            start_date,
            end_date: None,
            last_generated: None,
            active: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    fn within_end(&self, date: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| date <= end)
    }

    /// Occurrences from `start_date` onward, stopping at `end_date`.
    fn occurrences(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0u32..)
            .map(move |n| self.frequency.nth_after(self.start_date, n))
            .take_while(move |d| self.within_end(*d) && *d < NaiveDate::MAX)
    }

    /// First occurrence strictly after `after`.
    pub fn next_occurrence(&self, after: NaiveDate) -> Option<NaiveDate> {
        self.occurrences().find(|d| *d > after)
    }

    /// Occurrences not yet generated, up to and including `through`.
    pub fn due_occurrences(&self, through: NaiveDate) -> Vec<NaiveDate> {
        if !self.active {
            return Vec::new();
        }
        self.occurrences()
            .skip_while(|d| self.last_generated.is_some_and(|last| *d <= last))
            .take_while(|d| *d <= through)
            .take(MAX_PROJECTED_OCCURRENCES)
            .collect()
    }

    /// Signed amount normalized to one month; income is positive.
    pub fn monthly_equivalent(&self) -> Decimal {
        let monthly = round_currency(self.amount * self.frequency.per_month());
        match self.kind {
            TransactionKind::Income => monthly,
            TransactionKind::Expense => -monthly,
        }
    }
}

/// Monthly income implied by the active income items, a starting point for the plan.
pub fn estimated_monthly_income(items: &[RecurringTransaction]) -> Decimal {
    items
        .iter()
        .filter(|r| r.active && r.kind == TransactionKind::Income)
        .map(RecurringTransaction::monthly_equivalent)
        .sum()
}
