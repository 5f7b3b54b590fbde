//! The user's financial plan: income and the share earmarked for goals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialPlan {
    pub monthly_income: Decimal,
    /// 0 to 100.
    pub savings_percentage: Decimal,
    /// Reallocate automatically whenever the plan or the goal set changes.
    pub auto_distribute: bool,
}

impl Default for FinancialPlan {
    fn default() -> Self {
        Self {
            monthly_income: Decimal::ZERO,
            savings_percentage: dec!(20),
            auto_distribute: true,
        }
    }
}

impl FinancialPlan {
    pub fn new(monthly_income: Decimal, savings_percentage: Decimal) -> Self {
        Self {
            monthly_income,
            savings_percentage,
            auto_distribute: true,
        }
    }

    pub fn with_auto_distribute(mut self, enabled: bool) -> Self {
        self.auto_distribute = enabled;
        self
    }

    /// Plan-update boundary check; the allocator assumes a validated plan.
    pub fn validate(&self) -> Result<()> {
        if self.monthly_income < Decimal::ZERO {
            return Err(CoreError::NegativeIncome(self.monthly_income));
        }
        if self.savings_percentage < Decimal::ZERO || self.savings_percentage > dec!(100) {
            return Err(CoreError::SavingsPercentageOutOfRange(self.savings_percentage));
        }
        Ok(())
    }

    /// Monthly pool shared by all active goals.
    pub fn total_available(&self) -> Decimal {
        self.monthly_income * (self.savings_percentage / dec!(100))
    }
}
