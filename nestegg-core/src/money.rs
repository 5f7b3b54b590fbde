//! Decimal helpers for currency amounts.

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{CoreError, Result};

/// Currency amounts carry two decimal places.
pub const CURRENCY_DP: u32 = 2;

/// Round half-up (away from zero) to cents.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<sign>-)?\$?\s*(?P<digits>\d{1,3}(?:,\d{3})+|\d+)(?P<frac>\.\d{1,2})?\s*$")
            .expect("static amount regex")
    })
}

/// Parse user-entered amounts such as `1200`, `1,200.50` or `$1,200.50`.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let caps = amount_re()
        .captures(input)
        .ok_or_else(|| CoreError::InvalidAmount(input.to_string()))?;

    let mut normalized = String::new();
    if caps.name("sign").is_some() {
        normalized.push('-');
    }
    normalized.push_str(&caps["digits"].replace(',', ""));
    if let Some(frac) = caps.name("frac") {
        normalized.push_str(frac.as_str());
    }

    Decimal::from_str(&normalized).map_err(|_| CoreError::InvalidAmount(input.to_string()))
}
