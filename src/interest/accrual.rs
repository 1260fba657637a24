use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::interest::InterestCalculator;

/// simple daily proration of an annual rate (annual / 365, no compounding)
///
/// Used by the day-by-day balance walk, where each day's interest is charged
/// on that day's opening balance.
#[derive(Debug, Clone, Copy)]
pub struct AccrualEngine {
    daily_rate: Rate,
}

impl AccrualEngine {
    pub fn new(annual_rate: Rate) -> Self {
        Self {
            daily_rate: annual_rate.daily_rate(),
        }
    }

    /// interest for a single day on `balance`
    pub fn daily_interest(&self, balance: Money) -> Money {
        balance.apply_rate(self.daily_rate)
    }
}

impl InterestCalculator for AccrualEngine {
    fn interest_for_days(&self, balance: Money, days: u32) -> Result<Money> {
        Ok(balance * (self.daily_rate.as_decimal() * Decimal::from(days)))
    }

    fn daily_rate(&self) -> Rate {
        self.daily_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_daily_rate_is_simple_proration() {
        let engine = AccrualEngine::new(Rate::from_percentage(5));
        assert_eq!(engine.daily_rate().as_decimal(), dec!(0.05) / dec!(365));
    }

    #[test]
    fn test_simple_interest() {
        let engine = AccrualEngine::new(Rate::from_percentage(5));
        let principal = Money::from_major(10_000);

        assert_eq!(engine.daily_interest(principal).round_dp(2), Money::from_str_exact("1.37").unwrap());

        let interest = engine.interest_for_days(principal, 30).unwrap();
        assert_eq!(interest.round_dp(2), Money::from_str_exact("41.10").unwrap());
    }

    #[test]
    fn test_zero_rate_accrues_nothing() {
        let engine = AccrualEngine::new(Rate::ZERO);
        assert_eq!(engine.daily_interest(Money::from_major(50_000)), Money::ZERO);
    }
}
