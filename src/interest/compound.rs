use rust_decimal::Decimal;

use crate::decimal::{compound_factor, Money, Rate};
use crate::errors::{MortgageError, Result};
use crate::interest::InterestCalculator;

/// daily compounding across the gap between two dated events
///
/// interest = balance * ((1 + daily_rate)^days - 1)
#[derive(Debug, Clone, Copy)]
pub struct CompoundingEngine {
    daily_rate: Rate,
}

impl CompoundingEngine {
    pub fn new(annual_rate: Rate) -> Self {
        Self {
            daily_rate: annual_rate.daily_rate(),
        }
    }

    /// growth factor (1 + daily_rate)^days, `None` once it no longer fits a Decimal
    pub fn growth_factor(&self, days: u32) -> Option<Decimal> {
        compound_factor(self.daily_rate.as_decimal(), days)
    }
}

impl InterestCalculator for CompoundingEngine {
    fn interest_for_days(&self, balance: Money, days: u32) -> Result<Money> {
        let overflow = || MortgageError::Calculation {
            message: format!(
                "compounding {} a day over {} days overflows",
                self.daily_rate, days
            ),
        };
        let factor = self.growth_factor(days).ok_or_else(overflow)?;
        balance
            .as_decimal()
            .checked_mul(factor - Decimal::ONE)
            .map(Money::from_decimal)
            .ok_or_else(overflow)
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
    fn test_zero_days_accrues_nothing() {
        let engine = CompoundingEngine::new(Rate::from_percent(dec!(4.55)));
        assert_eq!(engine.interest_for_days(Money::from_major(331_794), 0).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_compounding_over_a_year() {
        // 365 daily compounding periods of 5% / 365 is roughly 5.127% effective
        let engine = CompoundingEngine::new(Rate::from_percentage(5));
        let interest = engine.interest_for_days(Money::from_major(10_000), 365).unwrap();
        assert!(interest > Money::from_major(512));
        assert!(interest < Money::from_major(513));
    }

    #[test]
    fn test_growth_factor_matches_repeated_daily_charge() {
        let engine = CompoundingEngine::new(Rate::from_percent(dec!(4.55)));
        let mut balance = Money::from_major(250_000);
        let opening = balance;
        for _ in 0..30 {
            balance += balance.apply_rate(engine.daily_rate());
        }
        let compounded = opening + engine.interest_for_days(opening, 30).unwrap();
        assert!((compounded - balance).abs() < Money::from_str_exact("0.000001").unwrap());
    }

    #[test]
    fn test_overflowing_gap_is_an_error() {
        // 300% a year compounded daily for a century is far beyond Decimal range
        let engine = CompoundingEngine::new(Rate::from_percentage(300));
        assert!(engine.growth_factor(36_500).is_none());
        assert!(matches!(
            engine.interest_for_days(Money::from_major(250_000), 36_500),
            Err(MortgageError::Calculation { .. })
        ));
    }
}
