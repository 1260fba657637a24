use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::decimal::{compound_factor, Money, Rate};
use crate::errors::{MortgageError, Result};

/// periodic rate and level payment for one rate period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateQuote {
    pub monthly_rate: Rate,
    pub level_payment: Money,
}

/// level payment that amortises `balance` over `remaining_months`
///
/// payment = B * r * (1 + r)^n / ((1 + r)^n - 1), with r = annual / 12.
/// A zero rate degenerates to straight-line repayment, B / n.
pub fn quote(balance: Money, annual_rate: Rate, remaining_months: u32) -> Result<RateQuote> {
    if remaining_months == 0 {
        return Err(MortgageError::DivisionByZero {
            context: "annuity quote over zero remaining months".to_string(),
        });
    }

    let monthly_rate = annual_rate.monthly_rate();
    let r = monthly_rate.as_decimal();

    let level_payment = if r.is_zero() {
        balance / Decimal::from(remaining_months)
    } else {
        let too_high = || MortgageError::InvalidInterestRate { rate: annual_rate };
        let factor = compound_factor(r, remaining_months).ok_or_else(too_high)?;
        let numerator = balance
            .as_decimal()
            .checked_mul(r)
            .and_then(|n| n.checked_mul(factor))
            .ok_or_else(too_high)?;
        let denominator = factor - Decimal::ONE;
        if denominator.is_zero() {
            return Err(MortgageError::DivisionByZero {
                context: format!("rate {} too small to amortise over {} months", annual_rate, remaining_months),
            });
        }
        Money::from_decimal(numerator / denominator)
    };

    Ok(RateQuote {
        monthly_rate,
        level_payment,
    })
}

/// memoised quotes for a single calculation run
///
/// Keyed by the full (balance, rate, remaining months) input, never by loan,
/// and dropped with the run that owns it.
#[derive(Debug, Default)]
pub struct QuoteCache {
    quotes: HashMap<(Money, Rate, u32), RateQuote>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quote(&mut self, balance: Money, annual_rate: Rate, remaining_months: u32) -> Result<RateQuote> {
        let key = (balance, annual_rate, remaining_months);
        if let Some(cached) = self.quotes.get(&key) {
            return Ok(*cached);
        }

        let computed = quote(balance, annual_rate, remaining_months)?;
        tracing::debug!(
            balance = %balance,
            rate = %annual_rate,
            remaining_months,
            level_payment = %computed.level_payment,
            "computed rate quote"
        );
        self.quotes.insert(key, computed);
        Ok(computed)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_annuity_payment() {
        let quote = quote(Money::from_major(330_000), Rate::from_percent(dec!(4.5)), 360).unwrap();
        assert_eq!(quote.monthly_rate.as_decimal(), dec!(0.00375));
        assert_eq!(quote.level_payment.round_dp(2), Money::from_str_exact("1672.06").unwrap());
    }

    #[test]
    fn test_twelve_month_loan() {
        // 100k at 12% over 12 months, classic textbook figure
        let quote = quote(Money::from_major(100_000), Rate::from_percentage(12), 12).unwrap();
        assert_eq!(quote.level_payment.round_dp(2), Money::from_str_exact("8884.88").unwrap());
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let quote = quote(Money::from_major(120_000), Rate::ZERO, 240).unwrap();
        assert_eq!(quote.level_payment, Money::from_major(500));
        assert!(quote.monthly_rate.is_zero());
    }

    #[test]
    fn test_zero_months_is_division_by_zero() {
        let result = quote(Money::from_major(1_000), Rate::from_percentage(5), 0);
        assert!(matches!(result, Err(MortgageError::DivisionByZero { .. })));
    }

    #[test]
    fn test_rate_too_high_to_price_is_rejected() {
        // 300% a year is 25% a month; 1.25^360 does not fit in a Decimal
        let rate = Rate::from_percentage(300);
        let result = quote(Money::from_major(330_000), rate, 360);
        assert!(matches!(result, Err(MortgageError::InvalidInterestRate { rate: r }) if r == rate));

        let mut cache = QuoteCache::new();
        assert!(cache.quote(Money::from_major(330_000), rate, 360).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_reuses_identical_inputs() {
        let mut cache = QuoteCache::new();
        let rate = Rate::from_percent(dec!(6.99));
        let first = cache.quote(Money::from_major(300_000), rate, 300).unwrap();
        let second = cache.quote(Money::from_major(300_000), rate, 300).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.quote(Money::from_major(299_000), rate, 300).unwrap();
        assert_eq!(cache.len(), 2);
    }
}
