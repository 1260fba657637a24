pub mod accrual;
pub mod annuity;
pub mod compound;

use crate::decimal::{Money, Rate};
use crate::errors::Result;

pub use accrual::AccrualEngine;
pub use annuity::{quote, QuoteCache, RateQuote};
pub use compound::CompoundingEngine;

/// trait for day-based interest accrual at a fixed daily rate
pub trait InterestCalculator {
    /// interest owed on `balance` after `days` elapse
    fn interest_for_days(&self, balance: Money, days: u32) -> Result<Money>;

    fn daily_rate(&self) -> Rate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_and_compound_agree_for_one_day() {
        let rate = Rate::from_percent(dec!(4.55));
        let simple = AccrualEngine::new(rate);
        let compound = CompoundingEngine::new(rate);
        let balance = Money::from_major(331_794);

        assert_eq!(
            simple.interest_for_days(balance, 1).unwrap(),
            compound.interest_for_days(balance, 1).unwrap()
        );
        assert!(compound.interest_for_days(balance, 30).unwrap() > simple.interest_for_days(balance, 30).unwrap());
    }
}
