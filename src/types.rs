use serde::{Deserialize, Serialize};
use std::fmt;

/// which leg of the mortgage a month was charged under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateType {
    /// initial contracted rate
    Fixed,
    /// market-linked rate after the fixed period ends
    Variable,
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateType::Fixed => write!(f, "Fixed"),
            RateType::Variable => write!(f, "Variable"),
        }
    }
}

/// a number of months split into whole years and leftover months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLength {
    pub years: u32,
    pub months: u32,
}

impl TermLength {
    pub fn from_months(total: u32) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
        }
    }

    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }
}

impl fmt::Display for TermLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} year(s) and {} month(s)", self.years, self.months)
    }
}

/// description attached to a balance ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionDescription {
    Payment,
}

impl fmt::Display for TransactionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionDescription::Payment => write!(f, "Payment"),
        }
    }
}

/// how a balance replay walks time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceMode {
    /// one row per calendar day, simple daily proration
    Daily,
    /// one row per recorded payment, interest compounded across the gap
    PaymentEvent,
}
