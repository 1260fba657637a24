use thiserror::Error;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug)]
pub enum MortgageError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid overpayment amount: {amount}")]
    InvalidOverpayment {
        amount: Money,
    },

    #[error("division by zero: {context}")]
    DivisionByZero {
        context: String,
    },

    #[error("calculation error: {message}")]
    Calculation {
        message: String,
    },

    #[error("ledger has no rows")]
    EmptyLedger,

    #[error("malformed payment record on line {line}: {message}")]
    MalformedPaymentRecord {
        line: u64,
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MortgageError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        MortgageError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MortgageError>;
