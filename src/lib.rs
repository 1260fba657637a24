pub mod balance;
pub mod calculator;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod format;
pub mod interest;
pub mod schedule;
pub mod sink;
pub mod summary;
pub mod types;

// re-export key types
pub use balance::{
    BalanceLedger, BalanceLedgerRow, BalanceReplay, CsvPaymentSource, PaymentEvent, PaymentSource,
};
pub use calculator::{
    amortisation_schedule, calculate_balance, calculate_balance_from, overpayment_schedule, ScheduleLedger,
    ScheduleReport,
};
pub use config::{BalanceRequest, LoanTerms, LoanTermsBuilder, ScheduleRequest};
pub use decimal::{Money, Rate};
pub use errors::{MortgageError, Result};
pub use interest::{AccrualEngine, CompoundingEngine, InterestCalculator, QuoteCache, RateQuote};
pub use schedule::{
    AmortizationSchedule, ComparisonRow, ComparisonSchedule, ScheduleEngine, ScheduledPayment,
};
pub use sink::{ConsoleSink, CsvSink, JsonSink, MemorySink, Table, Tabular, TabularSink};
pub use summary::{ComparisonSummary, LoanSummary, RateStructure, SummaryReporter};
pub use types::{BalanceMode, RateType, TermLength, TransactionDescription};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
