use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::balance::CsvPaymentSource;
use crate::decimal::{Money, Rate};
use crate::errors::{MortgageError, Result};
use crate::types::{BalanceMode, TermLength};

/// validated loan terms shared by every engine
///
/// Constructed once per calculation; there are no setters, so a schedule run
/// always sees the terms it started with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanTerms {
    principal: Money,
    fixed_rate: Rate,
    variable_rate: Rate,
    total_term_months: u32,
    fixed_term_months: u32,
}

impl LoanTerms {
    /// create and validate loan terms
    pub fn new(
        principal: Money,
        fixed_rate: Rate,
        variable_rate: Rate,
        total_term_months: u32,
        fixed_term_months: u32,
    ) -> Result<Self> {
        if !principal.is_positive() {
            return Err(MortgageError::config(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if total_term_months == 0 {
            return Err(MortgageError::config("total term must be at least one month"));
        }
        if fixed_term_months > total_term_months {
            return Err(MortgageError::config(format!(
                "fixed term of {} months exceeds total term of {} months",
                fixed_term_months, total_term_months
            )));
        }
        for rate in [fixed_rate, variable_rate] {
            if rate.is_negative() {
                return Err(MortgageError::InvalidInterestRate { rate });
            }
        }

        Ok(Self {
            principal,
            fixed_rate,
            variable_rate,
            total_term_months,
            fixed_term_months,
        })
    }

    /// single fixed rate for the whole term
    pub fn fixed_only(principal: Money, fixed_rate: Rate, total_term_months: u32) -> Result<Self> {
        Self::new(principal, fixed_rate, Rate::ZERO, total_term_months, 0)
    }

    pub fn builder() -> LoanTermsBuilder {
        LoanTermsBuilder::new()
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn fixed_rate(&self) -> Rate {
        self.fixed_rate
    }

    pub fn variable_rate(&self) -> Rate {
        self.variable_rate
    }

    pub fn total_term_months(&self) -> u32 {
        self.total_term_months
    }

    pub fn fixed_term_months(&self) -> u32 {
        self.fixed_term_months
    }

    pub fn total_term(&self) -> TermLength {
        TermLength::from_months(self.total_term_months)
    }

    pub fn fixed_term(&self) -> TermLength {
        TermLength::from_months(self.fixed_term_months)
    }

    /// months charged at the variable rate once the fixed period ends
    pub fn variable_term_months(&self) -> u32 {
        self.total_term_months - self.fixed_term_months
    }

    /// true when the schedule switches to a variable rate at some month
    pub fn has_variable_phase(&self) -> bool {
        !self.variable_rate.is_zero() && self.fixed_term_months < self.total_term_months
    }
}

/// a term as the caller gave it
#[derive(Debug, Clone, Copy)]
enum TermInput {
    Months(u32),
    Years(u32),
}

impl TermInput {
    fn months(self, label: &str) -> Result<u32> {
        match self {
            TermInput::Months(months) => Ok(months),
            TermInput::Years(years) => years
                .checked_mul(12)
                .ok_or_else(|| MortgageError::config(format!("{} of {} years is too long", label, years))),
        }
    }
}

/// builder for loan terms
#[derive(Debug, Default)]
pub struct LoanTermsBuilder {
    principal: Option<Money>,
    fixed_rate: Option<Rate>,
    variable_rate: Option<Rate>,
    total_term: Option<TermInput>,
    fixed_term: Option<TermInput>,
}

impl LoanTermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.principal = Some(amount);
        self
    }

    pub fn fixed_rate(mut self, rate: Rate) -> Self {
        self.fixed_rate = Some(rate);
        self
    }

    pub fn variable_rate(mut self, rate: Rate) -> Self {
        self.variable_rate = Some(rate);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.total_term = Some(TermInput::Months(months));
        self
    }

    pub fn term_years(mut self, years: u32) -> Self {
        self.total_term = Some(TermInput::Years(years));
        self
    }

    pub fn fixed_term_months(mut self, months: u32) -> Self {
        self.fixed_term = Some(TermInput::Months(months));
        self
    }

    pub fn fixed_term_years(mut self, years: u32) -> Self {
        self.fixed_term = Some(TermInput::Years(years));
        self
    }

    pub fn build(self) -> Result<LoanTerms> {
        let principal = self
            .principal
            .ok_or_else(|| MortgageError::config("loan amount is required"))?;
        let fixed_rate = self
            .fixed_rate
            .ok_or_else(|| MortgageError::config("fixed rate is required"))?;
        let total_term_months = self
            .total_term
            .ok_or_else(|| MortgageError::config("term is required"))?
            .months("term")?;
        let fixed_term_months = match self.fixed_term {
            Some(term) => term.months("fixed term")?,
            None => 0,
        };

        LoanTerms::new(
            principal,
            fixed_rate,
            self.variable_rate.unwrap_or(Rate::ZERO),
            total_term_months,
            fixed_term_months,
        )
    }
}

/// per-request input for schedule calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub loan_amount: Money,
    pub fixed_rate_pct: Decimal,
    pub total_term_years: u32,
    #[serde(default)]
    pub variable_rate_pct: Decimal,
    #[serde(default)]
    pub fixed_term_years: u32,
    #[serde(default)]
    pub overpayment_amount: Money,
    #[serde(default)]
    pub compare_with_standard: bool,
}

impl ScheduleRequest {
    pub fn new(loan_amount: Money, fixed_rate_pct: Decimal, total_term_years: u32) -> Self {
        Self {
            loan_amount,
            fixed_rate_pct,
            total_term_years,
            variable_rate_pct: Decimal::ZERO,
            fixed_term_years: 0,
            overpayment_amount: Money::ZERO,
            compare_with_standard: false,
        }
    }

    pub fn with_variable_rate(mut self, variable_rate_pct: Decimal, fixed_term_years: u32) -> Self {
        self.variable_rate_pct = variable_rate_pct;
        self.fixed_term_years = fixed_term_years;
        self
    }

    pub fn with_fixed_term_years(mut self, fixed_term_years: u32) -> Self {
        self.fixed_term_years = fixed_term_years;
        self
    }

    pub fn with_overpayment(mut self, amount: Money, compare_with_standard: bool) -> Self {
        self.overpayment_amount = amount;
        self.compare_with_standard = compare_with_standard;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// validated loan terms for this request
    pub fn loan_terms(&self) -> Result<LoanTerms> {
        LoanTerms::builder()
            .amount(self.loan_amount)
            .fixed_rate(Rate::from_percent(self.fixed_rate_pct))
            .variable_rate(Rate::from_percent(self.variable_rate_pct))
            .term_years(self.total_term_years)
            .fixed_term_years(self.fixed_term_years)
            .build()
    }

    pub fn validated_overpayment(&self) -> Result<Money> {
        if self.overpayment_amount.is_negative() {
            return Err(MortgageError::InvalidOverpayment {
                amount: self.overpayment_amount,
            });
        }
        Ok(self.overpayment_amount)
    }
}

/// per-request input for balance replay
///
/// Replay accrues at the fixed rate only; the term and variable-rate fields
/// are accepted so a replay request can describe the same mortgage as a
/// schedule request, and are checked for consistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub loan_amount: Money,
    pub fixed_rate_pct: Decimal,
    #[serde(with = "day_first")]
    pub start_date: NaiveDate,
    pub payment_history_location: PathBuf,
    #[serde(default)]
    pub total_term_years: u32,
    #[serde(default)]
    pub fixed_term_years: u32,
    #[serde(default)]
    pub variable_rate_pct: Decimal,
    #[serde(default)]
    pub use_daily_mode: bool,
    #[serde(default)]
    pub today_override_payment: Money,
    #[serde(default, with = "day_first_opt")]
    pub end_date: Option<NaiveDate>,
}

impl BalanceRequest {
    pub fn new(
        loan_amount: Money,
        fixed_rate_pct: Decimal,
        start_date: NaiveDate,
        payment_history_location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            loan_amount,
            fixed_rate_pct,
            start_date,
            payment_history_location: payment_history_location.into(),
            total_term_years: 0,
            fixed_term_years: 0,
            variable_rate_pct: Decimal::ZERO,
            use_daily_mode: false,
            today_override_payment: Money::ZERO,
            end_date: None,
        }
    }

    pub fn daily(mut self) -> Self {
        self.use_daily_mode = true;
        self
    }

    pub fn with_today_payment(mut self, amount: Money) -> Self {
        self.today_override_payment = amount;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn mode(&self) -> BalanceMode {
        if self.use_daily_mode {
            BalanceMode::Daily
        } else {
            BalanceMode::PaymentEvent
        }
    }

    pub fn fixed_rate(&self) -> Rate {
        Rate::from_percent(self.fixed_rate_pct)
    }

    /// csv reader over `payment_history_location`
    pub fn payment_source(&self) -> CsvPaymentSource {
        CsvPaymentSource::new(&self.payment_history_location)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.loan_amount.is_positive() {
            return Err(MortgageError::config(format!(
                "principal must be positive, got {}",
                self.loan_amount
            )));
        }
        for rate in [self.fixed_rate(), Rate::from_percent(self.variable_rate_pct)] {
            if rate.is_negative() {
                return Err(MortgageError::InvalidInterestRate { rate });
            }
        }
        if self.total_term_years > 0 && self.fixed_term_years > self.total_term_years {
            return Err(MortgageError::config(format!(
                "fixed term of {} years exceeds total term of {} years",
                self.fixed_term_years, self.total_term_years
            )));
        }
        if self.today_override_payment.is_negative() {
            return Err(MortgageError::InvalidOverpayment {
                amount: self.today_override_payment,
            });
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(MortgageError::InvalidDate {
                    message: format!("end date {} precedes start date {}", end, self.start_date),
                });
            }
        }
        Ok(())
    }
}

/// serde adapter for `dd/mm/yyyy` dates
mod day_first {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::format::{format_date, parse_day_first_date};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_day_first_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected dd/mm/yyyy date, got '{}'", raw)))
    }
}

mod day_first_opt {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::format::{format_date, parse_day_first_date};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&format_date(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => parse_day_first_date(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected dd/mm/yyyy date, got '{}'", s))),
        }
    }
}
