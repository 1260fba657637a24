pub mod history;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::BalanceRequest;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::format::{format_currency, format_date, format_rate};
use crate::interest::{AccrualEngine, CompoundingEngine, InterestCalculator};
use crate::sink::{Table, Tabular};
use crate::types::{BalanceMode, TransactionDescription};

pub use history::{read_payments, CsvPaymentSource, PaymentEvent, PaymentSource};

pub const DAILY_COLUMNS: [&str; 8] = [
    "Date",
    "Total Loan Balance B/F",
    "Rate",
    "Transaction",
    "Description",
    "Mortgage Interest",
    "Principal repaid",
    "Total Loan Balance C/F",
];

pub const EVENT_COLUMNS: [&str; 8] = [
    "Date",
    "Total Loan Balance B/F",
    "Number of days since last payment",
    "Rate",
    "Transaction",
    "Mortgage Interest",
    "Principal repaid",
    "Total Loan Balance C/F",
];

/// one day (daily mode) or one payment (event mode) of a balance replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceLedgerRow {
    pub date: NaiveDate,
    pub opening_balance: Money,
    /// gap since the previous processed record; event mode only
    pub days_elapsed: Option<u32>,
    pub rate: Rate,
    pub transaction: Money,
    pub description: Option<TransactionDescription>,
    pub interest: Money,
    pub principal_repaid: Money,
    pub closing_balance: Money,
}

/// rows of a finished replay, chained opening -> closing
#[derive(Debug, Clone, Serialize)]
pub struct BalanceLedger {
    mode: BalanceMode,
    rows: Vec<BalanceLedgerRow>,
}

impl BalanceLedger {
    pub fn mode(&self) -> BalanceMode {
        self.mode
    }

    pub fn rows(&self) -> &[BalanceLedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn closing_balance(&self) -> Option<Money> {
        self.rows.last().map(|r| r.closing_balance)
    }

    pub fn total_interest(&self) -> Money {
        self.rows.iter().fold(Money::ZERO, |acc, r| acc + r.interest)
    }

    pub fn total_paid(&self) -> Money {
        self.rows.iter().fold(Money::ZERO, |acc, r| acc + r.transaction)
    }
}

impl Tabular for BalanceLedger {
    fn to_table(&self) -> Table {
        let columns: &[&str] = match self.mode {
            BalanceMode::Daily => &DAILY_COLUMNS,
            BalanceMode::PaymentEvent => &EVENT_COLUMNS,
        };
        let headers = columns.iter().map(|c| c.to_string()).collect();

        let rows = self
            .rows
            .iter()
            .map(|r| match self.mode {
                BalanceMode::Daily => vec![
                    format_date(r.date),
                    format_currency(r.opening_balance),
                    format_rate(r.rate),
                    format_currency(r.transaction),
                    r.description.map(|d| d.to_string()).unwrap_or_default(),
                    format_currency(r.interest),
                    format_currency(r.principal_repaid),
                    format_currency(r.closing_balance),
                ],
                BalanceMode::PaymentEvent => vec![
                    format_date(r.date),
                    format_currency(r.opening_balance),
                    r.days_elapsed.map(|d| d.to_string()).unwrap_or_default(),
                    format_rate(r.rate),
                    format_currency(r.transaction),
                    format_currency(r.interest),
                    format_currency(r.principal_repaid),
                    format_currency(r.closing_balance),
                ],
            })
            .collect();

        Table::new(headers, rows)
    }
}

/// replays recorded payments against interest accruing at the fixed rate
pub struct BalanceReplay<'a> {
    principal: Money,
    rate: Rate,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    today_payment: Money,
    time: &'a SafeTimeProvider,
}

impl<'a> BalanceReplay<'a> {
    pub fn new(principal: Money, rate: Rate, start_date: NaiveDate, time: &'a SafeTimeProvider) -> Self {
        Self {
            principal,
            rate,
            start_date,
            end_date: None,
            today_payment: Money::ZERO,
            time,
        }
    }

    /// replay configured from a validated request
    pub fn from_request(request: &BalanceRequest, time: &'a SafeTimeProvider) -> Result<Self> {
        request.validate()?;
        let mut replay = Self::new(request.loan_amount, request.fixed_rate(), request.start_date, time)
            .with_today_payment(request.today_override_payment);
        replay.end_date = request.end_date;
        Ok(replay)
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// payment used for "today" in place of any recorded amount
    pub fn with_today_payment(mut self, amount: Money) -> Self {
        self.today_payment = amount;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.time.now().date_naive()
    }

    pub fn run(&self, mode: BalanceMode, events: &[PaymentEvent]) -> Result<BalanceLedger> {
        match mode {
            BalanceMode::Daily => Ok(self.daily(events)),
            BalanceMode::PaymentEvent => self.by_payment_event(events),
        }
    }

    /// one row per calendar day from the start date to min(today, end date)
    pub fn daily(&self, events: &[PaymentEvent]) -> BalanceLedger {
        let today = self.today();
        let last_day = match self.end_date {
            Some(end) => end.min(today),
            None => today,
        };

        let mut paid_on: HashMap<NaiveDate, Money> = HashMap::new();
        for event in events {
            *paid_on.entry(event.date).or_insert(Money::ZERO) += event.amount;
        }

        let engine = AccrualEngine::new(self.rate);
        let mut balance = self.principal;
        let mut rows = Vec::new();

        for date in self.start_date.iter_days().take_while(|d| *d <= last_day) {
            let payment = if date == today {
                self.today_payment
            } else {
                paid_on.get(&date).copied().unwrap_or(Money::ZERO)
            };
            let interest = engine.daily_interest(balance);
            let closing = balance + interest - payment;

            rows.push(BalanceLedgerRow {
                date,
                opening_balance: balance,
                days_elapsed: None,
                rate: self.rate,
                transaction: payment,
                description: payment.is_positive().then_some(TransactionDescription::Payment),
                interest,
                principal_repaid: payment - interest,
                closing_balance: closing,
            });
            balance = closing;
        }

        tracing::info!(
            days = rows.len(),
            closing_balance = %balance,
            "daily balance replay complete"
        );

        BalanceLedger {
            mode: BalanceMode::Daily,
            rows,
        }
    }

    /// one row per recorded payment plus a final row for today
    ///
    /// Interest compounds daily across each gap. Events are walked in date
    /// order; the caller's slice is left as given.
    pub fn by_payment_event(&self, events: &[PaymentEvent]) -> Result<BalanceLedger> {
        let mut ordered = events.to_vec();
        if ordered.windows(2).any(|w| w[1].date < w[0].date) {
            tracing::warn!("payment history out of date order; replaying sorted copy");
            ordered.sort_by_key(|e| e.date);
        }

        let engine = CompoundingEngine::new(self.rate);
        let mut balance = self.principal;
        let mut last_date = self.start_date;
        let mut rows = Vec::with_capacity(ordered.len() + 1);

        let today = PaymentEvent::new(self.today(), self.today_payment);
        for event in ordered.iter().chain(std::iter::once(&today)) {
            let days = days_between(last_date, event.date);
            let interest = engine.interest_for_days(balance, days)?;
            let principal_repaid = event.amount - interest;
            let closing = balance - principal_repaid;

            rows.push(BalanceLedgerRow {
                date: event.date,
                opening_balance: balance,
                days_elapsed: Some(days),
                rate: self.rate,
                transaction: event.amount,
                description: None,
                interest,
                principal_repaid,
                closing_balance: closing,
            });
            balance = closing;
            last_date = last_date.max(event.date);
        }

        tracing::info!(
            payments = ordered.len(),
            closing_balance = %balance,
            "payment event balance replay complete"
        );

        Ok(BalanceLedger {
            mode: BalanceMode::PaymentEvent,
            rows,
        })
    }
}

/// whole days from `from` to `to`; a backwards gap accrues nothing
fn days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let days = (to - from).num_days();
    if days < 0 {
        tracing::warn!(
            from = %format_date(from),
            to = %format_date(to),
            "record dated before the previous one; accruing zero days"
        );
        return 0;
    }
    u32::try_from(days).unwrap_or(u32::MAX)
}
