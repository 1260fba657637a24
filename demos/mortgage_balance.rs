/// mortgage balance - replay a payment history, by payment and then day by day
use chrono::{TimeZone, Utc};
use mortgage_ledger_rs::{
    calculate_balance, BalanceRequest, JsonSink, MemorySink, Money, PaymentSource, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // pin "today" so the demo output is stable
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    ));

    let history_path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/payment_history.csv");

    let start = chrono::NaiveDate::from_ymd_opt(2024, 11, 15).ok_or("invalid start date")?;
    let request = BalanceRequest::new(Money::from_major(331_794), dec!(4.55), start, history_path)
        .with_today_payment(Money::from_major(1_850));

    // one row per payment, exported as json
    let out_dir = std::env::temp_dir().join("mortgage_balance_demo");
    let mut json = JsonSink::new(&out_dir, &time);
    let by_payment = calculate_balance(&request, &time, &mut json)?;

    println!("=== by payment ===");
    for row in by_payment.rows() {
        println!(
            "{}  {:>3} days  interest {:>8}  balance {}",
            row.date.format("%d/%m/%Y"),
            row.days_elapsed.unwrap_or(0),
            row.interest.round_dp(2),
            row.closing_balance.round_dp(2)
        );
    }

    // day by day over the same window
    let daily_request = request.clone().daily();
    let daily = calculate_balance(&daily_request, &time, &mut MemorySink::new())?;

    println!("\n=== daily ===");
    println!("payments on file: {}", request.payment_source().payments()?.len());
    println!("days replayed: {}", daily.len());
    println!("interest charged: {}", daily.total_interest().round_dp(2));
    if let Some(balance) = daily.closing_balance() {
        println!("balance today: {}", balance.round_dp(2));
    }
    println!("\njson written under {}", out_dir.display());

    Ok(())
}
