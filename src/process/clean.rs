use super::{utils::thousands, RawRecord};
use chrono::{Datelike, NaiveDateTime};
use tracing::{debug, info};

/// Invoices starting with this letter reverse an earlier sale.
pub const CANCELLATION_MARKER: char = 'C';

/// A sale that passed every cleaning rule, with its calendar and money
/// columns worked out.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub invoice_date: NaiveDateTime,
    pub unit_price: f64,
    pub customer_id: String,
    pub country: String,
    pub total_price: f64,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub day_of_week: String,
    pub quarter: i32,
}

impl CleanedRecord {
    fn derive(raw: RawRecord, customer_id: String) -> Self {
        let date = raw.invoice_date.date();
        Self {
            total_price: raw.quantity as f64 * raw.unit_price,
            year: date.year(),
            month: date.month() as i32,
            day: date.day() as i32,
            day_of_week: date.format("%A").to_string(),
            quarter: ((date.month() - 1) / 3 + 1) as i32,
            invoice_no: raw.invoice_no,
            stock_code: raw.stock_code,
            description: raw.description,
            quantity: raw.quantity,
            invoice_date: raw.invoice_date,
            unit_price: raw.unit_price,
            customer_id,
            country: raw.country,
        }
    }
}

/// Why a row was dropped. Rules are checked in this order and a row is
/// counted under the first one it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Cancelled,
    NoCustomer,
    NonPositive,
}

fn check(raw: &RawRecord) -> Result<String, Rejection> {
    if raw.invoice_no.starts_with(CANCELLATION_MARKER) {
        return Err(Rejection::Cancelled);
    }
    let customer = match raw.customer_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(Rejection::NoCustomer),
    };
    // NaN fails `> 0.0` too
    if raw.quantity <= 0 || !(raw.unit_price > 0.0) {
        return Err(Rejection::NonPositive);
    }
    Ok(customer)
}

/// Drop cancelled, anonymous and non-positive rows, then derive the extra
/// columns for what is left. Prints how many rows were removed.
pub fn clean_transactions(raw: Vec<RawRecord>) -> Vec<CleanedRecord> {
    let original_len = raw.len();
    let (mut cancelled, mut no_customer, mut non_positive) = (0usize, 0usize, 0usize);

    let cleaned: Vec<CleanedRecord> = raw
        .into_iter()
        .filter_map(|r| match check(&r) {
            Ok(customer) => Some(CleanedRecord::derive(r, customer)),
            Err(Rejection::Cancelled) => {
                cancelled += 1;
                None
            }
            Err(Rejection::NoCustomer) => {
                no_customer += 1;
                None
            }
            Err(Rejection::NonPositive) => {
                non_positive += 1;
                None
            }
        })
        .collect();

    let removed = original_len - cleaned.len();
    debug!(cancelled, no_customer, non_positive, "rows rejected by rule");
    info!(kept = cleaned.len(), removed, "cleaned dataset");
    println!(
        "   Cleaned: {} rows (removed {} invalid records)",
        thousands(cleaned.len()),
        thousands(removed)
    );
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::date_parser::parse_invoice_date;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn raw(invoice: &str, qty: i64, price: f64, customer: Option<&str>, date: &str) -> RawRecord {
        RawRecord {
            invoice_no: invoice.to_string(),
            stock_code: "85123A".to_string(),
            description: Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
            quantity: qty,
            invoice_date: parse_invoice_date(date).unwrap(),
            unit_price: price,
            customer_id: customer.map(str::to_string),
            country: "United Kingdom".to_string(),
        }
    }

    #[test]
    fn derives_calendar_and_money_columns() {
        let out = clean_transactions(vec![raw("536365", 6, 2.55, Some("17850"), "12/1/2010 8:26")]);
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert_eq!(r.total_price, 6.0 * 2.55);
        assert_eq!((r.year, r.month, r.day), (2010, 12, 1));
        assert_eq!(r.day_of_week, "Wednesday");
        assert_eq!(r.quarter, 4);
        assert_eq!(r.customer_id, "17850");
    }

    #[test]
    fn weekday_names_in_english() {
        // 2011-01-03 is a Monday
        let names: Vec<String> = (3..=9)
            .map(|d| {
                let date = format!("2011-01-{d:02}");
                clean_transactions(vec![raw("1", 1, 1.0, Some("1"), &date)])
                    .remove(0)
                    .day_of_week
            })
            .collect();
        assert_eq!(
            names,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
    }

    #[test]
    fn quarters_follow_months() {
        let cases = [
            ("2011-01-15", 1),
            ("2011-03-31", 1),
            ("2011-04-01", 2),
            ("2011-06-30", 2),
            ("2011-07-01", 3),
            ("2011-09-30", 3),
            ("2011-10-01", 4),
            ("2011-12-31", 4),
        ];
        for (date, quarter) in cases {
            let out = clean_transactions(vec![raw("1", 1, 1.0, Some("1"), date)]);
            assert_eq!(out[0].quarter, quarter, "{date}");
        }
    }

    #[test]
    fn each_rule_drops_its_rows() {
        let rows = vec![
            raw("C536379", 1, 27.5, Some("14527"), "12/1/2010 9:41"),
            raw("536414", 56, 1.0, None, "12/1/2010 11:52"),
            raw("536415", 5, 1.0, Some("   "), "12/1/2010 11:52"),
            raw("536416", 0, 1.0, Some("1"), "12/1/2010 11:52"),
            raw("536417", -3, 1.0, Some("1"), "12/1/2010 11:52"),
            raw("536418", 3, 0.0, Some("1"), "12/1/2010 11:52"),
            raw("536419", 3, -1.5, Some("1"), "12/1/2010 11:52"),
            raw("536420", 3, f64::NAN, Some("1"), "12/1/2010 11:52"),
            raw("536421", 3, 1.5, Some("1"), "12/1/2010 11:52"),
        ];
        let out = clean_transactions(rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].invoice_no, "536421");
    }

    /// A row survives exactly when it passes all four rules, and its total is
    /// quantity times price.
    #[test]
    fn survivors_match_rules_on_generated_rows() {
        let mut rng = StdRng::seed_from_u64(0x_d00d_f00d);
        let rows: Vec<RawRecord> = (0..2_000)
            .map(|i| {
                let prefix = if rng.gen_bool(0.1) { "C" } else { "" };
                let customer = if rng.gen_bool(0.2) {
                    None
                } else {
                    Some(format!("{}", rng.gen_range(12000..18000)))
                };
                raw(
                    &format!("{prefix}{}", 536000 + i),
                    rng.gen_range(-5..20),
                    rng.gen_range(-2.0..10.0),
                    customer.as_deref(),
                    "2011-06-01 10:00:00",
                )
            })
            .collect();

        let expected: Vec<String> = rows
            .iter()
            .filter(|r| {
                !r.invoice_no.starts_with('C')
                    && r.customer_id.is_some()
                    && r.quantity > 0
                    && r.unit_price > 0.0
            })
            .map(|r| r.invoice_no.clone())
            .collect();

        let input = rows.clone();
        let out = clean_transactions(input);
        let got: Vec<String> = out.iter().map(|r| r.invoice_no.clone()).collect();
        assert_eq!(got, expected);

        for r in &out {
            assert_eq!(r.total_price, r.quantity as f64 * r.unit_price);
            assert!(r.quantity > 0 && r.unit_price > 0.0);
        }
    }
}
