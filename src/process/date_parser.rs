use chrono::{NaiveDate, NaiveDateTime};

/// Layouts seen in exports of the retail dataset, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse an `InvoiceDate` field into a naive timestamp.
///
/// US-style `12/1/2010 8:26` is what the UCI export ships with; ISO forms show
/// up once the file has been round-tripped through other tools. A bare date
/// resolves to midnight.
pub fn parse_invoice_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
