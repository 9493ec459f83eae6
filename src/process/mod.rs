// src/process/mod.rs
pub mod clean;
pub mod date_parser;
pub mod utils;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use serde::{de, Deserialize, Deserializer};
use std::{
    borrow::Cow,
    fs,
    io::{Cursor, Read},
    path::Path,
};
use tracing::{debug, info};

pub use clean::{clean_transactions, CleanedRecord};

/// One line of the transaction export, as the file states it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: String,
    #[serde(rename = "StockCode")]
    pub stock_code: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Quantity", deserialize_with = "de_trimmed")]
    pub quantity: i64,
    #[serde(rename = "InvoiceDate", deserialize_with = "de_invoice_date")]
    pub invoice_date: NaiveDateTime,
    #[serde(rename = "UnitPrice", deserialize_with = "de_trimmed")]
    pub unit_price: f64,
    #[serde(rename = "CustomerID", default, deserialize_with = "de_customer_id")]
    pub customer_id: Option<String>,
    #[serde(rename = "Country")]
    pub country: String,
}

/// Numbers may carry padding; text columns are kept exactly as written.
fn de_trimmed<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = String::deserialize(d)?;
    raw.trim()
        .parse()
        .map_err(|e| de::Error::custom(format!("invalid number {raw:?}: {e}")))
}

fn de_invoice_date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    date_parser::parse_invoice_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("unrecognised InvoiceDate {raw:?}")))
}

fn de_customer_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(utils::normalize_customer_id(&raw))
}

/// Read the dataset at `path` into memory and parse every row.
///
/// The whole file is buffered and decoded lossily, so a Latin-1 export loads
/// with replacement characters instead of failing halfway through. Any row
/// that does not parse aborts the load.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let mut file = fs::File::open(&path)
        .with_context(|| format!("Failed to open dataset: {:?}", path.as_ref()))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .with_context(|| format!("Failed to read dataset: {:?}", path.as_ref()))?;

    let text = String::from_utf8_lossy(&buf);
    if matches!(text, Cow::Owned(_)) {
        debug!("dataset is not valid UTF-8; decoded lossily");
    }

    let records = load_transactions_from_reader(Cursor::new(text.as_bytes()))
        .with_context(|| format!("Failed to parse dataset: {:?}", path.as_ref()))?;
    info!(rows = records.len(), "loaded dataset");
    Ok(records)
}

/// Parse headed CSV from any reader. Columns are matched by name. Text
/// fields are not trimmed: `"RED MUG "` and `"RED MUG"` stay two products.
pub fn load_transactions_from_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
        // header is line 1, so record `idx` sits on line idx + 2
        let record = result.with_context(|| format!("CSV parse error at line {}", idx + 2))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country\n";

    #[test]
    fn loads_uci_layout() -> Result<()> {
        let content = format!(
            "{HEADER}536365,85123A,WHITE HANGING HEART T-LIGHT HOLDER,6,12/1/2010 8:26,2.55,17850.0,United Kingdom\n\
             C536379,D,Discount,-1,12/1/2010 9:41,27.5,14527,United Kingdom\n\
             536414,22139,,56,12/1/2010 11:52,0,,United Kingdom\n"
        );
        let records = load_transactions_from_reader(content.as_bytes())?;
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.invoice_no, "536365");
        assert_eq!(first.quantity, 6);
        assert_eq!(first.unit_price, 2.55);
        assert_eq!(first.customer_id.as_deref(), Some("17850"));
        assert_eq!(
            first.invoice_date,
            date_parser::parse_invoice_date("2010-12-01 08:26:00").unwrap()
        );

        assert_eq!(records[1].quantity, -1);
        assert_eq!(records[2].description, None);
        assert_eq!(records[2].customer_id, None);
        Ok(())
    }

    #[test]
    fn columns_matched_by_name() -> Result<()> {
        let content = "Country,CustomerID,UnitPrice,InvoiceDate,Quantity,Description,StockCode,InvoiceNo,Extra\n\
                       France,12680,4.15,2011-12-09 12:50:00,4,ALARM CLOCK,22727,581587,x\n";
        let records = load_transactions_from_reader(content.as_bytes())?;
        assert_eq!(records[0].invoice_no, "581587");
        assert_eq!(records[0].country, "France");
        assert_eq!(records[0].description.as_deref(), Some("ALARM CLOCK"));
        Ok(())
    }

    #[test]
    fn text_fields_keep_their_spacing() -> Result<()> {
        let content = format!(
            "{HEADER}536370,22727,RED MUG ,2,12/1/2010 8:45, 2.5 ,12583,France\n\
             536371,22727,RED MUG,2,12/1/2010 8:45,2.5,12583,France \n"
        );
        let records = load_transactions_from_reader(content.as_bytes())?;
        assert_eq!(records[0].description.as_deref(), Some("RED MUG "));
        assert_eq!(records[1].description.as_deref(), Some("RED MUG"));
        assert_eq!(records[0].unit_price, 2.5);
        assert_eq!(records[1].country, "France ");
        Ok(())
    }

    #[test]
    fn bad_date_is_fatal() {
        let content = format!("{HEADER}536365,85123A,X,6,not a date,2.55,17850,United Kingdom\n");
        let err = load_transactions_from_reader(content.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn bad_quantity_is_fatal() {
        let content =
            format!("{HEADER}536365,85123A,X,six,12/1/2010 8:26,2.55,17850,United Kingdom\n");
        assert!(load_transactions_from_reader(content.as_bytes()).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_transactions(dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn latin1_bytes_load_lossily() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(HEADER.as_bytes())?;
        tmp.write_all(b"536365,85123A,CAF\xC9 MUG,6,12/1/2010 8:26,2.55,17850,France\n")?;
        tmp.flush()?;

        let records = load_transactions(tmp.path())?;
        assert_eq!(records.len(), 1);
        assert!(records[0]
            .description
            .as_deref()
            .unwrap()
            .starts_with("CAF"));
        Ok(())
    }
}
