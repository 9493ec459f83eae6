use chrono::NaiveDate;
use std::path::PathBuf;

/// Dataset read by the loader, relative to the working directory.
pub const INPUT_PATH: &str = "ecommerce_data.csv";

/// DuckDB file rebuilt on every run.
pub const DB_PATH: &str = "ecommerce.db";

/// Rows printed per query before truncating the console view.
pub const DEFAULT_ROW_CAP: usize = 20;

/// Minimum number of shared invoices for a product pair to be reported.
pub const MIN_PAIR_SUPPORT: u32 = 10;

/// Churn is measured against this date rather than the newest invoice.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).expect("2024-12-31 is a valid date")
}

/// Every tunable of a report run. There is no CLI or config file: `default()`
/// holds the fixed values, tests swap the paths for temp dirs.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub input_path: PathBuf,
    pub db_path: PathBuf,
    /// Directory receiving the `query_*.csv` exports.
    pub export_dir: PathBuf,
    pub reference_date: NaiveDate,
    pub default_row_cap: usize,
    pub min_pair_support: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(INPUT_PATH),
            db_path: PathBuf::from(DB_PATH),
            export_dir: PathBuf::from("."),
            reference_date: reference_date(),
            default_row_cap: DEFAULT_ROW_CAP,
            min_pair_support: MIN_PAIR_SUPPORT,
        }
    }
}
