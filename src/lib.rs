pub mod config;
pub mod duck;
pub mod process;
pub mod query;
pub mod report;

pub use config::ReportConfig;
pub use report::{run_pipeline, ReportSummary};
