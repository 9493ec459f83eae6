use super::QueryResult;
use anyhow::{Context, Result};
use std::path::Path;

/// `"9. PRODUCT AFFINITY (Top 20)"` → `"query_9._product_affinity_(top_20).csv"`.
///
/// Lower-cased, with spaces and path separators swapped for `_` so the name
/// can never point outside the export directory.
pub fn export_file_name(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("query_{slug}.csv")
}

/// Write the whole of `result`, header first, as CSV at `path`.
pub fn write_csv(result: &QueryResult, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(&result.columns)?;
    for row in &result.rows {
        wtr.write_record(row.iter().map(|d| d.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}
