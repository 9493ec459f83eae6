use super::QueryResult;
use prettytable::{format, Cell, Row, Table};

/// Format `result` for the console. Anything past `cap` rows is cut off and
/// a line stating the real total is put in front.
pub fn render(result: &QueryResult, cap: usize) -> String {
    let mut out = String::new();
    let shown = if result.len() > cap {
        out.push_str(&format!(
            "Showing first {} rows (total: {} rows)\n",
            cap,
            result.len()
        ));
        &result.rows[..cap]
    } else {
        &result.rows[..]
    };

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(
        result.columns.iter().map(|c| Cell::new(c)).collect(),
    ));

    for row in shown {
        table.add_row(Row::new(
            row.iter()
                .map(|d| {
                    let cell = Cell::new(&d.to_string());
                    if d.is_numeric() {
                        cell.style_spec("r")
                    } else {
                        cell
                    }
                })
                .collect(),
        ));
    }

    out.push_str(&table.to_string());
    if result.is_empty() {
        out.push_str("(no rows)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Datum;

    fn result(n: usize) -> QueryResult {
        QueryResult {
            columns: vec!["Country".into(), "Revenue".into()],
            rows: (0..n)
                .map(|i| vec![Datum::Text(format!("Country{i}")), Datum::Float(i as f64 + 0.5)])
                .collect(),
        }
    }

    #[test]
    fn short_results_print_in_full() {
        let text = render(&result(3), 20);
        assert!(!text.contains("Showing first"));
        assert!(text.contains("Country"));
        assert!(text.contains("Country2"));
        assert!(text.contains("2.5"));
    }

    #[test]
    fn long_results_are_truncated_with_notice() {
        let text = render(&result(25), 20);
        assert!(text.starts_with("Showing first 20 rows (total: 25 rows)"));
        assert!(text.contains("Country19"));
        assert!(!text.contains("Country20"));
    }

    #[test]
    fn cap_is_inclusive() {
        let text = render(&result(20), 20);
        assert!(!text.contains("Showing first"));
        assert!(text.contains("Country19"));
    }

    #[test]
    fn empty_result_still_shows_header() {
        let text = render(&result(0), 20);
        assert!(text.contains("Revenue"));
        assert!(text.contains("(no rows)"));
    }
}
