use csv::Writer;

use crate::error::{Result, ViewerError};
use crate::table::SampleTable;

/// Convert a sample table to CSV
///
/// Writes the column header followed by one line per row, in row order.
/// Used to export exactly what the chart currently shows.
///
/// # Arguments
/// * `table` - The (usually filtered and decimated) table to export
///
/// # Returns
/// * `Result<String>` - CSV content or an error
///
/// # Examples
/// ```
/// use scopeview::table::SampleTable;
/// use scopeview::downloader::to_csv;
///
/// let table = SampleTable::from_rows(
///     vec!["TIME".to_string(), "CH1".to_string()],
///     vec![vec![0.0, 1.5]],
/// ).unwrap();
/// assert_eq!(to_csv(&table).unwrap(), "TIME,CH1\n0,1.5\n");
/// ```
pub fn to_csv(table: &SampleTable) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ViewerError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ViewerError::InvalidArgument(format!("export is not UTF-8: {}", e)))
}

/// File name offered for an export of `source`.
///
/// `capture.csv` becomes `capture_view.csv`; anything else gets `_view.csv`
/// appended.
pub fn export_file_name(source: &str) -> String {
    let stem = source
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source)
        .trim_end_matches(".csv")
        .trim_end_matches(".CSV");
    if stem.is_empty() {
        "scope_view.csv".to_string()
    } else {
        format!("{}_view.csv", stem)
    }
}
