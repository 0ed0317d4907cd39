use csv::{ReaderBuilder, Trim};
use std::fs;
use std::path::Path;

use crate::error::{Result, ViewerError};
use crate::table::SampleTable;

/// Number of instrument-settings lines that precede the table in an export.
pub const DEFAULT_HEADER_LINES: usize = 20;

/// Parse oscilloscope CSV text into a sample table
///
/// The first `header_lines` physical lines (instrument settings) are
/// skipped, the next line names the columns and every remaining non-blank
/// line is one sample row.
///
/// # Arguments
/// * `text` - The full file contents
/// * `header_lines` - Number of leading lines to skip
///
/// # Returns
/// * `Result<SampleTable>` - The parsed table or an error
///
/// # Errors
/// * `EmptyTable` if nothing follows the skipped lines
/// * `Parse` if a value is not numeric or a row does not have one value per column
///
/// # Examples
/// ```
/// use scopeview::loader::parse_scope_csv;
///
/// let text = "Model,MDO3054\nTIME,CH1\n0.0,1.5\n0.1,1.6\n";
/// let table = parse_scope_csv(text, 1).unwrap();
/// assert_eq!(table.columns, vec!["TIME", "CH1"]);
/// assert_eq!(table.len(), 2);
/// ```
pub fn parse_scope_csv(text: &str, header_lines: usize) -> Result<SampleTable> {
    let body = skip_lines(text, header_lines);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(ViewerError::EmptyTable);
    }

    let columns: Vec<String> = headers.iter().map(str::to_string).collect();
    let width = columns.len();
    let mut table = SampleTable::new(columns);

    for result in reader.records() {
        let record = result?;
        let line = header_lines as u64 + record.position().map_or(0, |p| p.line());

        if record.len() != width {
            return Err(ViewerError::Parse {
                line,
                message: format!("expected {} values, found {}", width, record.len()),
            });
        }

        let mut row = Vec::with_capacity(width);
        for (field, name) in record.iter().zip(table.columns.iter()) {
            let value: f64 = field.parse().map_err(|_| ViewerError::Parse {
                line,
                message: format!("column {}: '{}' is not a number", name, field),
            })?;
            row.push(value);
        }
        table.rows.push(row);
    }

    Ok(table)
}

/// Decode an uploaded byte stream as UTF-8 and parse it.
///
/// A leading byte-order mark is ignored.
pub fn parse_scope_bytes(bytes: &[u8], header_lines: usize) -> Result<SampleTable> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    parse_scope_csv(text, header_lines)
}

/// Load an oscilloscope CSV export from disk
///
/// # Examples
/// ```no_run
/// use scopeview::loader::{read_scope_file, DEFAULT_HEADER_LINES};
///
/// match read_scope_file("tek5494.csv", DEFAULT_HEADER_LINES) {
///     Ok(table) => println!("Loaded {} rows", table.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn read_scope_file(path: impl AsRef<Path>, header_lines: usize) -> Result<SampleTable> {
    let bytes = fs::read(path)?;
    parse_scope_bytes(&bytes, header_lines)
}

// Returns the text after the first `n` lines, or "" if there are fewer.
fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn preamble(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("Setting{},value{}\n", i, i))
            .collect()
    }

    #[test]
    fn test_parse_skips_header_lines() {
        let text = format!(
            "{}TIME,CH1,CH2\n-1.0e-3,0.5,0.25\n0.0,0.75,0.5\n",
            preamble(DEFAULT_HEADER_LINES)
        );
        let table = parse_scope_csv(&text, DEFAULT_HEADER_LINES).unwrap();
        assert_eq!(table.columns, vec!["TIME", "CH1", "CH2"]);
        assert_eq!(table.rows, vec![vec![-1.0e-3, 0.5, 0.25], vec![0.0, 0.75, 0.5]]);
    }

    #[test]
    fn test_parse_reports_line_of_bad_value() {
        let text = format!("{}TIME,CH1\n0.0,1.0\n0.1,oops\n", preamble(3));
        match parse_scope_csv(&text, 3) {
            Err(ViewerError::Parse { line, message }) => {
                assert_eq!(line, 6);
                assert!(message.contains("CH1"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_short_row() {
        let text = "TIME,CH1,CH2\n0.0,1.0\n";
        assert!(matches!(
            parse_scope_csv(text, 0),
            Err(ViewerError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_long_row() {
        let text = format!("{}TIME,CH1\n0.0,1.0\n0.1,1.5,9.9\n", preamble(2));
        match parse_scope_csv(&text, 2) {
            Err(ViewerError::Parse { line, message }) => {
                assert_eq!(line, 5);
                assert!(message.contains("found 3"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_header_only_is_empty_table() {
        let table = parse_scope_csv("TIME,CH1\n", 0).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_parse_missing_header() {
        assert!(matches!(
            parse_scope_csv(&preamble(5), 20),
            Err(ViewerError::EmptyTable)
        ));
    }

    #[test]
    fn test_parse_bytes_strips_bom_and_rejects_bad_utf8() {
        let bytes = "\u{feff}TIME,CH1\n0,1\n".as_bytes();
        let table = parse_scope_bytes(bytes, 0).unwrap();
        assert_eq!(table.columns[0], "TIME");

        assert!(matches!(
            parse_scope_bytes(&[0xff, 0xfe, 0x00], 0),
            Err(ViewerError::Utf8(_))
        ));
    }

    #[test]
    fn test_read_scope_file() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", preamble(DEFAULT_HEADER_LINES)).unwrap();
        writeln!(file, "TIME,CH1,REF1").unwrap();
        writeln!(file, "0.0,1.0,2.0").unwrap();
        writeln!(file, "0.1,1.5,2.5").unwrap();
        file.flush().unwrap();

        let table = read_scope_file(file.path(), DEFAULT_HEADER_LINES)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_values("REF1").unwrap(), vec![2.0, 2.5]);
        Ok(())
    }
}
