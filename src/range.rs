use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::table::SampleTable;

/// A closed interval on the time axis, as selected by zooming the chart.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct ViewportRange {
    pub low: f64,
    pub high: f64,
}

impl ViewportRange {
    /// Creates a range from two bounds in either order.
    ///
    /// Chart zoom events can report the bounds reversed when the user drags
    /// right to left, so they are sorted here.
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(ViewerError::InvalidArgument(format!(
                "range bounds must be finite, got {}..{}",
                a, b
            )));
        }
        Ok(ViewportRange {
            low: a.min(b),
            high: a.max(b),
        })
    }

    pub fn contains(&self, t: f64) -> bool {
        self.low <= t && t <= self.high
    }
}

/// Keeps the rows whose `TIME` value lies in `[low, high]`
///
/// Both ends are inclusive and row order is preserved. An interval that
/// matches no row (including one with `low > high`) gives an empty table.
///
/// # Errors
/// * `MissingTimeColumn` if the table has no `TIME` column
pub fn filter_range(table: &SampleTable, low: f64, high: f64) -> Result<SampleTable> {
    let t = table.time_index()?;
    let window = ViewportRange { low, high };
    Ok(table.retain_rows(|row| window.contains(row[t])))
}

/// Applies `range` if there is one, otherwise returns the table as is.
pub fn filter_range_or_identity(
    table: &SampleTable,
    range: Option<&ViewportRange>,
) -> Result<SampleTable> {
    match range {
        Some(r) => filter_range(table, r.low, r.high),
        None => Ok(table.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::ramp_table;

    #[test]
    fn test_filter_range_inclusive() {
        let table = ramp_table(100);
        let out = filter_range(&table, 20.0, 30.0).unwrap();
        assert_eq!(out.len(), 11);
        assert_eq!(out.rows.first().unwrap()[0], 20.0);
        assert_eq!(out.rows.last().unwrap()[0], 30.0);
    }

    #[test]
    fn test_filter_range_no_match_is_empty() {
        let table = ramp_table(100);
        assert!(filter_range(&table, 200.0, 300.0).unwrap().is_empty());
        assert!(filter_range(&table, 30.0, 20.0).unwrap().is_empty());
    }

    #[test]
    fn test_filter_range_requires_time_column() {
        let table = SampleTable::new(vec!["CH1".to_string()]);
        assert!(matches!(
            filter_range(&table, 0.0, 1.0),
            Err(ViewerError::MissingTimeColumn)
        ));
    }

    #[test]
    fn test_filter_range_keeps_repeated_timestamps() {
        let columns = vec!["TIME".to_string(), "CH1".to_string()];
        let rows = vec![
            vec![0.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 3.0],
            vec![2.0, 4.0],
        ];
        let table = SampleTable::from_rows(columns, rows).unwrap();
        let out = filter_range(&table, 1.0, 1.0).unwrap();
        assert_eq!(out.column_values("CH1").unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_no_range_is_identity() {
        let table = ramp_table(5);
        assert_eq!(filter_range_or_identity(&table, None).unwrap(), table);
    }

    #[test]
    fn test_viewport_range_orders_bounds() {
        let r = ViewportRange::new(30.0, 20.0).unwrap();
        assert_eq!(r.low, 20.0);
        assert_eq!(r.high, 30.0);
        assert!(r.contains(20.0) && r.contains(30.0));
        assert!(ViewportRange::new(f64::NAN, 1.0).is_err());
    }
}
