use log::debug;

use crate::decimate::decimate;
use crate::error::Result;
use crate::range::{ViewportRange, filter_range_or_identity};
use crate::table::SampleTable;

/// Filters `raw` to the viewport (if any), then decimates to `point_budget`
///
/// Filtering always happens first: zooming shrinks the row count the
/// decimator sees, so the visible window is sampled more densely.
///
/// # Errors
/// * `InvalidArgument` for a non-positive budget
/// * `MissingTimeColumn` when a range is given and the table has no `TIME`
pub fn render_pipeline(
    raw: &SampleTable,
    range: Option<&ViewportRange>,
    point_budget: i64,
) -> Result<SampleTable> {
    let filtered = filter_range_or_identity(raw, range)?;
    let decimated = decimate(&filtered, point_budget)?;
    debug!(
        "pipeline: {} rows -> {} in range -> {} decimated (budget {})",
        raw.len(),
        filtered.len(),
        decimated.len(),
        point_budget
    );
    Ok(decimated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::filter_range;
    use crate::table::tests::ramp_table;

    #[test]
    fn test_zoom_then_decimate() {
        let table = ramp_table(100);
        let range = ViewportRange::new(20.0, 30.0).unwrap();
        let out = render_pipeline(&table, Some(&range), 5).unwrap();
        // 11 rows, step 2.2: indices 1, 3, 5, 7, 9
        assert_eq!(
            out.column_values("TIME").unwrap(),
            vec![21.0, 23.0, 25.0, 27.0, 29.0]
        );
    }

    #[test]
    fn test_filter_order_matters() {
        let table = ramp_table(100);
        let range = ViewportRange::new(20.0, 30.0).unwrap();
        let piped = render_pipeline(&table, Some(&range), 5).unwrap();

        let decimated_first = decimate(&table, 5).unwrap();
        let filtered_after = filter_range(&decimated_first, 20.0, 30.0).unwrap();

        assert_eq!(piped.len(), 5);
        assert_eq!(filtered_after.column_values("TIME").unwrap(), vec![30.0]);
    }

    #[test]
    fn test_no_range_matches_plain_decimation() {
        let table = ramp_table(100);
        assert_eq!(
            render_pipeline(&table, None, 10).unwrap(),
            decimate(&table, 10).unwrap()
        );
    }

    #[test]
    fn test_empty_window() {
        let table = ramp_table(100);
        let range = ViewportRange::new(500.0, 600.0).unwrap();
        assert!(render_pipeline(&table, Some(&range), 10).unwrap().is_empty());
    }
}
