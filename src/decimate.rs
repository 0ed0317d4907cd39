use crate::error::{Result, ViewerError};
use crate::table::SampleTable;

/// Row indices picked when reducing `total` rows to `n` points
///
/// The rows are split into `n` buckets of `total / n` rows (real-valued) and
/// the row nearest the middle of each bucket is taken, i.e.
/// `floor(i * step + step / 2)` for `i` in `0..n`. When `n >= total` every
/// index is returned.
///
/// # Errors
/// * `InvalidArgument` if `n <= 0`
///
/// # Examples
/// ```
/// use scopeview::decimate::decimation_indices;
///
/// let picked = decimation_indices(100, 10).unwrap();
/// assert_eq!(picked, vec![5, 15, 25, 35, 45, 55, 65, 75, 85, 95]);
/// ```
pub fn decimation_indices(total: usize, n: i64) -> Result<Vec<usize>> {
    if n <= 0 {
        return Err(ViewerError::InvalidArgument(format!(
            "point budget must be positive, got {}",
            n
        )));
    }

    let n = n as u64;
    if n >= total as u64 {
        return Ok((0..total).collect());
    }

    let n = n as usize;
    let step = total as f64 / n as f64;
    let last = total - 1;
    let indices = (0..n)
        .map(|i| {
            let idx = (i as f64 * step + step / 2.0).floor() as usize;
            idx.min(last)
        })
        .collect();

    Ok(indices)
}

/// Reduces a table to at most `n` rows by equally spaced point sampling
///
/// Every output row is a verbatim row of `table`, in the original order;
/// nothing is averaged or interpolated. If the table already has `n` rows or
/// fewer it is returned unchanged.
///
/// Decimating an already decimated table samples from the reduced rows, so
/// `decimate(decimate(t, a), b)` generally differs from `decimate(t, b)`.
///
/// # Errors
/// * `InvalidArgument` if `n <= 0`
pub fn decimate(table: &SampleTable, n: i64) -> Result<SampleTable> {
    let indices = decimation_indices(table.len(), n)?;
    if indices.len() == table.len() {
        return Ok(table.clone());
    }
    Ok(table.select_rows(&indices))
}
