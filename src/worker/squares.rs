//! Sum of squares
//!
//! Accumulates in `u128`. A single term `i²` with `i < 2^64` always fits; the
//! running sum is checked so an oversized range is reported as an overflow
//! instead of wrapping.

use crate::error::RunError;
use crate::partition::WorkRange;

/// Σ i² for i in `[range.start, range.end)`
///
/// # Errors
///
/// `Overflow` when the sum exceeds `u128::MAX`.
///
/// # Example
///
/// ```
/// use rangefold::partition::WorkRange;
/// use rangefold::worker::squares::compute_square_sum;
///
/// assert_eq!(compute_square_sum(WorkRange { start: 0, end: 5 }).unwrap(), 30);
/// ```
pub fn compute_square_sum(range: WorkRange) -> Result<u128, RunError> {
    let mut sum: u128 = 0;
    for i in range.iter() {
        let i = i as u128;
        sum = sum.checked_add(i * i).ok_or_else(|| {
            RunError::Overflow(format!("sum of squares over {} exceeds u128", range))
        })?;
    }
    Ok(sum)
}
