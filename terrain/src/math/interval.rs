use crate::TerrainError;
use num_traits::Float;

/// Splits `[start, end]` into unit-aligned sub-intervals.
///
/// Every interior breakpoint is an integer, the first and last
/// intervals are clipped to `start` and `end`.
///
/// ```
/// # use terrain::math::split;
/// let intervals: Vec<(f64, f64)> = split(31.2, 32.7).unwrap().collect();
/// assert_eq!(intervals, [(31.2, 32.0), (32.0, 32.7)]);
/// ```
pub fn split<T: Float>(start: T, end: T) -> Result<Intervals<T>, TerrainError> {
    if !(start.is_finite() && end.is_finite() && start < end) {
        return Err(TerrainError::DegenerateInterval {
            start: start.to_f64().unwrap_or(f64::NAN),
            end: end.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(Intervals {
        cursor: Some(start),
        end,
    })
}

/// Iterator over the intervals produced by [`split`].
#[derive(Debug, Clone)]
pub struct Intervals<T> {
    cursor: Option<T>,
    end: T,
}

impl<T: Float> Iterator for Intervals<T> {
    type Item = (T, T);

    fn next(&mut self) -> Option<Self::Item> {
        let lo = self.cursor?;
        let hi = (lo + T::one()).floor();
        if hi >= self.end {
            self.cursor = None;
            Some((lo, self.end))
        } else {
            self.cursor = Some(hi);
            Some((lo, hi))
        }
    }
}
