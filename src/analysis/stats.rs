use serde::Serialize;

use super::frequency::FrequencyBucket;

/// Mean and median of the per-person booking counts, read back from the
/// bucketed table. Overflow people count as `max_upper + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    /// Lower median: element `n / 2` of the ascending sample.
    pub median: f64,
    pub sample_size: usize,
}

impl Summary {
    /// `buckets` must be in ascending bucket order, as a
    /// [`FrequencyTable`](super::FrequencyTable) keeps them.
    /// `None` for an empty sample.
    pub fn from_buckets(buckets: &[FrequencyBucket]) -> Option<Self> {
        let n: usize = buckets.iter().map(|b| b.student_count).sum();
        if n == 0 {
            return None;
        }
        let total: u64 = buckets
            .iter()
            .map(|b| u64::from(b.bucket.floor()) * b.student_count as u64)
            .sum();

        let target = n / 2;
        let mut seen = 0;
        let median = buckets.iter().find_map(|b| {
            seen += b.student_count;
            (seen > target).then(|| b.bucket.floor())
        })?;

        Some(Summary {
            mean: total as f64 / n as f64,
            median: f64::from(median),
            sample_size: n,
        })
    }
}
