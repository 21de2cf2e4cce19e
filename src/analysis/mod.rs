//! Frequency analysis over a loaded [`Dataset`](crate::Dataset).

pub mod frequency;
pub mod stats;

use std::panic::{self, AssertUnwindSafe};

use log::error;

pub use frequency::{
    analyze, Bucket, FrequencyAnalyzer, FrequencyBucket, FrequencyReport, FrequencyTable, Person,
    DEFAULT_MAX_UPPER, MAX_UPPER_LIMIT,
};
pub use stats::Summary;

use crate::error::AnalysisError;

/// Run `f`, turning a panic into [`AnalysisError::Compute`] so a failed run
/// is reported like any other error.
pub fn guarded<T>(f: impl FnOnce() -> Result<T, AnalysisError>) -> Result<T, AnalysisError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unexpected internal error".to_string());
        error!("Analysis panicked: {reason}");
        Err(AnalysisError::Compute(reason))
    })
}
