//! Filter decision, a read must reach both quality and length cutoff.

/* crate use */
use serde::Serialize;

/* project use */
use crate::metrics::DerivedMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterThresholds {
    pub quality_cutoff: f64,
    pub length_cutoff: usize,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            quality_cutoff: 7.0,
            length_cutoff: 1000,
        }
    }
}

/// True if read quality and length are greater or equal to cutoffs
pub fn passes(metrics: &DerivedMetrics, thresholds: &FilterThresholds) -> bool {
    metrics.quality >= thresholds.quality_cutoff && metrics.length >= thresholds.length_cutoff
}
