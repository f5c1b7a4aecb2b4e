//! Dominant-color ratio filter.

use tracing::debug;

use super::index::BucketMap;
use super::tolerance::Tolerance;
use crate::domain::{CandidateFilter, CandidateSet, DominantColorBucket, FilterContext, Stage};

/// Removes candidates whose dominant-color ratio is outside the query's band.
///
/// No-op when one candidate or none remains, or when the query ratio was
/// never set. Candidates without a stored ratio cannot be compared and are kept.
#[must_use]
pub fn filter_by_ratio(
    mut candidates: CandidateSet,
    buckets: &BucketMap,
    query: &DominantColorBucket,
    tolerance: Tolerance,
) -> CandidateSet {
    if candidates.is_settled() {
        return candidates;
    }
    let Some(query_ratio) = query.ratio else {
        debug!("Query ratio not set, skipping ratio filter");
        return candidates;
    };

    let band = tolerance.band(query_ratio);
    debug!(
        "Ratio filter: query {query_ratio:.4}, band {:.4}..={:.4}",
        band.min, band.max
    );

    candidates.retain(|id| {
        match buckets.get(id).and_then(|b| b.ratio) {
            Some(ratio) => {
                let keep = band.contains(ratio);
                debug!("  {id}: ratio {ratio:.4} {}", if keep { "kept" } else { "removed" });
                keep
            }
            None => true,
        }
    });
    candidates
}

/// Cascade stage wrapping [`filter_by_ratio`].
#[derive(Debug, Clone, Copy)]
pub struct RatioFilter {
    tolerance: Tolerance,
}

impl RatioFilter {
    /// Creates a ratio filter with the given tolerance.
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl CandidateFilter for RatioFilter {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn stage(&self) -> Stage {
        Stage::Ratio
    }

    fn quadrant_stage(&self) -> Stage {
        Stage::QuadrantRatio
    }

    fn apply(&self, candidates: CandidateSet, ctx: &FilterContext<'_>) -> CandidateSet {
        filter_by_ratio(candidates, ctx.buckets, ctx.query_bucket, self.tolerance)
    }
}
