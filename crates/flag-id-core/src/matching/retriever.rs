//! Candidate retrieval from the flag index.

use serde::{Deserialize, Serialize};

use super::index::FlagIndex;
use crate::domain::{BucketCoord, CandidateSet, DominantColorBucket};

/// Which index buckets a query draws candidates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPolicy {
    /// Only the query's own bucket.
    Exact,
    /// Every bucket within this Chebyshev distance of the query's bucket.
    Neighbors {
        /// Maximum per-channel bucket distance.
        radius: u8,
    },
}

impl RetrievalPolicy {
    /// Policy for a neighbor radius, where 0 means exact lookup.
    #[must_use]
    pub const fn from_radius(radius: u8) -> Self {
        if radius == 0 {
            Self::Exact
        } else {
            Self::Neighbors { radius }
        }
    }

    /// Neighbor radius of this policy (0 for exact lookup).
    #[must_use]
    pub const fn radius(self) -> u8 {
        match self {
            Self::Exact => 0,
            Self::Neighbors { radius } => radius,
        }
    }
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self::Neighbors { radius: 1 }
    }
}

/// Collects candidate flags for a query bucket.
///
/// Neighboring coordinates are visited red, then blue, then green, each
/// ascending; coordinates outside `0..B` are skipped. Empty buckets add
/// nothing and traversal continues.
#[must_use]
pub fn retrieve(
    index: &FlagIndex,
    query: &DominantColorBucket,
    policy: RetrievalPolicy,
) -> CandidateSet {
    let center = query.coord;
    let max = index.buckets().max_index();
    let radius = policy.radius();

    let span = |value: u8| value.saturating_sub(radius)..=value.saturating_add(radius).min(max);

    let mut candidates = CandidateSet::new();
    if center.red > max || center.green > max || center.blue > max {
        return candidates;
    }

    for red in span(center.red) {
        for blue in span(center.blue) {
            for green in span(center.green) {
                if let Some(ids) = index.lookup(BucketCoord::new(red, green, blue)) {
                    for id in ids {
                        candidates.push(id.clone());
                    }
                }
            }
        }
    }

    candidates
}
