//! Match outcome and report types.

use serde::{Deserialize, Serialize};

use super::{BucketCoord, BucketCount, CandidateSet, DominantColorBucket};

/// A narrowing step of the match cascade.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Dominant-bucket retrieval over the full reference index.
    Bucket,
    /// Dominant-color ratio filter.
    Ratio,
    /// Edge-density filter.
    Edge,
    /// Retrieval over the index of upper-left quadrants.
    QuadrantBucket,
    /// Ratio filter on upper-left quadrants.
    QuadrantRatio,
    /// Edge-density filter on upper-left quadrants.
    QuadrantEdge,
}

impl Stage {
    /// Human-readable stage name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bucket => "dominant color",
            Self::Ratio => "dominant color ratio",
            Self::Edge => "edge density",
            Self::QuadrantBucket => "quadrant dominant color",
            Self::QuadrantRatio => "quadrant dominant color ratio",
            Self::QuadrantEdge => "quadrant edge density",
        }
    }
}

/// Candidates left after one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage that ran.
    pub stage: Stage,
    /// Survivors, in cascade order.
    pub remaining: Vec<String>,
}

/// How conclusive a match was.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Exactly one flag remains.
    Identified,
    /// Several flags could not be told apart.
    Ambiguous,
    /// No flag matched.
    Unmatched,
}

/// Result of running one query through the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Dominant bucket of the full query image.
    pub query_bucket: DominantColorBucket,
    /// Final candidates, possibly empty, possibly several.
    pub candidates: CandidateSet,
    /// Last stage that ran before the cascade stopped.
    pub decided_at: Stage,
    /// Survivors after every stage that ran.
    pub trace: Vec<StageReport>,
}

impl MatchOutcome {
    /// Classifies the outcome by number of surviving candidates.
    #[must_use]
    pub fn status(&self) -> MatchStatus {
        match self.candidates.len() {
            0 => MatchStatus::Unmatched,
            1 => MatchStatus::Identified,
            _ => MatchStatus::Ambiguous,
        }
    }

    /// Returns true if every candidate was eliminated.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The identified flag, if exactly one remains.
    #[must_use]
    pub fn identified(&self) -> Option<&str> {
        match self.candidates.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates dimensions from width and height.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Dominant color as reported to result consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColorReport {
    /// Bucket coordinate.
    pub bucket: BucketCoord,
    /// Fraction of pixels in the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f32>,
    /// Center color of the bucket as `#rrggbb`.
    pub hex: String,
}

impl DominantColorReport {
    /// Builds a report from a dominant bucket.
    #[must_use]
    pub fn new(bucket: &DominantColorBucket, buckets: BucketCount) -> Self {
        Self {
            bucket: bucket.coord,
            ratio: bucket.ratio,
            hex: bucket.hex(buckets),
        }
    }
}

/// Complete identification result for a single query image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyResult {
    /// Path to the query image.
    pub path: String,
    /// Timestamp of analysis (ISO 8601).
    pub timestamp: String,
    /// Query image dimensions.
    pub dimensions: ImageDimensions,
    /// Dominant color of the query.
    pub dominant_color: DominantColorReport,
    /// Match status.
    pub status: MatchStatus,
    /// Final candidate flags.
    pub candidates: Vec<String>,
    /// Stage at which the cascade stopped.
    pub decided_at: Stage,
    /// Survivors after each stage.
    pub stages: Vec<StageReport>,
}

impl IdentifyResult {
    /// Builds a result from a match outcome.
    #[must_use]
    pub fn from_outcome(
        path: impl Into<String>,
        timestamp: impl Into<String>,
        dimensions: ImageDimensions,
        outcome: MatchOutcome,
        buckets: BucketCount,
    ) -> Self {
        Self {
            path: path.into(),
            timestamp: timestamp.into(),
            dimensions,
            dominant_color: DominantColorReport::new(&outcome.query_bucket, buckets),
            status: outcome.status(),
            candidates: outcome.candidates.into_vec(),
            decided_at: outcome.decided_at,
            stages: outcome.trace,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn outcome(ids: &[&str]) -> MatchOutcome {
        MatchOutcome {
            query_bucket: DominantColorBucket::unset(),
            candidates: ids.iter().copied().collect(),
            decided_at: Stage::Bucket,
            trace: vec![],
        }
    }

    #[test]
    fn test_status_by_candidate_count() {
        assert_eq!(outcome(&[]).status(), MatchStatus::Unmatched);
        assert!(outcome(&[]).is_unmatched());
        assert_eq!(outcome(&["Ohio"]).status(), MatchStatus::Identified);
        assert_eq!(outcome(&["Ohio", "Utah"]).status(), MatchStatus::Ambiguous);
    }

    #[test]
    fn test_identified() {
        assert_eq!(outcome(&["Ohio"]).identified(), Some("Ohio"));
        assert_eq!(outcome(&["Ohio", "Utah"]).identified(), None);
        assert_eq!(outcome(&[]).identified(), None);
    }

    #[test]
    fn test_identify_result_json_shape() {
        let result = IdentifyResult::from_outcome(
            "query.png",
            "2024-01-01T00:00:00Z",
            ImageDimensions::new(10, 10),
            outcome(&["Ohio"]),
            BucketCount::default(),
        );
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "identified");
        assert_eq!(json["decided_at"], "bucket");
        assert_eq!(json["candidates"][0], "Ohio");
        assert_eq!(json["dominant_color"]["hex"], "#101010");
        assert!(json["dominant_color"].get("ratio").is_none());
    }
}
