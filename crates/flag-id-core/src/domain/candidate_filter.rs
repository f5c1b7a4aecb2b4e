//! Trait for the narrowing filters of the match cascade.

use std::collections::HashMap;

use super::{CandidateSet, DominantColorBucket, FlagImage, Stage};

/// Reference data and query a filter compares against.
///
/// The cascade builds one context for the full images and a fresh one for
/// the upper-left quadrants.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Query image (or its quadrant).
    pub query: &'a FlagImage,
    /// Dominant bucket of the query, ratio set.
    pub query_bucket: &'a DominantColorBucket,
    /// Dominant bucket of every reference flag.
    pub buckets: &'a HashMap<String, DominantColorBucket>,
    /// Image of every reference flag.
    pub images: &'a HashMap<String, FlagImage>,
}

/// A cascade stage that removes candidates.
///
/// Implementations must never add candidates or reorder survivors, and must
/// return the input untouched when it holds one candidate or none.
pub trait CandidateFilter: Send + Sync {
    /// Returns the name of this filter.
    fn name(&self) -> &'static str;

    /// Stage reported when this filter runs on full images.
    fn stage(&self) -> Stage;

    /// Stage reported when this filter runs on upper-left quadrants.
    fn quadrant_stage(&self) -> Stage;

    /// Removes candidates that do not match the query.
    fn apply(&self, candidates: CandidateSet, ctx: &FilterContext<'_>) -> CandidateSet;
}
