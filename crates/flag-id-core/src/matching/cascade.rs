//! The match cascade.
//!
//! A query runs through dominant-bucket retrieval, the ratio filter and the
//! edge-density filter. If several candidates survive, the same three steps
//! run once more on upper-left quadrants, against a fresh index built from
//! the survivors only.

use std::collections::HashMap;

use tracing::{debug, info};

use super::edge::{EdgeConfig, EdgeDensityFilter, EdgeDetector};
use super::index::{BucketMap, FlagIndex};
use super::quantizer::dominant_color;
use super::ratio::RatioFilter;
use super::retriever::{retrieve, RetrievalPolicy};
use super::tolerance::Tolerance;
use crate::domain::{
    BucketCount, CandidateFilter, CandidateSet, DominantColorBucket, FilterContext, FlagImage,
    MatchOutcome, ReferenceCorpus, Stage, StageReport,
};
use crate::error::Result;

/// Match engine settings. Fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Buckets per color channel (B). Power of two in `1..=256`.
    pub buckets_per_dimension: u16,
    /// Which index buckets a query draws candidates from.
    pub retrieval: RetrievalPolicy,
    /// Acceptance band for dominant-color ratios.
    pub ratio_tolerance: Tolerance,
    /// Acceptance band for edge densities.
    pub edge_tolerance: Tolerance,
    /// Edge detection settings.
    pub edges: EdgeConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            buckets_per_dimension: 8,
            retrieval: RetrievalPolicy::default(),
            ratio_tolerance: Tolerance::default(),
            edge_tolerance: Tolerance::default(),
            edges: EdgeConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        BucketCount::new(self.buckets_per_dimension)?;
        self.ratio_tolerance.validate("ratio_tolerance")?;
        self.edge_tolerance.validate("edge_tolerance")?;
        self.edges.validate()
    }
}

/// Position of a query in the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    /// Nothing has run yet.
    Start,
    /// Candidates retrieved from the index.
    BucketFiltered,
    /// Ratio filter applied.
    RatioFiltered,
    /// Edge-density filter applied.
    EdgeFiltered,
    /// Quadrant pass applied.
    QuadrantRefined,
    /// Finished.
    Done,
}

impl CascadeState {
    /// State to move to after a stage left `candidates`.
    ///
    /// One candidate or none ends the cascade.
    #[must_use]
    pub fn advance(self, candidates: &CandidateSet) -> Self {
        if candidates.is_settled() {
            return Self::Done;
        }
        match self {
            Self::Start => Self::BucketFiltered,
            Self::BucketFiltered => Self::RatioFiltered,
            Self::RatioFiltered => Self::EdgeFiltered,
            Self::EdgeFiltered => Self::QuadrantRefined,
            Self::QuadrantRefined | Self::Done => Self::Done,
        }
    }
}

/// Index, per-flag buckets and images of one set of reference flags.
#[derive(Debug, Clone)]
struct ReferenceSet {
    index: FlagIndex,
    buckets: BucketMap,
    images: HashMap<String, FlagImage>,
}

impl ReferenceSet {
    fn build(flags: Vec<FlagImage>, bucket_count: BucketCount) -> Self {
        let (index, buckets) = FlagIndex::build(&flags, bucket_count);
        let mut images = HashMap::with_capacity(flags.len());
        for flag in flags {
            images.entry(flag.id.clone()).or_insert(flag);
        }
        Self {
            index,
            buckets,
            images,
        }
    }

    fn context<'a>(
        &'a self,
        query: &'a FlagImage,
        query_bucket: &'a DominantColorBucket,
    ) -> FilterContext<'a> {
        FilterContext {
            query,
            query_bucket,
            buckets: &self.buckets,
            images: &self.images,
        }
    }
}

/// Identifies query images against a reference corpus.
///
/// Built once, then shared by reference; `identify` takes `&self`.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatchConfig,
    bucket_count: BucketCount,
    reference: ReferenceSet,
    ratio: RatioFilter,
    edge: EdgeDensityFilter,
}

impl MatchEngine {
    /// Validates the configuration and indexes the corpus.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the configuration is invalid.
    pub fn new(corpus: ReferenceCorpus, config: MatchConfig) -> Result<Self> {
        config.validate()?;
        let bucket_count = BucketCount::new(config.buckets_per_dimension)?;
        let detector = EdgeDetector::new(config.edges)?;

        let reference = ReferenceSet::build(corpus.into_iter().collect(), bucket_count);
        info!(
            "Match engine ready: {} flags in {} buckets (B={})",
            reference.index.len(),
            reference.index.bucket_count(),
            bucket_count.get()
        );

        Ok(Self {
            ratio: RatioFilter::new(config.ratio_tolerance),
            edge: EdgeDensityFilter::new(detector, config.edge_tolerance),
            config,
            bucket_count,
            reference,
        })
    }

    /// Runs a query through the cascade.
    ///
    /// Never fails: no match is an empty candidate set and an undecidable
    /// match leaves several.
    #[must_use]
    pub fn identify(&self, query: &FlagImage) -> MatchOutcome {
        let query_bucket = dominant_color(query, self.bucket_count);
        let ctx = self.reference.context(query, &query_bucket);
        let mut trace = Vec::new();
        let mut candidates = CandidateSet::new();
        let mut state = CascadeState::Start;

        debug!("Identifying {} (bucket {:?})", query.id, query_bucket.coord);
        while state != CascadeState::Done {
            candidates = match state {
                CascadeState::Start => {
                    let index = &self.reference.index;
                    let found = retrieve(index, &query_bucket, self.config.retrieval);
                    record(&mut trace, Stage::Bucket, found)
                }
                CascadeState::BucketFiltered => {
                    run_filter(&self.ratio, candidates, &ctx, Stage::Ratio, &mut trace)
                }
                CascadeState::RatioFiltered => {
                    run_filter(&self.edge, candidates, &ctx, Stage::Edge, &mut trace)
                }
                CascadeState::EdgeFiltered => self.refine_quadrants(query, candidates, &mut trace),
                CascadeState::QuadrantRefined | CascadeState::Done => candidates,
            };
            state = state.advance(&candidates);
        }

        let decided_at = trace.last().map_or(Stage::Bucket, |r| r.stage);
        debug!(
            "{}: {} candidate(s), decided at {}",
            query.id,
            candidates.len(),
            decided_at.label()
        );
        MatchOutcome {
            query_bucket,
            candidates,
            decided_at,
            trace,
        }
    }

    /// Repeats retrieval, ratio and edge filtering on upper-left quadrants.
    ///
    /// The quadrant index holds only the current candidates, so the result is
    /// a subset of `candidates` in the same order.
    fn refine_quadrants(
        &self,
        query: &FlagImage,
        candidates: CandidateSet,
        trace: &mut Vec<StageReport>,
    ) -> CandidateSet {
        let query_quadrant = query.upper_left_quadrant();
        let survivors: Vec<FlagImage> = candidates
            .iter()
            .filter_map(|id| self.reference.images.get(id))
            .map(FlagImage::upper_left_quadrant)
            .collect();
        let local = ReferenceSet::build(survivors, self.bucket_count);
        let quadrant_bucket = dominant_color(&query_quadrant, self.bucket_count);
        let ctx = local.context(&query_quadrant, &quadrant_bucket);

        let found = retrieve(&local.index, &quadrant_bucket, self.config.retrieval);
        let mut remaining = candidates;
        remaining.retain(|id| found.contains(id));
        remaining = record(trace, Stage::QuadrantBucket, remaining);

        for filter in [&self.ratio as &dyn CandidateFilter, &self.edge] {
            if remaining.is_settled() {
                break;
            }
            remaining = run_filter(filter, remaining, &ctx, filter.quadrant_stage(), trace);
        }
        remaining
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Buckets per color channel.
    #[must_use]
    pub const fn buckets(&self) -> BucketCount {
        self.bucket_count
    }

    /// The reference index.
    #[must_use]
    pub const fn index(&self) -> &FlagIndex {
        &self.reference.index
    }

    /// Dominant bucket of a reference flag.
    #[must_use]
    pub fn bucket_of(&self, id: &str) -> Option<&DominantColorBucket> {
        self.reference.buckets.get(id)
    }

    /// Number of reference flags.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.reference.index.len()
    }

    /// Returns true if the engine has no reference flags.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reference.index.is_empty()
    }
}

fn run_filter(
    filter: &dyn CandidateFilter,
    candidates: CandidateSet,
    ctx: &FilterContext<'_>,
    stage: Stage,
    trace: &mut Vec<StageReport>,
) -> CandidateSet {
    let before = candidates.len();
    let after = filter.apply(candidates, ctx);
    debug!("{}: {before} -> {}", filter.name(), after.len());
    record(trace, stage, after)
}

fn record(trace: &mut Vec<StageReport>, stage: Stage, candidates: CandidateSet) -> CandidateSet {
    trace.push(StageReport {
        stage,
        remaining: candidates.as_slice().to_vec(),
    });
    candidates
}
