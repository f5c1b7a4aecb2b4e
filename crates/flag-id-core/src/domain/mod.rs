//! Core domain types for flag identification.

mod bucket;
mod candidate_filter;
mod candidates;
mod image;
mod result;

pub use bucket::{BucketCoord, BucketCount, DominantColorBucket};
pub use candidate_filter::{CandidateFilter, FilterContext};
pub use candidates::CandidateSet;
pub use image::{FlagImage, ReferenceCorpus};
pub use result::{
    DominantColorReport, IdentifyResult, ImageDimensions, MatchOutcome, MatchStatus, Stage,
    StageReport,
};
