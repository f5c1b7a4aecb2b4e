//! Flag ID Core - Domain types and the flag matching cascade
//!
//! This crate contains the core domain types, the color quantizer and index,
//! the candidate filters, and the cascade that identifies a query image
//! against a reference corpus of flags.

pub mod domain;
pub mod error;
pub mod matching;
pub mod ports;

pub use domain::{
    BucketCoord, BucketCount, CandidateSet, DominantColorBucket, DominantColorReport, FlagImage,
    IdentifyResult, ImageDimensions, MatchOutcome, MatchStatus, ReferenceCorpus, Stage,
    StageReport,
};
pub use error::{Error, Result};
pub use matching::{EdgeConfig, MatchConfig, MatchEngine, RetrievalPolicy, Tolerance};
pub use ports::{CorpusSource, ImageSource, ProgressEvent, ProgressSink, ResultOutput};
