//! Matching stages and the cascade that runs them.

mod canny;
mod cascade;
mod edge;
mod index;
mod quantizer;
mod ratio;
mod retriever;
mod tolerance;

pub use canny::canny;
pub use cascade::{CascadeState, MatchConfig, MatchEngine};
pub use edge::{
    filter_by_edge_density, gaussian_kernel, EdgeConfig, EdgeDensityFilter, EdgeDetector,
    EdgeProfile,
};
pub use index::{BucketMap, FlagIndex};
pub use quantizer::{dominant_color, ColorHistogram};
pub use ratio::{filter_by_ratio, RatioFilter};
pub use retriever::{retrieve, RetrievalPolicy};
pub use tolerance::{AcceptanceBand, Tolerance};
