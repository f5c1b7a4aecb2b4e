//! Test support utilities for flag-id.
//!
//! Provides mocks, synthetic flag builders, and utilities for testing
//! the flag identification pipeline.
//!
//! # Example
//!
//! ```
//! use flag_id_test_support::{colors, MockCorpusSource, SyntheticFlagBuilder};
//!
//! // Create synthetic reference flags
//! let red = SyntheticFlagBuilder::solid("Red", 64, 64, colors::RED);
//! let striped = SyntheticFlagBuilder::vertical_stripes("Striped", 96, 64, 8, colors::RED, colors::WHITE);
//!
//! // Create mock corpus source
//! let corpus = MockCorpusSource::new(vec![red, striped]);
//! ```

mod builders;
mod mocks;

pub use builders::{colors, save_png, SyntheticFlagBuilder};
pub use mocks::{MockCorpusSource, MockImageSource, MockProgressSink, MockResultOutput};
