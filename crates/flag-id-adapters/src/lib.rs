//! Flag ID Adapters - External adapters for flag-id.
//!
//! This crate provides adapters for:
//! - Filesystem query image source
//! - Filesystem reference corpus

pub mod corpus;
pub mod fs;

pub use corpus::FsCorpusSource;
pub use fs::FsImageSource;
