//! Dominant-color index over reference flags.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::quantizer::dominant_color;
use crate::domain::{BucketCoord, BucketCount, DominantColorBucket, FlagImage};

/// Dominant bucket of every indexed flag, keyed by flag identifier.
pub type BucketMap = HashMap<String, DominantColorBucket>;

/// Maps a dominant bucket coordinate to the flags whose dominant color falls in it.
///
/// Every indexed flag appears in exactly one bucket, in insertion order.
#[derive(Debug, Clone)]
pub struct FlagIndex {
    buckets: BucketCount,
    leaves: HashMap<BucketCoord, Vec<String>>,
    flag_count: usize,
}

impl FlagIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(buckets: BucketCount) -> Self {
        Self {
            buckets,
            leaves: HashMap::new(),
            flag_count: 0,
        }
    }

    /// Indexes flags by their dominant bucket.
    ///
    /// Returns the index together with each flag's dominant bucket (ratio set).
    /// A flag identifier seen a second time is skipped.
    pub fn build<'a, I>(flags: I, buckets: BucketCount) -> (Self, BucketMap)
    where
        I: IntoIterator<Item = &'a FlagImage>,
    {
        let mut index = Self::new(buckets);
        let mut bucket_map = BucketMap::new();

        for flag in flags {
            if bucket_map.contains_key(&flag.id) {
                warn!("Flag {} indexed twice, keeping the first", flag.id);
                continue;
            }
            let dominant = dominant_color(flag, buckets);
            index.insert(dominant.coord, flag.id.clone());
            bucket_map.insert(flag.id.clone(), dominant);
        }

        debug!(
            "Indexed {} flags into {} buckets",
            index.len(),
            index.bucket_count()
        );
        (index, bucket_map)
    }

    fn insert(&mut self, coord: BucketCoord, id: String) {
        self.leaves.entry(coord).or_default().push(id);
        self.flag_count += 1;
    }

    /// Flags stored at a coordinate, or `None` if the bucket is empty.
    #[must_use]
    pub fn lookup(&self, coord: BucketCoord) -> Option<&[String]> {
        self.leaves.get(&coord).map(Vec::as_slice)
    }

    /// Buckets per channel this index was built with.
    #[must_use]
    pub const fn buckets(&self) -> BucketCount {
        self.buckets
    }

    /// Number of indexed flags.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.flag_count
    }

    /// Returns true if no flags are indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.flag_count == 0
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.leaves.len()
    }

    /// Non-empty buckets sorted by coordinate.
    #[must_use]
    pub fn entries(&self) -> Vec<(BucketCoord, &[String])> {
        let mut entries: Vec<_> = self
            .leaves
            .iter()
            .map(|(coord, ids)| (*coord, ids.as_slice()))
            .collect();
        entries.sort_by_key(|(coord, _)| *coord);
        entries
    }
}
