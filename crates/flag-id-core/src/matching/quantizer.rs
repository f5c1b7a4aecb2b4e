//! Color quantization.
//!
//! Builds a B×B×B color histogram and extracts its dominant bucket.

use crate::domain::{BucketCoord, BucketCount, DominantColorBucket, FlagImage};

/// 3-D histogram of (red, green, blue) bucket counts.
#[derive(Debug, Clone)]
pub struct ColorHistogram {
    buckets: BucketCount,
    cells: Vec<u64>,
    total: u64,
}

impl ColorHistogram {
    /// Computes the histogram of an image, visiting every pixel once.
    #[must_use]
    pub fn from_image(image: &FlagImage, buckets: BucketCount) -> Self {
        let b = usize::from(buckets.get());
        let mut cells = vec![0u64; b * b * b];
        let mut total = 0u64;

        for pixel in image.pixels.pixels() {
            let [r, g, bl] = pixel.0;
            let coord = BucketCoord::new(
                buckets.bucket_of(r),
                buckets.bucket_of(g),
                buckets.bucket_of(bl),
            );
            cells[cell_index(b, coord)] += 1;
            total += 1;
        }

        Self {
            buckets,
            cells,
            total,
        }
    }

    /// Buckets per channel.
    #[must_use]
    pub const fn buckets(&self) -> BucketCount {
        self.buckets
    }

    /// Number of pixels counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Count at a bucket coordinate.
    ///
    /// Coordinates outside the histogram count as zero.
    #[must_use]
    pub fn get(&self, coord: BucketCoord) -> u64 {
        let max = self.buckets.max_index();
        if coord.red > max || coord.green > max || coord.blue > max {
            return 0;
        }
        self.cells[cell_index(usize::from(self.buckets.get()), coord)]
    }

    /// Iterates all cell counts.
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.cells.iter().copied()
    }

    /// Finds the most populated bucket.
    ///
    /// Cells are scanned red outer, blue middle, green inner. Only a strictly
    /// greater count replaces the current best, so ties keep the first cell
    /// in that order. The returned ratio is unset.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn dominant_bucket(&self) -> DominantColorBucket {
        let b = usize::from(self.buckets.get());
        let mut best = DominantColorBucket::unset();

        for red in 0..b {
            for blue in 0..b {
                for green in 0..b {
                    // Safe: indices are below B <= 256
                    let coord = BucketCoord::new(red as u8, green as u8, blue as u8);
                    let count = self.cells[cell_index(b, coord)];
                    if best.count.map_or(true, |c| count > c) {
                        best.coord = coord;
                        best.count = Some(count);
                    }
                }
            }
        }

        best
    }
}

/// Dominant bucket of an image with its ratio set.
#[must_use]
pub fn dominant_color(image: &FlagImage, buckets: BucketCount) -> DominantColorBucket {
    ColorHistogram::from_image(image, buckets)
        .dominant_bucket()
        .with_ratio(image.pixel_count())
}

fn cell_index(b: usize, coord: BucketCoord) -> usize {
    (usize::from(coord.red) * b + usize::from(coord.green)) * b + usize::from(coord.blue)
}
