//! Color bucket types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of buckets per color channel.
///
/// Always a power of two in `1..=256`, so every bucket covers the same
/// number of channel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketCount(u16);

impl BucketCount {
    /// Validates a per-channel bucket count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless `count` is a power of two in `1..=256`.
    pub fn new(count: u16) -> Result<Self> {
        if count == 0 || count > 256 || !count.is_power_of_two() {
            return Err(Error::InvalidConfiguration(format!(
                "buckets_per_dimension must be a power of two in 1..=256, got {count}"
            )));
        }
        Ok(Self(count))
    }

    /// Buckets per channel (B).
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Channel values covered by one bucket (256 / B).
    #[must_use]
    pub const fn width(self) -> u16 {
        256 / self.0
    }

    /// Highest valid bucket index (B - 1).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_index(self) -> u8 {
        // Safe: B <= 256, so B - 1 fits in u8
        (self.0 - 1) as u8
    }

    /// Bucket a channel value falls into.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn bucket_of(self, channel: u8) -> u8 {
        // Safe: channel / width < B <= 256
        (channel as u16 / self.width()) as u8
    }
}

impl Default for BucketCount {
    fn default() -> Self {
        Self(8)
    }
}

/// A coordinate in (red, green, blue) bucket space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BucketCoord {
    /// Red bucket index.
    pub red: u8,
    /// Green bucket index.
    pub green: u8,
    /// Blue bucket index.
    pub blue: u8,
}

impl BucketCoord {
    /// Creates a coordinate from red, green and blue bucket indices.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Chebyshev distance (largest per-channel difference) to another coordinate.
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u8 {
        let r = self.red.abs_diff(other.red);
        let g = self.green.abs_diff(other.green);
        let b = self.blue.abs_diff(other.blue);
        let rg = if r > g { r } else { g };
        if rg > b {
            rg
        } else {
            b
        }
    }

    /// Color at the center of this bucket.
    #[must_use]
    pub fn center_rgb(self, buckets: BucketCount) -> [u8; 3] {
        let width = buckets.width();
        let center = |bucket: u8| {
            let value = u16::from(bucket) * width + width / 2;
            u8::try_from(value).unwrap_or(u8::MAX)
        };
        [center(self.red), center(self.green), center(self.blue)]
    }
}

/// The most populated histogram bucket of an image.
///
/// `count` stays `None` until a histogram scan finds a bucket; `ratio`
/// stays `None` until the caller sets it with [`with_ratio`](Self::with_ratio).
/// An unset ratio is never compared by the ratio filter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DominantColorBucket {
    /// Bucket coordinate.
    pub coord: BucketCoord,
    /// Pixels in the bucket.
    pub count: Option<u64>,
    /// `count / total pixels`, in `0.0..=1.0`.
    pub ratio: Option<f32>,
}

impl DominantColorBucket {
    /// A bucket with nothing found yet.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            coord: BucketCoord::new(0, 0, 0),
            count: None,
            ratio: None,
        }
    }

    /// Sets the ratio from the source image's pixel count.
    ///
    /// Left unset when the image has no pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_ratio(mut self, pixel_count: u64) -> Self {
        if pixel_count > 0 {
            let count = self.count.unwrap_or(0);
            self.ratio = Some((count as f64 / pixel_count as f64) as f32);
        }
        self
    }

    /// Hex string (`#rrggbb`) of the bucket's center color.
    #[must_use]
    pub fn hex(&self, buckets: BucketCount) -> String {
        let [r, g, b] = self.coord.center_rgb(buckets);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}
