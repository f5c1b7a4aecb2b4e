//! Synthetic flag builders for testing.

use std::path::{Path, PathBuf};

use anyhow::Context;
use flag_id_core::FlagImage;
use image::{Rgb, RgbImage};

/// Common flag colors.
pub mod colors {
    use image::Rgb;

    /// Pure red.
    pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
    /// Pure green.
    pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
    /// Pure blue.
    pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    /// White.
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    /// Black.
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    /// Yellow.
    pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
}

/// Builder for creating synthetic flag images.
///
/// Each method produces a flag with known dominant color, ratio and edge
/// layout so cascade stages can be exercised deterministically.
pub struct SyntheticFlagBuilder;

impl SyntheticFlagBuilder {
    // === Plain fields ===

    /// Creates a single-color flag (no edges, ratio 1).
    #[must_use]
    pub fn solid(id: &str, width: u32, height: u32, color: Rgb<u8>) -> FlagImage {
        FlagImage::from_rgb(id, RgbImage::from_pixel(width, height, color))
    }

    /// Creates a flag split into a left and a right half.
    #[must_use]
    pub fn split(id: &str, width: u32, height: u32, left: Rgb<u8>, right: Rgb<u8>) -> FlagImage {
        let mid = width / 2;
        let img = RgbImage::from_fn(width, height, |x, _| if x < mid { left } else { right });
        FlagImage::from_rgb(id, img)
    }

    // === Patterned fields ===

    /// Creates alternating vertical stripes, starting with `first`.
    #[must_use]
    pub fn vertical_stripes(
        id: &str,
        width: u32,
        height: u32,
        stripe_width: u32,
        first: Rgb<u8>,
        second: Rgb<u8>,
    ) -> FlagImage {
        let stripe = stripe_width.max(1);
        let img = RgbImage::from_fn(width, height, |x, _| {
            if (x / stripe) % 2 == 0 {
                first
            } else {
                second
            }
        });
        FlagImage::from_rgb(id, img)
    }

    /// Creates alternating horizontal stripes, starting with `first`.
    #[must_use]
    pub fn horizontal_stripes(
        id: &str,
        width: u32,
        height: u32,
        stripe_height: u32,
        first: Rgb<u8>,
        second: Rgb<u8>,
    ) -> FlagImage {
        let stripe = stripe_height.max(1);
        let img = RgbImage::from_fn(width, height, |_, y| {
            if (y / stripe) % 2 == 0 {
                first
            } else {
                second
            }
        });
        FlagImage::from_rgb(id, img)
    }

    /// Creates a checkerboard with square cells, `first` in the corner.
    #[must_use]
    pub fn checkerboard(
        id: &str,
        width: u32,
        height: u32,
        cell_size: u32,
        first: Rgb<u8>,
        second: Rgb<u8>,
    ) -> FlagImage {
        let cell = cell_size.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                first
            } else {
                second
            }
        });
        FlagImage::from_rgb(id, img)
    }

    /// Creates a field with a differently colored upper-left canton.
    ///
    /// The canton covers exactly the upper-left quadrant.
    #[must_use]
    pub fn canton(
        id: &str,
        width: u32,
        height: u32,
        field: Rgb<u8>,
        canton: Rgb<u8>,
    ) -> FlagImage {
        let (cw, ch) = (width / 2, height / 2);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if x < cw && y < ch {
                canton
            } else {
                field
            }
        });
        FlagImage::from_rgb(id, img)
    }

    /// Renames a flag, e.g. to turn a reference into a query.
    #[must_use]
    pub fn renamed(flag: &FlagImage, id: &str) -> FlagImage {
        FlagImage::from_rgb(id, flag.pixels.clone())
    }
}

/// Writes a flag as `<dir>/<id>.png` and returns the path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_png(flag: &FlagImage, dir: &Path) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}.png", flag.id));
    flag.pixels
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
