//! Edge-density measurement and filter.
//!
//! Density is the fraction of pixels Canny marks as edges after a fixed
//! Gaussian pre-smoothing of the grayscale image. The configured kernel is
//! the only smoothing applied.

use std::collections::HashMap;

use image::{imageops, imageops::FilterType, GrayImage};
use imageproc::filter::separable_filter_equal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::canny::canny;
use super::tolerance::Tolerance;
use crate::domain::{CandidateFilter, CandidateSet, FilterContext, FlagImage, Stage};
use crate::error::{Error, Result};

/// Configuration for edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Gaussian kernel size in pixels. Must be odd.
    pub kernel_size: u32,
    /// Gaussian standard deviation.
    pub gaussian_deviation: f32,
    /// Canny low (hysteresis) threshold.
    pub threshold_low: f32,
    /// Canny high threshold.
    pub threshold_high: f32,
    /// Resize measured images to this height first, keeping aspect ratio.
    pub normalize_height: Option<u32>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            kernel_size: 7,
            gaussian_deviation: 2.0,
            threshold_low: 20.0,
            threshold_high: 60.0,
            normalize_height: None,
        }
    }
}

impl EdgeConfig {
    /// Checks kernel, deviation and thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "edge kernel_size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        if !self.gaussian_deviation.is_finite() || self.gaussian_deviation <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "edge gaussian_deviation must be > 0, got {}",
                self.gaussian_deviation
            )));
        }
        let (low, high) = (self.threshold_low, self.threshold_high);
        if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
            return Err(Error::InvalidConfiguration(format!(
                "edge thresholds must satisfy 0 <= low <= high, got {low} and {high}"
            )));
        }
        if self.normalize_height == Some(0) {
            return Err(Error::InvalidConfiguration(
                "normalize_height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Edge measurement of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProfile {
    /// Pixels marked as edges.
    pub edge_pixels: u64,
    /// Pixels measured.
    pub total_pixels: u64,
}

impl EdgeProfile {
    /// Fraction of measured pixels that are edges, 0 for an empty image.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn density(&self) -> f32 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        (self.edge_pixels as f64 / self.total_pixels as f64) as f32
    }
}

/// Gaussian smoothing followed by Canny edge detection.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    config: EdgeConfig,
    kernel: Vec<f32>,
}

impl EdgeDetector {
    /// Creates a detector, precomputing the smoothing kernel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration is invalid.
    pub fn new(config: EdgeConfig) -> Result<Self> {
        config.validate()?;
        let kernel = gaussian_kernel(config.kernel_size, config.gaussian_deviation);
        Ok(Self { config, kernel })
    }

    /// Returns the detector configuration.
    #[must_use]
    pub const fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Binary edge map: 255 on edges, 0 elsewhere.
    #[must_use]
    pub fn edge_map(&self, image: &FlagImage) -> GrayImage {
        let gray = self.grayscale(image);
        if gray.width() == 0 || gray.height() == 0 {
            return gray;
        }
        let smoothed = separable_filter_equal(&gray, self.kernel.as_slice());
        canny(
            &smoothed,
            self.config.threshold_low,
            self.config.threshold_high,
        )
    }

    /// Counts edge pixels of an image.
    #[must_use]
    pub fn profile(&self, image: &FlagImage) -> EdgeProfile {
        let edges = self.edge_map(image);
        let total_pixels = u64::from(edges.width()) * u64::from(edges.height());
        let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count() as u64;
        EdgeProfile {
            edge_pixels,
            total_pixels,
        }
    }

    /// Edge density of an image.
    #[must_use]
    pub fn density(&self, image: &FlagImage) -> f32 {
        self.profile(image).density()
    }

    fn grayscale(&self, image: &FlagImage) -> GrayImage {
        match self.config.normalize_height {
            Some(target) if !image.is_empty() && image.height != target => {
                let width = scaled_width(image.width, image.height, target);
                let resized = imageops::resize(&image.pixels, width, target, FilterType::Triangle);
                imageops::grayscale(&resized)
            }
            _ => image.to_luma8(),
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled_width(width: u32, height: u32, target: u32) -> u32 {
    let scaled = (f64::from(width) * f64::from(target) / f64::from(height)).round();
    // Safe: clamped to at least one pixel and bounded by width·target
    (scaled as u32).max(1)
}

/// Normalized 1-D Gaussian kernel of odd `size`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let center = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (0..size as i32)
        .map(|i| {
            let d = (i - center) as f32;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Removes candidates whose edge density is outside the query's band.
///
/// The query density is computed once. Candidates with no image in `images`
/// cannot be measured and are removed. No-op at one candidate or none.
#[must_use]
pub fn filter_by_edge_density(
    mut candidates: CandidateSet,
    images: &HashMap<String, FlagImage>,
    query: &FlagImage,
    detector: &EdgeDetector,
    tolerance: Tolerance,
) -> CandidateSet {
    if candidates.is_settled() {
        return candidates;
    }

    let query_density = detector.density(query);
    let band = tolerance.band(query_density);
    debug!(
        "Edge filter: query {query_density:.4}, band {:.4}..={:.4}",
        band.min, band.max
    );

    candidates.retain(|id| {
        let Some(image) = images.get(id) else {
            debug!("  {id}: no image, removed");
            return false;
        };
        let density = detector.density(image);
        let keep = band.contains(density);
        debug!("  {id}: density {density:.4} {}", if keep { "kept" } else { "removed" });
        keep
    });
    candidates
}

/// Cascade stage wrapping [`filter_by_edge_density`].
#[derive(Debug, Clone)]
pub struct EdgeDensityFilter {
    detector: EdgeDetector,
    tolerance: Tolerance,
}

impl EdgeDensityFilter {
    /// Creates an edge-density filter.
    #[must_use]
    pub const fn new(detector: EdgeDetector, tolerance: Tolerance) -> Self {
        Self {
            detector,
            tolerance,
        }
    }
}

impl CandidateFilter for EdgeDensityFilter {
    fn name(&self) -> &'static str {
        "edge_density"
    }

    fn stage(&self) -> Stage {
        Stage::Edge
    }

    fn quadrant_stage(&self) -> Stage {
        Stage::QuadrantEdge
    }

    fn apply(&self, candidates: CandidateSet, ctx: &FilterContext<'_>) -> CandidateSet {
        filter_by_edge_density(
            candidates,
            ctx.images,
            ctx.query,
            &self.detector,
            self.tolerance,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn split(id: &str) -> FlagImage {
        FlagImage::from_rgb(
            id,
            RgbImage::from_fn(96, 64, |x, _| if x < 48 { RED } else { WHITE }),
        )
    }

    fn stripes(id: &str) -> FlagImage {
        FlagImage::from_rgb(
            id,
            RgbImage::from_fn(96, 64, |x, _| if (x / 8) % 2 == 0 { RED } else { WHITE }),
        )
    }

    fn detector() -> EdgeDetector {
        EdgeDetector::new(EdgeConfig::default()).unwrap()
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(7, 2.0);
        assert_eq!(kernel.len(), 7);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[6]).abs() < 1e-7);
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn test_solid_image_has_no_edges() {
        let solid = FlagImage::from_rgb("solid", RgbImage::from_pixel(40, 30, RED));
        assert!(detector().density(&solid).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_image_density_is_zero() {
        let empty = FlagImage::from_rgb("empty", RgbImage::new(0, 0));
        let profile = detector().profile(&empty);
        assert_eq!(profile.total_pixels, 0);
        assert!(profile.density().abs() < f32::EPSILON);
    }

    #[test]
    fn test_stripes_denser_than_split() {
        let detector = detector();
        let split_density = detector.density(&split("split"));
        let stripe_density = detector.density(&stripes("stripes"));
        assert!(split_density > 0.0);
        assert!(
            stripe_density > split_density * 3.0,
            "stripes {stripe_density} should be far denser than split {split_density}"
        );
    }

    #[test]
    fn test_configured_smoothing_controls_fine_detail() {
        let black = Rgb([0, 0, 0]);
        let fine = FlagImage::from_rgb(
            "fine",
            RgbImage::from_fn(64, 64, |x, _| if (x / 2) % 2 == 0 { black } else { WHITE }),
        );
        let sharp = EdgeDetector::new(EdgeConfig {
            kernel_size: 1,
            ..EdgeConfig::default()
        })
        .unwrap();
        let smooth = EdgeDetector::new(EdgeConfig {
            kernel_size: 15,
            gaussian_deviation: 4.0,
            ..EdgeConfig::default()
        })
        .unwrap();

        let sharp_density = sharp.density(&fine);
        let smooth_density = smooth.density(&fine);
        assert!(sharp_density > 0.9, "unsmoothed stripes gave {sharp_density}");
        assert!(smooth_density < 0.05, "smoothed stripes gave {smooth_density}");
    }

    #[test]
    fn test_normalize_height_resizes() {
        let detector = EdgeDetector::new(EdgeConfig {
            normalize_height: Some(32),
            ..EdgeConfig::default()
        })
        .unwrap();
        let profile = detector.profile(&split("split"));
        assert_eq!(profile.total_pixels, 48 * 32);
    }

    #[test]
    fn test_filter_keeps_matching_density() {
        let images: HashMap<String, FlagImage> = [split("Split"), stripes("Stripes")]
            .into_iter()
            .map(|f| (f.id.clone(), f))
            .collect();
        let candidates: CandidateSet = ["Split", "Stripes"].into_iter().collect();

        let kept = filter_by_edge_density(
            candidates,
            &images,
            &stripes("query.png"),
            &detector(),
            Tolerance::default(),
        );
        assert_eq!(kept.as_slice(), ["Stripes"]);
    }

    #[test]
    fn test_filter_removes_candidates_without_image() {
        let images: HashMap<String, FlagImage> =
            [(String::from("Split"), split("Split"))].into_iter().collect();
        let candidates: CandidateSet = ["Ghost", "Split"].into_iter().collect();

        let kept = filter_by_edge_density(
            candidates,
            &images,
            &split("query.png"),
            &detector(),
            Tolerance::default(),
        );
        assert_eq!(kept.as_slice(), ["Split"]);
    }

    #[test]
    fn test_filter_single_candidate_untouched() {
        let candidates: CandidateSet = ["Ghost"].into_iter().collect();
        let kept = filter_by_edge_density(
            candidates,
            &HashMap::new(),
            &split("query.png"),
            &detector(),
            Tolerance::Absolute(0.0),
        );
        assert_eq!(kept.as_slice(), ["Ghost"]);
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            EdgeConfig { kernel_size: 4, ..EdgeConfig::default() },
            EdgeConfig { kernel_size: 0, ..EdgeConfig::default() },
            EdgeConfig { gaussian_deviation: 0.0, ..EdgeConfig::default() },
            EdgeConfig { threshold_low: 80.0, ..EdgeConfig::default() },
            EdgeConfig { normalize_height: Some(0), ..EdgeConfig::default() },
        ];
        for config in bad {
            assert!(EdgeDetector::new(config).is_err(), "{config:?} should be rejected");
        }
        assert!(EdgeConfig::default().validate().is_ok());
    }
}
