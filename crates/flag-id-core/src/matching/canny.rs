//! Canny edge detection on an image the caller has already smoothed.
//!
//! [`imageproc::edges::canny`] blurs its input with a fixed σ of 1.4 before
//! taking gradients. The edge stage smooths with its own configured kernel,
//! so this variant starts directly at the Sobel step.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

const EDGE: u8 = 255;

/// Marks edge pixels of `image` with 255, everything else with 0.
///
/// Sobel gradient magnitudes are thinned by non-maximum suppression along
/// the gradient direction, then kept by hysteresis: pixels at or above
/// `high` seed an edge, and 8-connected pixels at or above `low` extend it.
/// Border pixels are never edges.
#[must_use]
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let gx: Vec<f32> = horizontal_sobel(image)
        .pixels()
        .map(|p| f32::from(p[0]))
        .collect();
    let gy: Vec<f32> = vertical_sobel(image)
        .pixels()
        .map(|p| f32::from(p[0]))
        .collect();

    let thinned = suppress_non_maxima(&gx, &gy, width as usize, height as usize);
    let edges = hysteresis(&thinned, width as usize, height as usize, low, high);
    GrayImage::from_raw(width, height, edges).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Gradient magnitude where it peaks across the edge, zero elsewhere.
fn suppress_non_maxima(gx: &[f32], gy: &[f32], width: usize, height: usize) -> Vec<f32> {
    let magnitude: Vec<f32> = gx.iter().zip(gy).map(|(x, y)| x.hypot(*y)).collect();
    let mut thinned = vec![0.0; magnitude.len()];
    if width < 3 || height < 3 {
        return thinned;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = y * width + x;
            let g = magnitude[i];
            if g <= 0.0 {
                continue;
            }

            // Image y grows downward, so a positive gy points to the row below.
            let mut angle = gy[i].atan2(gx[i]).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            let (a, b) = if !(22.5..157.5).contains(&angle) {
                (i - 1, i + 1)
            } else if angle < 67.5 {
                (i - width - 1, i + width + 1)
            } else if angle < 112.5 {
                (i - width, i + width)
            } else {
                (i - width + 1, i + width - 1)
            };

            if g >= magnitude[a] && g >= magnitude[b] {
                thinned[i] = g;
            }
        }
    }
    thinned
}

/// Keeps strong pixels and the weak pixels connected to them.
fn hysteresis(magnitude: &[f32], width: usize, height: usize, low: f32, high: f32) -> Vec<u8> {
    let mut edges = vec![0u8; magnitude.len()];
    let mut stack = Vec::new();

    for (seed, &g) in magnitude.iter().enumerate() {
        if edges[seed] == EDGE || g <= 0.0 || g < high {
            continue;
        }
        edges[seed] = EDGE;
        stack.push(seed);

        while let Some(i) = stack.pop() {
            let (x, y) = (i % width, i / width);
            for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                    let j = ny * width + nx;
                    if edges[j] != EDGE && magnitude[j] > 0.0 && magnitude[j] >= low {
                        edges[j] = EDGE;
                        stack.push(j);
                    }
                }
            }
        }
    }
    edges
}
