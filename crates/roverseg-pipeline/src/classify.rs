//! Pixel classification: turn an edge map into a rover/background mask.
//!
//! This module defines the [`PixelClassifier`] trait for pluggable
//! classification strategies and the [`ClassifierKind`] enum for
//! selecting which strategy to use at runtime.
//!
//! # Strategy pattern
//!
//! The two strategies are deliberate cost/fidelity trade-offs over the
//! same contract and are not guaranteed to produce identical masks:
//!
//! - [`Distance`](ClassifierKind::Distance) marks every pixel within
//!   Chebyshev distance `seg_npx` of an edge pixel. This is a
//!   morphological dilation of the edge map and runs in well under a
//!   second at typical resolutions.
//! - [`Match`](ClassifierKind::Match) additionally requires the pixel's
//!   intensity to fall inside the intensity range of the edge pixels in
//!   its neighborhood. This is the fidelity reference and costs a
//!   neighborhood scan per pixel.
//!
//! For equal `seg_npx`, the Match mask is always a subset of the
//! Distance mask: the intensity filter can only remove candidates.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

/// Selects which pixel classification strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// Geometric proximity only: dilate the edge map by `seg_npx`.
    #[default]
    Distance,
    /// Proximity plus per-neighborhood intensity matching. Slower.
    Match,
}

/// Trait for pixel classification strategies.
///
/// Input: the grayscale image, its binary edge map, and the
/// neighborhood radius. Output: a binary mask of the same dimensions,
/// 255 where a pixel is classified as rover.
pub trait PixelClassifier {
    /// Classify every pixel as rover (255) or background (0).
    fn classify(&self, image: &GrayImage, edges: &GrayImage, seg_npx: u32) -> GrayImage;
}

impl PixelClassifier for ClassifierKind {
    fn classify(&self, image: &GrayImage, edges: &GrayImage, seg_npx: u32) -> GrayImage {
        match *self {
            Self::Distance => distance_mask(edges, seg_npx),
            Self::Match => match_mask(image, edges, seg_npx),
        }
    }
}

/// Largest radius a single dilation pass may use. `imageproc`'s kernel
/// radius is a `u8` over a distance field that saturates at 255, so
/// only radii up to 254 compare against exact distances.
const DILATE_CHUNK: u8 = u8::MAX - 1;

/// Distance mode: mark every pixel within Chebyshev distance `seg_npx`
/// of an edge pixel.
///
/// Implemented as a morphological dilation with the L-infinity norm,
/// which is exactly the "square neighborhood of radius `seg_npx`"
/// predicate the Match strategy uses for its candidate set. Dilation is
/// inflationary: the output always contains the edge map itself.
///
/// L-infinity dilation composes (dilating by `a` then `b` covers
/// distance `a + b`), so arbitrary radii are applied in exact chunks of
/// at most [`DILATE_CHUNK`].
fn distance_mask(edges: &GrayImage, seg_npx: u32) -> GrayImage {
    let mut mask = edges.clone();
    let mut remaining = seg_npx;
    while remaining > 0 {
        let step = u8::try_from(remaining)
            .unwrap_or(DILATE_CHUNK)
            .min(DILATE_CHUNK);
        mask = imageproc::morphology::dilate(&mask, Norm::LInf, step);
        remaining -= u32::from(step);
    }
    mask
}

/// Match mode: mark a pixel as rover only when its neighborhood
/// contains an edge pixel AND its own intensity falls within the
/// [min, max] intensity range of the edge pixels in that neighborhood.
///
/// The neighborhood is the `(2*seg_npx + 1)` square window centered on
/// the pixel, so the candidate set matches [`distance_mask`] exactly
/// and the intensity test only ever removes pixels from it.
fn match_mask(image: &GrayImage, edges: &GrayImage, seg_npx: u32) -> GrayImage {
    let (width, height) = edges.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(seg_npx);
        let y0 = y.saturating_sub(seg_npx);
        let x1 = x.saturating_add(seg_npx).min(width - 1);
        let y1 = y.saturating_add(seg_npx).min(height - 1);

        let mut lo = u8::MAX;
        let mut hi = u8::MIN;
        let mut found = false;
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                if edges.get_pixel(nx, ny).0[0] > 0 {
                    let v = image.get_pixel(nx, ny).0[0];
                    lo = lo.min(v);
                    hi = hi.max(v);
                    found = true;
                }
            }
        }

        let v = image.get_pixel(x, y).0[0];
        if found && lo <= v && v <= hi {
            image::Luma([255])
        } else {
            image::Luma([0])
        }
    })
}
