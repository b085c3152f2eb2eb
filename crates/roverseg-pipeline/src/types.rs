//! Shared types for the rover segmentation pipeline.

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierKind;
use crate::verdict::RegionVerdict;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the rover segmentation pipeline.
///
/// Constructed once per invocation and passed by reference into every
/// stage; never mutated after construction.
///
/// # Invariants
///
/// `seg_npx` must be at least 1; [`SegConfig::validate`] rejects zero
/// before any work is dispatched. Canny thresholds are clamped inside
/// [`crate::edge::canny`] (minimum [`crate::edge::MIN_THRESHOLD`],
/// `canny_low <= canny_high`) rather than validated, matching the
/// detector's own tolerance for out-of-order thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegConfig {
    /// Gaussian blur sigma applied before edge detection. Higher values
    /// suppress more surface texture and produce fewer edges.
    pub blur_sigma: f32,

    /// Canny low threshold. Gradient magnitudes between `canny_low` and
    /// `canny_high` are edges only when connected to a strong edge.
    pub canny_low: f32,

    /// Canny high threshold. Gradient magnitudes above this value are
    /// definite edges.
    pub canny_high: f32,

    /// Neighborhood radius in pixels: a pixel can only be classified as
    /// rover when an edge pixel lies within this Chebyshev distance.
    pub seg_npx: u32,

    /// Which pixel classification strategy to use.
    pub classifier: ClassifierKind,

    /// Minimum edge-pixel count for an image to be accepted as
    /// containing a rover. Strictly-greater comparison.
    pub rover_npx_thresh: u32,

    /// Whether to emit the four-panel debug composite instead of the
    /// mask-only output. Debug output is written regardless of verdict.
    pub debug: bool,
}

impl SegConfig {
    /// Default Gaussian blur sigma.
    pub const DEFAULT_BLUR_SIGMA: f32 = 7.0;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default neighborhood radius in pixels.
    pub const DEFAULT_SEG_NPX: u32 = 100;
    /// Default minimum edge-pixel count for a rover verdict.
    pub const DEFAULT_ROVER_NPX_THRESH: u32 = 100;

    /// Check the configuration before any image work is dispatched.
    ///
    /// Configuration errors are uniform across a batch, so the caller
    /// should validate once up front rather than per image.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::InvalidConfig`] when `seg_npx` is zero.
    pub fn validate(&self) -> Result<(), SegError> {
        if self.seg_npx == 0 {
            return Err(SegError::InvalidConfig(
                "seg_npx must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SegConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            seg_npx: Self::DEFAULT_SEG_NPX,
            classifier: ClassifierKind::default(),
            rover_npx_thresh: Self::DEFAULT_ROVER_NPX_THRESH,
            debug: false,
        }
    }
}

/// Result of running the segmentation pipeline.
///
/// Contains the rover mask and the accept/reject verdict. Callers that
/// need the intermediate rasters (for the debug composite) should use
/// [`crate::process_staged`] instead.
#[derive(Debug, Clone)]
pub struct SegOutput {
    /// Binary rover mask: 255 where a pixel is classified as rover.
    pub mask: GrayImage,

    /// The accept/reject decision for this image.
    pub verdict: RegionVerdict,

    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved.
///
/// Each field captures the output of one logical pipeline stage, which
/// the debug composite renders side by side.
///
/// Note: does not derive `PartialEq` because `GrayImage` comparisons
/// would walk full pixel buffers.
#[derive(Debug, Clone)]
pub struct StagedOutput {
    /// Stage 1: decoded grayscale image.
    pub grayscale: GrayImage,
    /// Stage 2: sigma map — whole standard deviations from the image
    /// mean, capped at 3. Visualization aid only.
    pub sigma: GrayImage,
    /// Stage 3+4: binary Canny edge map of the blurred image.
    pub edges: GrayImage,
    /// Stage 5: binary rover mask.
    pub mask: GrayImage,
    /// Stage 6: the accept/reject decision.
    pub verdict: RegionVerdict,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur inside the pure pipeline.
///
/// All variants are fatal to the current image's invocation only;
/// `InvalidConfig` is additionally uniform across a batch and should be
/// caught by validating before dispatch.
#[derive(Debug, thiserror::Error)]
pub enum SegError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image is empty or has zero area.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Pipeline configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SegConfig::default();
        assert!((config.blur_sigma - 7.0).abs() < f32::EPSILON);
        assert!((config.canny_low - 50.0).abs() < f32::EPSILON);
        assert!((config.canny_high - 150.0).abs() < f32::EPSILON);
        assert_eq!(config.seg_npx, 100);
        assert_eq!(config.classifier, ClassifierKind::Distance);
        assert_eq!(config.rover_npx_thresh, 100);
        assert!(!config.debug);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SegConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_seg_npx_is_rejected() {
        let config = SegConfig {
            seg_npx: 0,
            ..SegConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SegError::InvalidConfig(_))
        ));
    }

    #[test]
    fn error_invalid_config_display() {
        let err = SegError::InvalidConfig("seg_npx must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: seg_npx must be at least 1",
        );
    }

    #[test]
    fn error_invalid_image_display() {
        let err = SegError::InvalidImage("zero-area image".to_string());
        assert_eq!(err.to_string(), "invalid image: zero-area image");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn config_serde_round_trip() {
        let config = SegConfig {
            blur_sigma: 1.4,
            canny_low: 30.0,
            canny_high: 120.0,
            seg_npx: 5,
            classifier: ClassifierKind::Match,
            rover_npx_thresh: 10,
            debug: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SegConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
