//! roverseg-pipeline: Pure rover segmentation pipeline (sans-IO).
//!
//! Classifies pixels of planetary-surface photographs as rover or
//! background through: grayscale -> Gaussian blur -> Canny edge
//! detection -> pixel classification -> region decision.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. All filesystem interaction
//! (reading images, writing masks, the batch harness) lives in
//! `roverseg-cli`.

pub mod blur;
pub mod classify;
pub mod edge;
pub mod grayscale;
pub mod panel;
pub mod sigma;
pub mod types;
pub mod verdict;

pub use classify::{ClassifierKind, PixelClassifier};
pub use types::{Dimensions, GrayImage, SegConfig, SegError, SegOutput, StagedOutput};
pub use verdict::RegionVerdict;

/// Run the segmentation pipeline.
///
/// Takes raw image bytes (JPEG, PNG) and a configuration, and produces
/// a [`SegOutput`] containing the binary rover mask and the
/// accept/reject [`RegionVerdict`]. Deterministic: the same bytes and
/// configuration always produce a bit-identical mask.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to grayscale
/// 2. Gaussian blur (noise reduction)
/// 3. Canny edge detection
/// 4. Pixel classification (pluggable strategy)
/// 5. Region decision (edge-pixel count vs. threshold)
///
/// # Errors
///
/// Returns [`SegError::InvalidConfig`] if the configuration is out of
/// range (`seg_npx == 0`).
/// Returns [`SegError::InvalidImage`] if `image_bytes` is empty or the
/// image has zero area.
/// Returns [`SegError::ImageDecode`] if the image format is
/// unrecognized.
pub fn process(image_bytes: &[u8], config: &SegConfig) -> Result<SegOutput, SegError> {
    config.validate()?;

    // 1. Decode and convert to grayscale.
    let gray = grayscale::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    // 2. Gaussian blur.
    let blurred = blur::gaussian_blur(&gray, config.blur_sigma);

    // 3. Canny edge detection.
    let edges = edge::canny(&blurred, config.canny_low, config.canny_high);

    // 4. Pixel classification. Match mode compares against the
    //    original (unblurred) intensities.
    let mask = config.classifier.classify(&gray, &edges, config.seg_npx);

    // 5. Region decision: the edge map is the gating statistic.
    let verdict = verdict::decide(&edges, config.rover_npx_thresh);

    Ok(SegOutput {
        mask,
        verdict,
        dimensions,
    })
}

/// Run the pipeline, preserving every intermediate stage output.
///
/// Identical semantics to [`process`], but additionally computes the
/// sigma map and retains the grayscale and edge rasters so the caller
/// can assemble the four-panel debug composite via [`panel::compose`].
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &SegConfig,
) -> Result<StagedOutput, SegError> {
    config.validate()?;

    let gray = grayscale::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    let sigma = sigma::sigma_map(&gray);
    let blurred = blur::gaussian_blur(&gray, config.blur_sigma);
    let edges = edge::canny(&blurred, config.canny_low, config.canny_high);
    let mask = config.classifier.classify(&gray, &edges, config.seg_npx);
    let verdict = verdict::decide(&edges, config.rover_npx_thresh);

    Ok(StagedOutput {
        grayscale: gray,
        sigma,
        edges,
        mask,
        verdict,
        dimensions,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode a grayscale image as PNG bytes.
    fn encode_png(img: &GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    /// 100x100 all-black image with a 20x20 white square at its center.
    fn square_png() -> Vec<u8> {
        let img = GrayImage::from_fn(100, 100, |x, y| {
            if (40..60).contains(&x) && (40..60).contains(&y) {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        });
        encode_png(&img)
    }

    fn square_config() -> SegConfig {
        SegConfig {
            blur_sigma: 1.4,
            seg_npx: 5,
            rover_npx_thresh: 10,
            ..SegConfig::default()
        }
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &SegConfig::default());
        assert!(matches!(result, Err(SegError::InvalidImage(_))));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &SegConfig::default());
        assert!(matches!(result, Err(SegError::ImageDecode(_))));
    }

    #[test]
    fn process_rejects_invalid_config_before_decoding() {
        let config = SegConfig {
            seg_npx: 0,
            ..SegConfig::default()
        };
        // Even valid image bytes fail: configuration is checked first.
        let result = process(&square_png(), &config);
        assert!(matches!(result, Err(SegError::InvalidConfig(_))));
    }

    #[test]
    fn mask_and_edges_share_source_dimensions() {
        let staged = process_staged(&square_png(), &square_config()).unwrap();
        let expected = Dimensions {
            width: 100,
            height: 100,
        };
        assert_eq!(staged.dimensions, expected);
        assert_eq!(staged.edges.dimensions(), (100, 100));
        assert_eq!(staged.mask.dimensions(), (100, 100));
        assert_eq!(staged.sigma.dimensions(), (100, 100));
    }

    #[test]
    fn white_square_produces_band_around_boundary() {
        let output = process(&square_png(), &square_config()).unwrap();
        assert!(output.verdict.has_rover);
        // An 80-pixel perimeter comfortably exceeds the threshold of 10.
        assert!(output.verdict.edge_pixel_count > 10);

        // Mask is a band of width ~seg_npx around the square boundary:
        // near the left boundary edge (x=40) is in, the image corner
        // and the square center are out.
        assert!(output.mask.get_pixel(36, 50).0[0] > 0);
        assert_eq!(output.mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(output.mask.get_pixel(50, 50).0[0], 0);
    }

    #[test]
    fn uniform_image_is_rejected() {
        let png = encode_png(&GrayImage::from_pixel(64, 64, image::Luma([30])));
        let output = process(&png, &square_config()).unwrap();
        assert!(!output.verdict.has_rover);
        assert_eq!(output.verdict.edge_pixel_count, 0);
        assert!(output.mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn huge_threshold_rejects_square() {
        let config = SegConfig {
            rover_npx_thresh: 10_000,
            ..square_config()
        };
        let output = process(&square_png(), &config).unwrap();
        assert!(!output.verdict.has_rover);
    }

    #[test]
    fn count_equal_to_threshold_is_rejected() {
        // Strict `>` comparison: measure the count, then set the
        // threshold to exactly that count.
        let counted = process(&square_png(), &square_config()).unwrap();
        let exact = u32::try_from(counted.verdict.edge_pixel_count).unwrap();

        let config = SegConfig {
            rover_npx_thresh: exact,
            ..square_config()
        };
        let output = process(&square_png(), &config).unwrap();
        assert!(!output.verdict.has_rover);
        assert_eq!(output.verdict.edge_pixel_count, counted.verdict.edge_pixel_count);
    }

    #[test]
    fn reruns_are_bit_identical() {
        let config = square_config();
        let first = process(&square_png(), &config).unwrap();
        let second = process(&square_png(), &config).unwrap();
        assert_eq!(first.mask.as_raw(), second.mask.as_raw());
        assert_eq!(first.verdict, second.verdict);
    }

    #[test]
    fn match_mode_mask_is_subset_of_distance_mode() {
        let distance = process(&square_png(), &square_config()).unwrap();
        let match_config = SegConfig {
            classifier: ClassifierKind::Match,
            ..square_config()
        };
        let matched = process(&square_png(), &match_config).unwrap();

        for (x, y, p) in matched.mask.enumerate_pixels() {
            if p.0[0] > 0 {
                assert!(
                    distance.mask.get_pixel(x, y).0[0] > 0,
                    "match-mode pixel ({x},{y}) missing from distance mode",
                );
            }
        }
    }

    #[test]
    fn staged_and_plain_process_agree() {
        let config = square_config();
        let staged = process_staged(&square_png(), &config).unwrap();
        let plain = process(&square_png(), &config).unwrap();
        assert_eq!(staged.mask.as_raw(), plain.mask.as_raw());
        assert_eq!(staged.verdict, plain.verdict);
    }
}
