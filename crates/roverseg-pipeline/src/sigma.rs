//! Intensity-variability (sigma) map.
//!
//! For each pixel, counts how many whole standard deviations its
//! intensity sits from the image mean, capped at 3. Rover hardware
//! tends to be far brighter or darker than the surrounding terrain, so
//! the map highlights candidate regions at a glance. It is a
//! visualization aid for the debug composite; the classifier itself
//! works from the raw intensities.

use image::GrayImage;

/// Highest sigma bin. Deviations of three standard deviations or more
/// all land in this bin.
pub const MAX_BIN: u8 = 3;

/// Compute the sigma map of a grayscale image.
///
/// Returns an image of bin indices 0..=[`MAX_BIN`]: 0 for pixels within
/// one standard deviation of the mean, 1 for within two, and so on.
/// A uniform image (zero standard deviation) maps everything to bin 0.
#[must_use = "returns the sigma map"]
#[allow(clippy::cast_precision_loss)]
pub fn sigma_map(image: &GrayImage) -> GrayImage {
    let n = u64::from(image.width()) * u64::from(image.height());
    if n == 0 {
        return image.clone();
    }

    let sum: f64 = image.pixels().map(|p| f64::from(p.0[0])).sum();
    let mean = sum / n as f64;
    let variance: f64 = image
        .pixels()
        .map(|p| {
            let dev = f64::from(p.0[0]) - mean;
            dev * dev
        })
        .sum::<f64>()
        / n as f64;
    let std = variance.sqrt();

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let dev = (f64::from(image.get_pixel(x, y).0[0]) - mean).abs();
        let bin = if std <= f64::EPSILON {
            0
        } else if dev < std {
            0
        } else if dev < 2.0 * std {
            1
        } else if dev < 3.0 * std {
            2
        } else {
            MAX_BIN
        };
        image::Luma([bin])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_is_all_bin_zero() {
        let img = GrayImage::from_pixel(10, 10, image::Luma([77]));
        let sigma = sigma_map(&img);
        assert!(sigma.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = GrayImage::new(17, 31);
        let sigma = sigma_map(&img);
        assert_eq!(sigma.width(), 17);
        assert_eq!(sigma.height(), 31);
    }

    #[test]
    fn bins_never_exceed_max() {
        // Extreme bimodal image: a single bright pixel on black.
        let mut img = GrayImage::new(50, 50);
        img.put_pixel(25, 25, image::Luma([255]));
        let sigma = sigma_map(&img);
        assert!(sigma.pixels().all(|p| p.0[0] <= MAX_BIN));
    }

    #[test]
    fn outlier_lands_in_top_bin() {
        // 2500 black pixels and one at 255: the outlier is far beyond
        // three standard deviations from the mean.
        let mut img = GrayImage::new(50, 50);
        img.put_pixel(25, 25, image::Luma([255]));
        let sigma = sigma_map(&img);
        assert_eq!(sigma.get_pixel(25, 25).0[0], MAX_BIN);
        assert_eq!(sigma.get_pixel(0, 0).0[0], 0);
    }
}
