//! Debug visualization: four-panel composite of pipeline stages.
//!
//! Lays the intermediate rasters out side by side in one image:
//! original | sigma map | edge map | mask. Debug output is written for
//! every image regardless of verdict, so suppressed negatives can be
//! inspected too.

use image::GrayImage;

use crate::sigma::MAX_BIN;
use crate::types::StagedOutput;

/// Multiplier that spreads sigma bins 0..=3 across the 8-bit range so
/// the panel is legible.
const SIGMA_SCALE: u8 = u8::MAX / MAX_BIN;

/// Assemble the four-panel debug composite.
///
/// All four stage rasters share the source image's dimensions (a
/// pipeline invariant), so the composite is four times the source
/// width. The sigma map's bin indices are scaled up for visibility;
/// the other panels are rendered as-is.
#[must_use = "returns the composite image"]
pub fn compose(staged: &StagedOutput) -> GrayImage {
    let (width, height) = staged.grayscale.dimensions();
    let panels = [&staged.grayscale, &staged.sigma, &staged.edges, &staged.mask];

    let mut composite = GrayImage::new(width * 4, height);
    let mut x_offset = 0;
    for (i, panel) in panels.iter().enumerate() {
        for (x, y, p) in panel.enumerate_pixels() {
            let value = if i == 1 {
                p.0[0].saturating_mul(SIGMA_SCALE)
            } else {
                p.0[0]
            };
            composite.put_pixel(x_offset + x, y, image::Luma([value]));
        }
        x_offset += width;
    }
    composite
}
