//! Region decision: accept or reject a detected region as a rover.
//!
//! An image with only a handful of edge pixels is background noise,
//! not a rover. The decision is a strict threshold on the edge-pixel
//! count, independent of which classifier strategy produced the mask.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::edge::count_edge_pixels;

/// The accept/reject decision for one image.
///
/// A decision record, not part of the mask itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionVerdict {
    /// Whether the image contains a reportable rover region.
    pub has_rover: bool,
    /// Number of true pixels in the edge map.
    pub edge_pixel_count: u64,
    /// The threshold the count was compared against.
    pub threshold_used: u32,
}

/// Decide whether an edge map indicates a rover is present.
///
/// `has_rover` is true iff the edge-pixel count strictly exceeds
/// `rover_npx_thresh`. Deterministic and side-effect free; raising the
/// threshold can never turn a rejection into an acceptance.
#[must_use]
pub fn decide(edges: &GrayImage, rover_npx_thresh: u32) -> RegionVerdict {
    let edge_pixel_count = count_edge_pixels(edges);
    RegionVerdict {
        has_rover: edge_pixel_count > u64::from(rover_npx_thresh),
        edge_pixel_count,
        threshold_used: rover_npx_thresh,
    }
}
