//! Single-image pipeline invocation: read, segment, write or suppress.
//!
//! One invocation owns its image, edge map, and mask exclusively; the
//! only side effect is at most one file written to the output path.
//!
//! Terminal states:
//! - `debug = true`: the four-panel composite is written regardless of
//!   verdict — debug mode is for inspection, not accuracy filtering.
//! - `debug = false`: the mask is written iff the verdict accepts the
//!   region; a negative verdict suppresses output without error.

use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use roverseg_pipeline::{RegionVerdict, SegConfig, SegError, panel, process_staged};

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineResult {
    /// Whether an output file was written. `false` means the negative
    /// verdict suppressed output — a documented non-error.
    pub written: bool,
    /// The accept/reject decision for this image.
    pub verdict: RegionVerdict,
}

/// Errors for one image's invocation. None of these abort sibling
/// invocations in a batch run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Upstream pipeline failure (decode, invalid image, invalid
    /// configuration).
    #[error(transparent)]
    Pipeline(#[from] SegError),

    /// The input image could not be read.
    #[error("failed to read image {path}: {source}")]
    Read {
        /// The offending input path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output file or its parent directory could not be written.
    #[error("failed to write output {path}: {source}")]
    OutputWrite {
        /// The offending output path.
        path: PathBuf,
        /// The underlying write or encode error.
        source: image::ImageError,
    },
}

/// Run the segmentation pipeline on one image file.
///
/// Writes either the mask or the debug composite to `output_path`
/// (creating parent directories as needed), or nothing when a negative
/// verdict suppresses output. The output format is chosen from the
/// path's extension; the batch harness mirrors inputs to `.png`.
///
/// # Errors
///
/// Returns [`RunError::Read`] if the input file is unreadable,
/// [`RunError::Pipeline`] for decode/validation failures, and
/// [`RunError::OutputWrite`] if the output cannot be written.
pub fn run(
    image_path: &Path,
    output_path: &Path,
    config: &SegConfig,
) -> Result<PipelineResult, RunError> {
    let bytes = fs::read(image_path).map_err(|source| RunError::Read {
        path: image_path.to_path_buf(),
        source,
    })?;

    let staged = process_staged(&bytes, config)?;
    let verdict = staged.verdict;

    let output = if config.debug {
        Some(panel::compose(&staged))
    } else if verdict.has_rover {
        Some(staged.mask)
    } else {
        None
    };

    match output {
        Some(img) => {
            write_image(&img, output_path)?;
            Ok(PipelineResult {
                written: true,
                verdict,
            })
        }
        None => Ok(PipelineResult {
            written: false,
            verdict,
        }),
    }
}

/// Write an image, creating the output path's parent directory first.
fn write_image(img: &GrayImage, path: &Path) -> Result<(), RunError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| RunError::OutputWrite {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?;
    }

    img.save(path).map_err(|source| RunError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
