//! Batch evaluation over labeled `pos`/`neg` directory trees.
//!
//! Ground truth is carried by directory convention: an image under
//! `image_root/pos` is assumed to contain a rover, one under
//! `image_root/neg` is assumed not to. The convention is a documented
//! contract — exactly these two category names, nothing inferred.
//!
//! Each image gets one independent pipeline invocation with no shared
//! mutable state; rayon provides the parallel fan-out. Aggregation is a
//! post-hoc filesystem scan that runs only after the parallel iterator
//! has returned, which makes it the synchronization barrier: under the
//! `debug = false` convention an output file exists iff the verdict was
//! positive, so file counts are the detection signal. A suppressed
//! verdict also removes any output left at the mirrored path by an
//! earlier run, so reruns into the same output root stay consistent
//! with the current configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use roverseg_pipeline::SegConfig;
use tracing::{debug, warn};

use crate::run::{self, RunError};

/// Directory name carrying rover-present ground truth.
pub const POS_DIR: &str = "pos";
/// Directory name carrying rover-absent ground truth.
pub const NEG_DIR: &str = "neg";

/// File extensions recognized as input images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Aggregate counts from one batch run. Recomputed per run, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Output files found under `output_root/pos`.
    pub true_positives: u64,
    /// Output files found under `output_root/neg` — negative examples
    /// that incorrectly produced output.
    pub false_positives: u64,
    /// Ground-truth images under `image_root/pos`.
    pub positives_total: u64,
    /// Ground-truth images under `image_root/neg`.
    pub negatives_total: u64,
}

impl BatchReport {
    /// Percentage of examples classified correctly.
    ///
    /// `100 * (tp + (neg_gt - fp)) / (pos_gt + neg_gt)`; zero when the
    /// ground-truth set is empty. Meaningful only under the
    /// `debug = false` suppression convention.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        let total = self.positives_total + self.negatives_total;
        if total == 0 {
            return 0.0;
        }
        let true_negatives = self.negatives_total.saturating_sub(self.false_positives);
        let correct = self.true_positives + true_negatives;
        100.0 * correct as f64 / total as f64
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "npos: {}/{}", self.true_positives, self.positives_total)?;
        writeln!(
            f,
            "nneg: {}/{}",
            self.false_positives, self.negatives_total
        )?;
        write!(f, "accuracy: {:.2}%", self.accuracy())
    }
}

/// Run the pipeline over every image under `image_root` and score the
/// results against the `pos`/`neg` directory convention.
///
/// Per-image failures are logged with the offending path and excluded
/// from the counts; they never abort the batch. Output paths mirror
/// each image's relative path under `output_root` with a `.png`
/// extension, so distinct images never contend for the same file. On a
/// rerun, each image's mirrored output is rewritten or removed to match
/// its current verdict; other leftovers in `output_root` are warned
/// about but still counted.
///
/// # Errors
///
/// Returns [`RunError::Pipeline`] if the configuration is invalid
/// (checked once, before any work is dispatched) and [`RunError::Read`]
/// if `image_root` cannot be enumerated.
pub fn evaluate(
    image_root: &Path,
    output_root: &Path,
    config: &SegConfig,
) -> Result<BatchReport, RunError> {
    config.validate()?;

    let images = collect_images(image_root).map_err(|source| RunError::Read {
        path: image_root.to_path_buf(),
        source,
    })?;

    // Files already sitting under the counted categories would land in
    // the report; outputs mirroring a current input are refreshed
    // below, but anything else (renamed or removed inputs, foreign
    // files) keeps counting.
    let preexisting =
        count_files(&output_root.join(POS_DIR)) + count_files(&output_root.join(NEG_DIR));
    if preexisting > 0 {
        warn!(
            files = preexisting,
            path = %output_root.display(),
            "output root is not empty; leftover files count toward the report",
        );
    }

    // Parallel fan-out, one invocation per image. `for_each` does not
    // return until every invocation has reached a terminal state
    // (written, suppressed, or logged failure), so the file counting
    // below never runs early.
    images.par_iter().for_each(|image_path| {
        let Some(output_path) = mirror_path(image_root, output_root, image_path) else {
            warn!(path = %image_path.display(), "image escapes the input root, skipping");
            return;
        };
        match run::run(image_path, &output_path, config) {
            Ok(result) if result.written => {
                debug!(
                    path = %image_path.display(),
                    edge_pixels = result.verdict.edge_pixel_count,
                    "output written",
                );
            }
            Ok(result) => {
                // An earlier run with a more permissive configuration
                // may have written this path; the file count is the
                // detection signal, so the stale output must go.
                if let Err(e) = fs::remove_file(&output_path)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    warn!(path = %output_path.display(), "failed to remove stale output: {e}");
                }
                debug!(
                    path = %image_path.display(),
                    edge_pixels = result.verdict.edge_pixel_count,
                    "rover not found, output suppressed",
                );
            }
            Err(e) => warn!(path = %image_path.display(), "skipping image: {e}"),
        }
    });

    Ok(BatchReport {
        true_positives: count_files(&output_root.join(POS_DIR)),
        false_positives: count_files(&output_root.join(NEG_DIR)),
        positives_total: count_images(&image_root.join(POS_DIR)),
        negatives_total: count_images(&image_root.join(NEG_DIR)),
    })
}

/// Map an input image to its mirrored output path with a `.png`
/// extension. Returns `None` when the image is not under `image_root`.
fn mirror_path(image_root: &Path, output_root: &Path, image_path: &Path) -> Option<PathBuf> {
    let relative = image_path.strip_prefix(image_root).ok()?;
    Some(output_root.join(relative).with_extension("png"))
}

/// Whether a path has a recognized image extension (case-insensitive).
fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Recursively enumerate all images under `root`, sorted for
/// deterministic dispatch order in logs.
fn collect_images(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    visit(root, &mut images)?;
    images.sort();
    Ok(images)
}

fn visit(dir: &Path, images: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            visit(&path, images)?;
        } else if is_image(&path) {
            images.push(path);
        }
    }
    Ok(())
}

/// Recursively count files under `dir`; a missing directory counts as
/// zero (e.g. no outputs were written to it).
fn count_files(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

/// Recursively count ground-truth images under `dir`.
fn count_images(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_images(&path)
            } else {
                u64::from(is_image(&path))
            }
        })
        .sum()
}
