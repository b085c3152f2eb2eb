//! roverseg: segment planetary-surface photographs to isolate the
//! rover, and score detection accuracy over labeled example sets.
//!
//! Two subcommands:
//!
//! - `seg` runs the pipeline on a single image and writes the mask (or
//!   the four-panel debug composite).
//! - `eval` runs the pipeline over a `pos`/`neg` directory tree in
//!   parallel and prints the accuracy report.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use roverseg_cli::{eval, run};
use roverseg_pipeline::{ClassifierKind, SegConfig};
use tracing::{info, warn};

/// Rover segmentation and batch accuracy evaluation.
#[derive(Parser)]
#[command(name = "roverseg", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment a single image and write the mask or debug composite.
    Seg(SegArgs),
    /// Run the pipeline over a labeled pos/neg tree and report accuracy.
    Eval(EvalArgs),
}

/// Pipeline parameters shared by both subcommands.
#[derive(Args)]
struct ConfigArgs {
    /// Gaussian blur sigma applied before edge detection. Higher values
    /// produce fewer edges.
    #[arg(long, default_value_t = SegConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = SegConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = SegConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Neighborhood radius in pixels for classifying a pixel as rover.
    #[arg(long, default_value_t = SegConfig::DEFAULT_SEG_NPX)]
    seg_npx: u32,

    /// Require intensity matching against nearby edge pixels (slower,
    /// higher-fidelity classifier) instead of plain edge proximity.
    #[arg(long)]
    match_edges: bool,

    /// Minimum edge-pixel count for an image to count as containing a
    /// rover.
    #[arg(long, default_value_t = SegConfig::DEFAULT_ROVER_NPX_THRESH)]
    rover_npx_thresh: u32,

    /// Write the four-panel debug composite (original | sigma map |
    /// edges | mask) for every image, regardless of verdict.
    #[arg(long)]
    debug: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `SegConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

impl ConfigArgs {
    /// Build a [`SegConfig`] from the CLI flags, or parse
    /// `--config-json` directly when it is provided.
    fn to_config(&self) -> Result<SegConfig, String> {
        if let Some(ref json) = self.config_json {
            return serde_json::from_str(json)
                .map_err(|e| format!("error parsing --config-json: {e}"));
        }

        Ok(SegConfig {
            blur_sigma: self.blur_sigma,
            canny_low: self.canny_low,
            canny_high: self.canny_high,
            seg_npx: self.seg_npx,
            classifier: if self.match_edges {
                ClassifierKind::Match
            } else {
                ClassifierKind::Distance
            },
            rover_npx_thresh: self.rover_npx_thresh,
            debug: self.debug,
        })
    }
}

#[derive(Args)]
struct SegArgs {
    /// Input image path (JPEG or PNG).
    input: PathBuf,

    /// Output path for the mask or debug composite.
    #[arg(short, long, default_value = "output/segmented.png")]
    output: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct EvalArgs {
    /// Source image root containing pos/ and neg/ subdirectories.
    /// Falls back to $IMGDIR, then "images".
    #[arg(long)]
    image_root: Option<PathBuf>,

    /// Destination root mirroring the source tree.
    /// Falls back to $OUTDIR, then "output".
    #[arg(long)]
    output_root: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Seg(args) => cmd_seg(&args),
        Command::Eval(args) => cmd_eval(&args),
    }
}

fn cmd_seg(args: &SegArgs) -> ExitCode {
    let config = match args.config.to_config() {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    match run::run(&args.input, &args.output, &config) {
        Ok(result) => {
            info!(
                edge_pixels = result.verdict.edge_pixel_count,
                threshold = result.verdict.threshold_used,
                has_rover = result.verdict.has_rover,
                "segmentation finished",
            );
            if result.written {
                println!("{}", args.output.display());
            } else {
                println!("rover not found; output suppressed");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_eval(args: &EvalArgs) -> ExitCode {
    let mut config = match args.config.to_config() {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    // The batch harness propagates $DEBUG as the debug flag.
    config.debug = config.debug || env_flag("DEBUG");
    if config.debug {
        warn!("debug mode writes output for every image; the accuracy figure is meaningless");
    }

    let image_root = resolve_root(args.image_root.as_ref(), "IMGDIR", "images");
    let output_root = resolve_root(args.output_root.as_ref(), "OUTDIR", "output");
    info!(
        image_root = %image_root.display(),
        output_root = %output_root.display(),
        "starting batch evaluation",
    );

    match eval::evaluate(&image_root, &output_root, &config) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve a directory root: explicit flag, then environment variable,
/// then default.
fn resolve_root(flag: Option<&PathBuf>, env_var: &str, default: &str) -> PathBuf {
    flag.cloned()
        .or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Interpret an environment variable as a boolean flag.
fn env_flag(env_var: &str) -> bool {
    std::env::var(env_var).is_ok_and(|v| {
        matches!(
            v.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}
