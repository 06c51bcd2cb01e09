use clap::{Parser, Subcommand, ValueEnum};
use std::str::FromStr;

/// Command-line arguments for the hand-sign dataset preparation pipeline.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode, resize and re-save raw per-class images into a YOLO-ready tree
    Extract {
        /// Root of the raw dataset (one subfolder per class)
        #[arg(short = 's', long = "source")]
        source: String,

        /// Destination root for the resized images
        #[arg(short = 'o', long = "dest")]
        dest: String,

        /// Square edge length the images are resized to
        #[arg(long = "size", default_value_t = 416)]
        size: u32,
    },

    /// Derive bounding boxes from hand landmarks and write YOLO label files
    Label {
        /// Root of the per-class image folders
        #[arg(short = 'd', long = "image_dir")]
        image_dir: String,

        /// Class vocabulary: 'combined', 'letters', or a path to a JSON file
        #[arg(long = "classes", default_value = "combined")]
        classes: String,

        /// Expand derived boxes by the standard padding fractions (0.2
        /// horizontal, 0.1 vertical)
        #[arg(long = "padding")]
        padding: bool,

        /// Horizontal padding fraction, overrides the --padding default
        #[arg(long = "pad_width", value_parser = validate_fraction)]
        pad_width: Option<f64>,

        /// Vertical padding fraction, overrides the --padding default
        #[arg(long = "pad_height", value_parser = validate_fraction)]
        pad_height: Option<f64>,

        /// Log the first N derived records per class without writing any files
        #[arg(long = "preview")]
        preview: Option<usize>,

        /// Path to the hand landmark helper script
        #[arg(long = "detector", default_value = "scripts/hand_landmarker.py")]
        detector: String,

        /// Minimum detector confidence for a hand to be accepted
        #[arg(long = "min_confidence", default_value_t = 0.5)]
        min_confidence: f32,
    },

    /// Report per-class label coverage of an image tree
    Validate {
        /// Root of the per-class image folders
        #[arg(short = 'd', long = "image_dir")]
        image_dir: String,

        /// Class vocabulary: 'combined', 'letters', or a path to a JSON file
        #[arg(long = "classes", default_value = "combined")]
        classes: String,
    },

    /// Split complete image/label pairs into train/val trees
    Split {
        /// Root of the labeled per-class image folders
        #[arg(short = 's', long = "source")]
        source: String,

        /// Destination root for the split dataset
        #[arg(short = 'o', long = "dest")]
        dest: String,

        /// Class vocabulary: 'combined', 'letters', or a path to a JSON file
        #[arg(long = "classes", default_value = "combined")]
        classes: String,

        /// Proportion of each class assigned to the training set
        #[arg(long = "train_ratio", default_value_t = 0.8, value_parser = validate_fraction)]
        train_ratio: f64,

        /// Seed for the shuffle that assigns pairs to splits
        #[arg(long = "seed", default_value_t = 42)]
        seed: u64,

        /// What to do when an enumerated file is gone by copy time
        #[arg(long = "on_missing", value_enum, default_value = "abort")]
        on_missing: FailurePolicy,
    },
}

/// Failure policy for files that disappear between enumeration and copy
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum FailurePolicy {
    /// Abort the whole run on the first missing file
    Abort,
    /// Log the missing file, skip the pair, keep going
    Skip,
}

// Validate that a ratio-like argument is between 0.0 and 1.0
fn validate_fraction(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("value must be between 0.0 and 1.0".to_string()),
    }
}
