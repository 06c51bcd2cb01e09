//! Hand-sign dataset preparation for YOLO training
//!
//! This library turns per-class folders of hand-sign images into a YOLO
//! dataset: a hand-landmark detector supplies keypoints, boxes are derived
//! from the keypoint extent, label files are written next to the images,
//! and a seeded splitter copies complete image/label pairs into a
//! train/val tree.

pub mod config;
pub mod conversion;
pub mod extract;
pub mod io;
pub mod labeling;
pub mod landmark;
pub mod split;
pub mod types;
pub mod utils;
pub mod validate;
pub mod vocab;

// Re-export commonly used types and functions
pub use config::{Args, Command, FailurePolicy};
pub use conversion::{derive_bounding_box, format_label_record, write_label_file, Padding};
pub use labeling::{label_dataset, LabelingOptions};
pub use landmark::{HandLandmarker, LandmarkBridge};
pub use split::{split_dataset, SplitOptions, SplitSummary};
pub use types::{BoundingBox, HandDetection, Keypoint, LabelingStats, HAND_LANDMARK_COUNT};
pub use validate::{scan_dataset, ClassReport};
pub use vocab::Vocabulary;
