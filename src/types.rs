use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Image formats accepted by the labeling, validation and split stages
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png"];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// Check whether a path has an allow-listed image extension, case-insensitively
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| get_image_extensions_set().contains(&ext.to_lowercase()))
}

/// Extension used for label files colocated with their images
pub const LABEL_EXTENSION: &str = "txt";

/// Number of keypoints the hand landmark model reports per hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// A single 2-D keypoint, normalized to [0,1] relative to image width/height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
}

/// One detected hand: an ordered sequence of 21 normalized keypoints
#[derive(Debug, Clone)]
pub struct HandDetection {
    pub keypoints: [Keypoint; HAND_LANDMARK_COUNT],
    /// Detector confidence score in [0,1]
    pub confidence: f32,
}

/// An axis-aligned box in normalized center/extent form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// A box whose padding or clamping collapsed it to zero or negative area
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// Counters reported at the end of a labeling run
#[derive(Debug, Default, Clone)]
pub struct LabelingStats {
    pub classes_processed: usize,
    pub images_seen: usize,
    pub labels_written: usize,
    pub skipped_no_hand: usize,
    pub failed_decode: usize,
    pub degenerate_boxes: usize,
}

impl LabelingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Labeling Summary ===");
        log::info!("Class folders processed: {}", self.classes_processed);
        log::info!("Images seen: {}", self.images_seen);
        log::info!("Label files written: {}", self.labels_written);
        log::info!("Skipped (no hand detected): {}", self.skipped_no_hand);
        log::info!("Skipped (unreadable image): {}", self.failed_decode);

        if self.degenerate_boxes > 0 {
            log::warn!(
                "Emitted {} degenerate (zero-area) boxes",
                self.degenerate_boxes
            );
        }
    }
}
