use std::fs;
use std::io;
use std::path::Path;

use crate::types::{BoundingBox, HandDetection};

/// Padding fractions applied to a derived box, per axis.
///
/// `Padding::NONE` reproduces the raw keypoint extent; `Padding::STANDARD`
/// widens the box so the whole hand is captured, which the letters-only
/// dataset needs because fingertips sit right on the extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Padding {
    pub const NONE: Padding = Padding {
        horizontal: 0.0,
        vertical: 0.0,
    };

    pub const STANDARD: Padding = Padding {
        horizontal: 0.2,
        vertical: 0.1,
    };
}

impl Default for Padding {
    fn default() -> Self {
        Padding::NONE
    }
}

/// Derive a normalized bounding box from a hand detection.
///
/// The box is the min/max extent of all keypoints in pixel space, expanded
/// on each side by the padding fraction of the pre-expansion span, clamped
/// to the image bounds, then normalized to center/extent form. A detection
/// whose extent collapses to zero area still yields a box; callers decide
/// whether to keep it.
pub fn derive_bounding_box(
    detection: &HandDetection,
    image_width: u32,
    image_height: u32,
    padding: Padding,
) -> BoundingBox {
    let w = image_width as f64;
    let h = image_height as f64;

    let (mut x_min, mut y_min, mut x_max, mut y_max) = detection.keypoints.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x_min, y_min, x_max, y_max), kp| {
            let x = kp.x * w;
            let y = kp.y * h;
            (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
        },
    );

    // Expand both sides by a fraction of the raw span
    let x_span = x_max - x_min;
    let y_span = y_max - y_min;
    x_min -= x_span * padding.horizontal;
    x_max += x_span * padding.horizontal;
    y_min -= y_span * padding.vertical;
    y_max += y_span * padding.vertical;

    // Clamp to the image bounds
    x_min = x_min.max(0.0);
    y_min = y_min.max(0.0);
    x_max = x_max.min(w);
    y_max = y_max.min(h);

    BoundingBox {
        cx: (x_min + (x_max - x_min) / 2.0) / w,
        cy: (y_min + (y_max - y_min) / 2.0) / h,
        width: (x_max - x_min) / w,
        height: (y_max - y_min) / h,
    }
}

/// Format one YOLO label record: class index plus the four box fields with
/// six digits after the decimal point
pub fn format_label_record(class_index: usize, bbox: &BoundingBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}\n",
        class_index, bbox.cx, bbox.cy, bbox.width, bbox.height
    )
}

/// Write a label record to `path`, fully replacing any prior content.
///
/// The record is written in a single call; a failure leaves that one image
/// unlabeled and is reported to the caller.
pub fn write_label_file(path: &Path, record: &str) -> io::Result<()> {
    fs::write(path, record.as_bytes())
}

/// Label file path for an image: same base name, extension replaced
pub fn label_path_for_image(image_path: &Path) -> std::path::PathBuf {
    image_path.with_extension(crate::types::LABEL_EXTENSION)
}
