use log::{error, info, warn};
use std::error::Error;
use std::path::Path;

use crate::conversion::{
    derive_bounding_box, format_label_record, label_path_for_image, write_label_file, Padding,
};
use crate::io::{list_class_dirs, list_images};
use crate::landmark::HandLandmarker;
use crate::types::LabelingStats;
use crate::utils::create_progress_bar;
use crate::vocab::Vocabulary;

/// Options for a labeling run
#[derive(Debug, Clone, Default)]
pub struct LabelingOptions {
    pub padding: Padding,
    /// When set, derive and log the first N records per class without
    /// writing any label files
    pub preview: Option<usize>,
}

/// Walk the per-class image folders, derive one bounding box per image from
/// the hand landmarks, and write YOLO label files next to the images.
///
/// Images with no detected hand produce no label and are not errors; they
/// surface later in the validator's missing count. Unreadable images and
/// failed label writes are logged and skipped. Unknown class folders are
/// skipped entirely.
pub fn label_dataset(
    image_root: &Path,
    vocab: &Vocabulary,
    landmarker: &mut dyn HandLandmarker,
    options: &LabelingOptions,
) -> Result<LabelingStats, Box<dyn Error>> {
    if !image_root.is_dir() {
        return Err(format!("image root is not a directory: {}", image_root.display()).into());
    }

    let mut stats = LabelingStats::new();

    for (class_name, class_dir) in list_class_dirs(image_root)? {
        let Some(class_index) = vocab.index_of(&class_name) else {
            warn!("Skipping unknown class folder: {}", class_name);
            continue;
        };

        let images = list_images(&class_dir)?;
        let limit = options.preview.unwrap_or(images.len());
        let pb = create_progress_bar(images.len().min(limit) as u64, &class_name);

        for image_path in images.iter().take(limit) {
            stats.images_seen += 1;

            let image = match image::open(image_path) {
                Ok(image) => image.to_rgb8(),
                Err(e) => {
                    error!("Failed to load image {}: {}", image_path.display(), e);
                    stats.failed_decode += 1;
                    pb.inc(1);
                    continue;
                }
            };

            let detection = match landmarker.detect(&image) {
                Ok(Some(detection)) => detection,
                Ok(None) => {
                    // No hand in this image; the validator reports it as missing
                    stats.skipped_no_hand += 1;
                    pb.inc(1);
                    continue;
                }
                Err(e) => {
                    error!("Detector failed on {}: {}", image_path.display(), e);
                    stats.failed_decode += 1;
                    pb.inc(1);
                    continue;
                }
            };

            let bbox =
                derive_bounding_box(&detection, image.width(), image.height(), options.padding);
            if bbox.is_degenerate() {
                warn!(
                    "Degenerate box for {} (w={:.6}, h={:.6})",
                    image_path.display(),
                    bbox.width,
                    bbox.height
                );
                stats.degenerate_boxes += 1;
            }

            let record = format_label_record(class_index, &bbox);
            if options.preview.is_some() {
                info!("[preview] {} -> {}", image_path.display(), record.trim_end());
                pb.inc(1);
                continue;
            }

            let label_path = label_path_for_image(image_path);
            match write_label_file(&label_path, &record) {
                Ok(()) => stats.labels_written += 1,
                Err(e) => error!("Failed to write label {}: {}", label_path.display(), e),
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        stats.classes_processed += 1;
        info!("Finished class {}", class_name);
    }

    stats.print_summary();
    Ok(stats)
}
