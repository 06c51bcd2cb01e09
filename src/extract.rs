use image::imageops::FilterType;
use log::{error, info};
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::io::{list_class_dirs, list_images};
use crate::utils::create_progress_bar;

/// Decode, resize and re-save raw per-class images into a detector-ready
/// tree.
///
/// Every image becomes an RGB image of `size` x `size` pixels under
/// `dest/<class>/`, keeping its (sanitized) file name. Files already present
/// at the destination are left untouched, so interrupted runs can resume.
/// Unreadable source images are logged and skipped.
pub fn extract_images(
    source_root: &Path,
    dest_root: &Path,
    size: u32,
) -> Result<usize, Box<dyn Error>> {
    if !source_root.is_dir() {
        return Err(format!("source root is not a directory: {}", source_root.display()).into());
    }

    let mut extracted = 0;

    for (class_name, class_dir) in list_class_dirs(source_root)? {
        let dest_dir = dest_root.join(&class_name);
        fs::create_dir_all(&dest_dir)?;

        let images = list_images(&class_dir)?;
        let pb = create_progress_bar(images.len() as u64, &class_name);

        for image_path in &images {
            pb.inc(1);
            let file_name = match image_path.file_name().and_then(|n| n.to_str()) {
                Some(name) => sanitize_filename::sanitize(name),
                None => continue,
            };
            let dest_path = dest_dir.join(&file_name);
            if dest_path.exists() {
                continue;
            }

            let image = match image::open(image_path) {
                Ok(image) => image.to_rgb8(),
                Err(e) => {
                    error!("Failed to process image {}: {}", image_path.display(), e);
                    continue;
                }
            };

            let resized = image::imageops::resize(&image, size, size, FilterType::Triangle);
            if let Err(e) = resized.save(&dest_path) {
                error!("Failed to save image {}: {}", dest_path.display(), e);
                continue;
            }
            extracted += 1;
        }

        pb.finish_and_clear();
        info!("Extracted class {} ({} images)", class_name, images.len());
    }

    Ok(extracted)
}
