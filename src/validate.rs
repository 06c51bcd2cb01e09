use log::{info, warn};
use std::io;
use std::path::Path;

use crate::conversion::label_path_for_image;
use crate::io::{list_class_dirs, list_images};
use crate::vocab::Vocabulary;

/// Label coverage of one class folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReport {
    pub class: String,
    pub total: usize,
    pub labeled: usize,
}

impl ClassReport {
    pub fn missing(&self) -> usize {
        self.total - self.labeled
    }
}

/// Scan the labeled image tree and report, per class, how many images have
/// a same-base-name label file.
///
/// Read-only: nothing is created or modified. Folders whose name is not in
/// the vocabulary are warned about and excluded from the report. Reports
/// come back sorted by class name.
pub fn scan_dataset(image_root: &Path, vocab: &Vocabulary) -> io::Result<Vec<ClassReport>> {
    let mut reports = Vec::new();

    for (class_name, class_dir) in list_class_dirs(image_root)? {
        if vocab.index_of(&class_name).is_none() {
            warn!("Skipping unknown class folder: {}", class_name);
            continue;
        }

        let images = list_images(&class_dir)?;
        let labeled = images
            .iter()
            .filter(|image_path| label_path_for_image(image_path).is_file())
            .count();

        reports.push(ClassReport {
            class: class_name,
            total: images.len(),
            labeled,
        });
    }

    Ok(reports)
}

/// Log the coverage report, one line per class
pub fn print_report(reports: &[ClassReport]) {
    info!("=== Label Coverage ===");
    for report in reports {
        info!(
            "{:<10} | images: {:<5} | labeled: {:<5} | missing: {}",
            report.class,
            report.total,
            report.labeled,
            report.missing()
        );
    }
}
