use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::FailurePolicy;
use crate::conversion::label_path_for_image;
use crate::io::{create_dataset_yaml, list_class_dirs, list_images, setup_output_directories};
use crate::utils::create_progress_bar;
use crate::vocab::Vocabulary;

/// Options for a split run
#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    /// Proportion of each class assigned to the training set
    pub train_ratio: f64,
    /// Seed for the shuffle; the same seed over the same tree reproduces
    /// the same membership
    pub seed: u64,
    pub on_missing: FailurePolicy,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            seed: 42,
            on_missing: FailurePolicy::Abort,
        }
    }
}

/// Totals reported after a split run
#[derive(Debug, Default, Clone)]
pub struct SplitSummary {
    pub classes_processed: usize,
    pub train_pairs: usize,
    pub val_pairs: usize,
    pub skipped_missing: usize,
}

// A complete image/label pair, colocated in a class folder
struct Pair {
    image: PathBuf,
    label: PathBuf,
}

/// Partition each class's complete image/label pairs into train and val and
/// copy them into the destination layout.
///
/// Incomplete pairs (image without label) are excluded up front. The split
/// point is `floor(pairs * train_ratio)`; the shuffled prefix goes to train,
/// the remainder to val. Files are copied, never moved, preserving their
/// names; a destination file with the same name is overwritten.
pub fn split_dataset(
    source_root: &Path,
    dest_root: &Path,
    vocab: &Vocabulary,
    options: &SplitOptions,
) -> Result<SplitSummary, Box<dyn Error>> {
    if !source_root.is_dir() {
        return Err(format!("source root is not a directory: {}", source_root.display()).into());
    }

    let output_dirs = setup_output_directories(dest_root)?;
    let mut summary = SplitSummary::default();
    let mut rng = StdRng::seed_from_u64(options.seed);

    for (class_name, class_dir) in list_class_dirs(source_root)? {
        if vocab.index_of(&class_name).is_none() {
            warn!("Skipping unknown class folder: {}", class_name);
            continue;
        }

        let mut pairs: Vec<Pair> = list_images(&class_dir)?
            .into_iter()
            .filter_map(|image| {
                let label = label_path_for_image(&image);
                label.is_file().then_some(Pair { image, label })
            })
            .collect();

        pairs.shuffle(&mut rng);
        let split_idx = (pairs.len() as f64 * options.train_ratio).floor() as usize;
        let (train_pairs, val_pairs) = pairs.split_at(split_idx);

        let pb = create_progress_bar(pairs.len() as u64, &class_name);
        for (pairs, images_dir, labels_dir) in [
            (
                train_pairs,
                &output_dirs.train_images_dir,
                &output_dirs.train_labels_dir,
            ),
            (
                val_pairs,
                &output_dirs.val_images_dir,
                &output_dirs.val_labels_dir,
            ),
        ] {
            for pair in pairs {
                copy_pair(pair, images_dir, labels_dir, options.on_missing, &mut summary)?;
                pb.inc(1);
            }
        }
        pb.finish_and_clear();

        summary.classes_processed += 1;
        summary.train_pairs += train_pairs.len();
        summary.val_pairs += val_pairs.len();
        info!(
            "{}: {} train, {} val",
            class_name,
            train_pairs.len(),
            val_pairs.len()
        );
    }

    create_dataset_yaml(dest_root, vocab)?;
    info!(
        "Split complete: {} train pairs, {} val pairs across {} classes",
        summary.train_pairs, summary.val_pairs, summary.classes_processed
    );
    if summary.skipped_missing > 0 {
        warn!(
            "Skipped {} pairs whose files disappeared before copy",
            summary.skipped_missing
        );
    }

    Ok(summary)
}

// Copy one pair into the split directories. A file that vanished since
// enumeration is handled per the failure policy; all other I/O errors abort.
fn copy_pair(
    pair: &Pair,
    images_dir: &Path,
    labels_dir: &Path,
    on_missing: FailurePolicy,
    summary: &mut SplitSummary,
) -> Result<(), Box<dyn Error>> {
    let (Some(image_name), Some(label_name)) = (pair.image.file_name(), pair.label.file_name())
    else {
        return Err(format!("pair has no file name: {}", pair.image.display()).into());
    };
    let image_dst = images_dir.join(image_name);
    let label_dst = labels_dir.join(label_name);

    let result = fs::copy(&pair.image, &image_dst).and_then(|_| fs::copy(&pair.label, &label_dst));
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound && on_missing == FailurePolicy::Skip => {
            warn!(
                "Pair vanished before copy, skipping: {}",
                pair.image.display()
            );
            // Neither half of a skipped pair may survive in the split tree
            let _ = fs::remove_file(&image_dst);
            let _ = fs::remove_file(&label_dst);
            summary.skipped_missing += 1;
            Ok(())
        }
        Err(e) => Err(format!("failed to copy {}: {}", pair.image.display(), e).into()),
    }
}
