use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::has_image_extension;
use crate::utils::create_output_directory;
use crate::vocab::Vocabulary;

// Paths to the output directories for the train/val split
pub struct OutputDirs {
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

/// Set up the `images/{train,val}` and `labels/{train,val}` directory
/// structure under the split destination root
pub fn setup_output_directories(dest: &Path) -> io::Result<OutputDirs> {
    let labels_dir = create_output_directory(&dest.join("labels"))?;
    let images_dir = create_output_directory(&dest.join("images"))?;

    let train_labels_dir = create_output_directory(&labels_dir.join("train"))?;
    let val_labels_dir = create_output_directory(&labels_dir.join("val"))?;
    let train_images_dir = create_output_directory(&images_dir.join("train"))?;
    let val_images_dir = create_output_directory(&images_dir.join("val"))?;

    Ok(OutputDirs {
        train_labels_dir,
        val_labels_dir,
        train_images_dir,
        val_images_dir,
    })
}

/// List the immediate subdirectories of an image root, sorted by name.
///
/// Non-directory entries are skipped; membership in the class vocabulary is
/// the caller's concern.
pub fn list_class_dirs(root: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            dirs.push((name.to_string(), path.clone()));
        }
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// List the allow-listed image files directly inside a class folder, sorted
/// by file name
pub fn list_images(class_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(class_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(dest: &Path, vocab: &Vocabulary) -> io::Result<()> {
    let dataset_yaml_path = dest.join("dataset.yaml");
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path)?);
    let absolute_path = fs::canonicalize(dest)?;
    let mut yaml_content = format!(
        "path: {}\ntrain: images/train\nval: images/val\ntest:\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");

    for (id, name) in vocab.names.iter().enumerate() {
        yaml_content.push_str(&format!("    {}: {}\n", id, name));
    }
    dataset_yaml.write_all(yaml_content.as_bytes())
}
