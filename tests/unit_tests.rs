use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use hands2yolo::config::FailurePolicy;
use hands2yolo::extract::extract_images;
use hands2yolo::validate::scan_dataset;
use hands2yolo::{
    derive_bounding_box, format_label_record, label_dataset, split_dataset, write_label_file,
    HandDetection, HandLandmarker, Keypoint, LabelingOptions, Padding, SplitOptions, Vocabulary,
    HAND_LANDMARK_COUNT,
};

// A detection whose keypoints span exactly the given normalized extent
fn detection_spanning(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> HandDetection {
    let mid = Keypoint {
        x: (x_min + x_max) / 2.0,
        y: (y_min + y_max) / 2.0,
    };
    let mut keypoints = [mid; HAND_LANDMARK_COUNT];
    keypoints[0] = Keypoint { x: x_min, y: y_min };
    keypoints[1] = Keypoint { x: x_max, y: y_max };
    HandDetection {
        keypoints,
        confidence: 0.9,
    }
}

#[test]
fn test_derive_bounding_box_without_padding() {
    // Pixel extent 100..200 x 50..150 in a 400x400 image
    let detection = detection_spanning(0.25, 0.125, 0.5, 0.375);
    let bbox = derive_bounding_box(&detection, 400, 400, Padding::NONE);

    assert_eq!(bbox.cx, 0.375);
    assert_eq!(bbox.cy, 0.25);
    assert_eq!(bbox.width, 0.25);
    assert_eq!(bbox.height, 0.25);
}

#[test]
fn test_derive_bounding_box_with_padding() {
    // Same extent, expanded by 0.2 horizontally and 0.1 vertically: each
    // side moves by the fraction of the raw span, so x becomes 80..220 and
    // y becomes 40..160
    let detection = detection_spanning(0.25, 0.125, 0.5, 0.375);
    let bbox = derive_bounding_box(&detection, 400, 400, Padding::STANDARD);

    assert!((bbox.cx - 0.375).abs() < 1e-9);
    assert!((bbox.cy - 0.25).abs() < 1e-9);
    assert!((bbox.width - 0.35).abs() < 1e-9);
    assert!((bbox.height - 0.3).abs() < 1e-9);
}

#[test]
fn test_derive_bounding_box_clamps_to_unit_square() {
    // Keypoints near the borders pushed out by padding must clamp back in
    let detection = detection_spanning(0.01, 0.02, 0.99, 0.98);
    let bbox = derive_bounding_box(
        &detection,
        416,
        416,
        Padding {
            horizontal: 0.5,
            vertical: 0.5,
        },
    );

    for value in [bbox.cx, bbox.cy, bbox.width, bbox.height] {
        assert!((0.0..=1.0).contains(&value), "out of range: {}", value);
    }
    // Fully clamped on both axes
    assert!((bbox.width - 1.0).abs() < 1e-9);
    assert!((bbox.height - 1.0).abs() < 1e-9);
}

#[test]
fn test_degenerate_detection_still_yields_a_box() {
    let point = Keypoint { x: 0.5, y: 0.5 };
    let detection = HandDetection {
        keypoints: [point; HAND_LANDMARK_COUNT],
        confidence: 0.9,
    };
    let bbox = derive_bounding_box(&detection, 100, 100, Padding::NONE);

    assert!(bbox.is_degenerate());
    assert_eq!(
        format_label_record(7, &bbox),
        "7 0.500000 0.500000 0.000000 0.000000\n"
    );
}

#[test]
fn test_format_label_record() {
    let detection = detection_spanning(0.25, 0.125, 0.5, 0.375);
    let bbox = derive_bounding_box(&detection, 400, 400, Padding::NONE);

    assert_eq!(
        format_label_record(3, &bbox),
        "3 0.375000 0.250000 0.250000 0.250000\n"
    );
}

#[test]
fn test_label_writes_are_idempotent() {
    let temp_dir = tempfile::tempdir().unwrap();
    let label_path = temp_dir.path().join("sample.txt");

    let detection = detection_spanning(0.1, 0.2, 0.6, 0.7);
    let bbox = derive_bounding_box(&detection, 416, 416, Padding::STANDARD);
    let record = format_label_record(12, &bbox);

    write_label_file(&label_path, &record).unwrap();
    let first = fs::read(&label_path).unwrap();
    write_label_file(&label_path, &record).unwrap();
    let second = fs::read(&label_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_combined_vocabulary_ordering() {
    let vocab = Vocabulary::combined();

    assert_eq!(vocab.len(), 39);
    assert_eq!(vocab.index_of("0"), Some(0));
    assert_eq!(vocab.index_of("9"), Some(9));
    assert_eq!(vocab.index_of("A"), Some(10));
    assert_eq!(vocab.index_of("Z"), Some(35));
    assert_eq!(vocab.index_of("del"), Some(36));
    assert_eq!(vocab.index_of("nothing"), Some(37));
    assert_eq!(vocab.index_of("space"), Some(38));
    assert_eq!(vocab.index_of("misc"), None);
}

#[test]
fn test_letters_vocabulary_ordering() {
    let vocab = Vocabulary::letters();

    assert_eq!(vocab.len(), 26);
    assert_eq!(vocab.index_of("A"), Some(0));
    assert_eq!(vocab.index_of("Z"), Some(25));
    assert_eq!(vocab.index_of("0"), None);
}

#[test]
fn test_vocabulary_from_json_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("classes.json");
    fs::write(&path, r#"{"version": 2, "names": ["fist", "palm"]}"#).unwrap();

    let vocab = Vocabulary::from_json_file(&path).unwrap();
    assert_eq!(vocab.version, 2);
    assert_eq!(vocab.index_of("palm"), Some(1));
}

#[test]
fn test_vocabulary_rejects_duplicates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("classes.json");
    fs::write(&path, r#"{"version": 1, "names": ["A", "A"]}"#).unwrap();

    assert!(Vocabulary::from_json_file(&path).is_err());
}

// Build a class folder with the given image files; names ending in a '+'
// also get a matching label file
fn populate_class(root: &Path, class: &str, files: &[&str]) {
    let dir = root.join(class);
    fs::create_dir_all(&dir).unwrap();
    for file in files {
        let (name, labeled) = match file.strip_suffix('+') {
            Some(name) => (name, true),
            None => (*file, false),
        };
        fs::write(dir.join(name), format!("pixels of {}", name)).unwrap();
        if labeled {
            let stem = Path::new(name).file_stem().unwrap().to_str().unwrap();
            fs::write(dir.join(format!("{}.txt", stem)), "0 0.5 0.5 0.2 0.2\n").unwrap();
        }
    }
}

#[test]
fn test_scan_dataset_counts_label_coverage() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();

    populate_class(root, "B", &["b1.png"]);
    populate_class(root, "A", &["a1.jpg+", "a2.JPG", "a3.jpeg+", "notes.md"]);
    populate_class(root, "misc", &["m1.jpg+"]);
    fs::write(root.join("stray.txt"), "not a class folder").unwrap();

    let reports = scan_dataset(root, &Vocabulary::letters()).unwrap();

    // Sorted by class name, unknown folder excluded
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].class, "A");
    assert_eq!(reports[0].total, 3);
    assert_eq!(reports[0].labeled, 2);
    assert_eq!(reports[0].missing(), 1);
    assert_eq!(reports[1].class, "B");
    assert_eq!(reports[1].total, 1);
    assert_eq!(reports[1].labeled, 0);
    assert!(reports.iter().all(|r| r.labeled <= r.total));
}

fn split_membership(dir: &Path) -> io::Result<HashSet<String>> {
    Ok(fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect())
}

#[test]
fn test_split_partitions_complete_pairs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("source");
    let dest = temp_dir.path().join("dest");

    populate_class(
        &source,
        "A",
        &["a1.jpg+", "a2.jpg+", "a3.jpg+", "a4.jpg+", "a5.jpg+", "orphan.jpg"],
    );

    let summary = split_dataset(
        &source,
        &dest,
        &Vocabulary::letters(),
        &SplitOptions::default(),
    )
    .unwrap();

    // floor(5 * 0.8) = 4 train, 1 val; the incomplete pair is excluded
    assert_eq!(summary.train_pairs, 4);
    assert_eq!(summary.val_pairs, 1);
    assert_eq!(summary.skipped_missing, 0);

    let train = split_membership(&dest.join("images/train")).unwrap();
    let val = split_membership(&dest.join("images/val")).unwrap();
    assert_eq!(train.len(), 4);
    assert_eq!(val.len(), 1);
    assert!(train.is_disjoint(&val));
    assert!(!train.contains("orphan.jpg") && !val.contains("orphan.jpg"));

    let mut all: HashSet<String> = train.union(&val).cloned().collect();
    for i in 1..=5 {
        assert!(all.remove(&format!("a{}.jpg", i)));
    }
    assert!(all.is_empty());

    // Copies are byte-identical and every image kept its label
    for split in ["train", "val"] {
        for name in split_membership(&dest.join("images").join(split)).unwrap() {
            let copied = fs::read(dest.join("images").join(split).join(&name)).unwrap();
            let original = fs::read(source.join("A").join(&name)).unwrap();
            assert_eq!(copied, original);

            let stem = Path::new(&name).file_stem().unwrap().to_str().unwrap();
            assert!(dest
                .join("labels")
                .join(split)
                .join(format!("{}.txt", stem))
                .is_file());
        }
    }

    let yaml = fs::read_to_string(dest.join("dataset.yaml")).unwrap();
    assert!(yaml.contains("train: images/train"));
    assert!(yaml.contains("val: images/val"));
    assert!(yaml.contains("0: A"));
}

#[test]
fn test_split_is_deterministic_for_a_seed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("source");

    populate_class(
        &source,
        "C",
        &["c1.jpg+", "c2.jpg+", "c3.jpg+", "c4.jpg+", "c5.jpg+", "c6.jpg+"],
    );

    let options = SplitOptions {
        seed: 7,
        ..SplitOptions::default()
    };
    let dest_a = temp_dir.path().join("dest_a");
    let dest_b = temp_dir.path().join("dest_b");
    split_dataset(&source, &dest_a, &Vocabulary::letters(), &options).unwrap();
    split_dataset(&source, &dest_b, &Vocabulary::letters(), &options).unwrap();

    assert_eq!(
        split_membership(&dest_a.join("images/train")).unwrap(),
        split_membership(&dest_b.join("images/train")).unwrap()
    );
    assert_eq!(
        split_membership(&dest_a.join("images/val")).unwrap(),
        split_membership(&dest_b.join("images/val")).unwrap()
    );
}

#[test]
fn test_split_skips_unknown_class_folder() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("source");
    let dest = temp_dir.path().join("dest");

    populate_class(&source, "A", &["a1.jpg+", "a2.jpg+"]);
    populate_class(&source, "misc", &["m1.jpg+"]);

    let summary = split_dataset(
        &source,
        &dest,
        &Vocabulary::letters(),
        &SplitOptions {
            on_missing: FailurePolicy::Skip,
            ..SplitOptions::default()
        },
    )
    .unwrap();

    assert_eq!(summary.classes_processed, 1);
    assert_eq!(summary.train_pairs + summary.val_pairs, 2);

    let train = split_membership(&dest.join("images/train")).unwrap();
    let val = split_membership(&dest.join("images/val")).unwrap();
    assert!(!train.contains("m1.jpg") && !val.contains("m1.jpg"));
}

// Substitute landmarker that always reports the same hand
struct FixedLandmarker(Option<HandDetection>);

impl HandLandmarker for FixedLandmarker {
    fn detect(&mut self, _image: &image::RgbImage) -> io::Result<Option<HandDetection>> {
        Ok(self.0.clone())
    }
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90]));
    img.save(path).unwrap();
}

#[test]
fn test_label_dataset_writes_records_next_to_images() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("A")).unwrap();
    fs::create_dir_all(root.join("misc")).unwrap();
    write_png(&root.join("A/a1.png"), 4, 4);
    write_png(&root.join("misc/m1.png"), 4, 4);

    let mut landmarker = FixedLandmarker(Some(detection_spanning(0.25, 0.25, 0.75, 0.75)));
    let stats = label_dataset(
        root,
        &Vocabulary::letters(),
        &mut landmarker,
        &LabelingOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.classes_processed, 1);
    assert_eq!(stats.images_seen, 1);
    assert_eq!(stats.labels_written, 1);

    let record = fs::read_to_string(root.join("A/a1.txt")).unwrap();
    assert_eq!(record, "0 0.500000 0.500000 0.500000 0.500000\n");
    assert!(!root.join("misc/m1.txt").exists());
}

#[test]
fn test_label_dataset_skips_images_without_a_hand() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("B")).unwrap();
    write_png(&root.join("B/b1.png"), 4, 4);

    let mut landmarker = FixedLandmarker(None);
    let stats = label_dataset(
        root,
        &Vocabulary::letters(),
        &mut landmarker,
        &LabelingOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.labels_written, 0);
    assert_eq!(stats.skipped_no_hand, 1);
    assert!(!root.join("B/b1.txt").exists());
}

#[test]
fn test_label_dataset_preview_writes_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("A")).unwrap();
    write_png(&root.join("A/a1.png"), 4, 4);
    write_png(&root.join("A/a2.png"), 4, 4);

    let mut landmarker = FixedLandmarker(Some(detection_spanning(0.25, 0.25, 0.75, 0.75)));
    let stats = label_dataset(
        root,
        &Vocabulary::letters(),
        &mut landmarker,
        &LabelingOptions {
            preview: Some(1),
            ..LabelingOptions::default()
        },
    )
    .unwrap();

    assert_eq!(stats.labels_written, 0);
    assert_eq!(stats.images_seen, 1);
    assert!(!root.join("A/a1.txt").exists());
    assert!(!root.join("A/a2.txt").exists());
}

#[test]
fn test_extract_resizes_into_class_tree() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("raw");
    let dest = temp_dir.path().join("ready");
    fs::create_dir_all(source.join("A")).unwrap();
    write_png(&source.join("A/a1.png"), 10, 8);
    write_png(&source.join("A/a2.png"), 3, 3);

    let extracted = extract_images(&source, &dest, 16).unwrap();
    assert_eq!(extracted, 2);

    let resized = image::open(dest.join("A/a1.png")).unwrap();
    assert_eq!(resized.width(), 16);
    assert_eq!(resized.height(), 16);
}

#[test]
fn test_extract_leaves_existing_outputs_untouched() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("raw");
    let dest = temp_dir.path().join("ready");
    fs::create_dir_all(source.join("A")).unwrap();
    fs::create_dir_all(dest.join("A")).unwrap();
    write_png(&source.join("A/a1.png"), 10, 8);
    fs::write(dest.join("A/a1.png"), "already here").unwrap();

    let extracted = extract_images(&source, &dest, 16).unwrap();
    assert_eq!(extracted, 0);
    assert_eq!(fs::read(dest.join("A/a1.png")).unwrap(), b"already here");
}
