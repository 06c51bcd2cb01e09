use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hands2yolo::{
    extract::extract_images,
    label_dataset, split_dataset,
    validate::{print_report, scan_dataset},
    Args, Command, LabelingOptions, LandmarkBridge, Padding, SplitOptions, Vocabulary,
};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Extract { source, dest, size } => {
            let extracted = extract_images(Path::new(&source), Path::new(&dest), size)?;
            info!("Extraction complete: {} images written", extracted);
        }

        Command::Label {
            image_dir,
            classes,
            padding,
            pad_width,
            pad_height,
            preview,
            detector,
            min_confidence,
        } => {
            let vocab = Vocabulary::resolve(&classes)?;
            let base = if padding { Padding::STANDARD } else { Padding::NONE };
            let options = LabelingOptions {
                padding: Padding {
                    horizontal: pad_width.unwrap_or(base.horizontal),
                    vertical: pad_height.unwrap_or(base.vertical),
                },
                preview,
            };

            let mut bridge = LandmarkBridge::spawn(&PathBuf::from(&detector), min_confidence)?;
            label_dataset(Path::new(&image_dir), &vocab, &mut bridge, &options)?;
        }

        Command::Validate { image_dir, classes } => {
            let vocab = Vocabulary::resolve(&classes)?;
            let reports = scan_dataset(Path::new(&image_dir), &vocab)?;
            print_report(&reports);
        }

        Command::Split {
            source,
            dest,
            classes,
            train_ratio,
            seed,
            on_missing,
        } => {
            let vocab = Vocabulary::resolve(&classes)?;
            let options = SplitOptions {
                train_ratio,
                seed,
                on_missing,
            };
            split_dataset(Path::new(&source), Path::new(&dest), &vocab, &options)?;
        }
    }

    Ok(())
}
