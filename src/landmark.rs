//! Hand landmark detection seam.
//!
//! The detector itself is an external collaborator: given a decoded RGB
//! image it returns at most one hand as 21 normalized keypoints. The
//! production implementation bridges to a MediaPipe helper process over
//! stdin/stdout; tests substitute their own `HandLandmarker`.

use image::RgbImage;
use log::{debug, info, warn};
use serde::Deserialize;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::types::{HandDetection, Keypoint, HAND_LANDMARK_COUNT};

/// A hand landmark detector: image in, zero or one hand out
pub trait HandLandmarker {
    fn detect(&mut self, image: &RgbImage) -> io::Result<Option<HandDetection>>;
}

// Wire structures for the helper's JSON responses
#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f64,
    y: f64,
    #[serde(default)]
    #[allow(dead_code)]
    z: f64,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Bridge to a MediaPipe hand landmark helper running as a child process.
///
/// Protocol: after a `READY` handshake line, each frame is sent as a fixed
/// header (width, height, channels as little-endian u32) followed by the raw
/// RGB bytes; the helper answers with one JSON line listing detected hands.
pub struct LandmarkBridge {
    process: Child,
    stdout_reader: BufReader<ChildStdout>,
    min_confidence: f32,
}

impl LandmarkBridge {
    /// Start the helper script and wait for its ready signal
    pub fn spawn(script: &Path, min_confidence: f32) -> io::Result<Self> {
        if !script.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("hand landmark helper not found at {:?}", script),
            ));
        }

        let python = python_interpreter();
        info!("Starting hand landmark helper: {} {:?}", python.display(), script);

        let mut process = Command::new(&python)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdout = process.stdout.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "helper stdout unavailable")
        })?;
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("helper did not signal ready, got: {}", ready_line.trim()),
            ));
        }

        info!("Hand landmark helper ready");

        Ok(Self {
            process,
            stdout_reader,
            min_confidence,
        })
    }
}

// Prefer a local virtualenv interpreter when one exists
fn python_interpreter() -> PathBuf {
    let venv = Path::new(".venv/bin/python");
    if venv.exists() {
        venv.to_path_buf()
    } else {
        PathBuf::from("python3")
    }
}

impl HandLandmarker for LandmarkBridge {
    fn detect(&mut self, image: &RgbImage) -> io::Result<Option<HandDetection>> {
        let width = image.width();
        let height = image.height();
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let stdin = self.process.stdin.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "helper stdin unavailable")
        })?;

        stdin.write_all(&width.to_le_bytes())?;
        stdin.write_all(&height.to_le_bytes())?;
        stdin.write_all(&3u32.to_le_bytes())?;
        stdin.write_all(image.as_raw())?;
        stdin.flush()?;

        let mut response = String::new();
        self.stdout_reader.read_line(&mut response)?;

        let result: DetectionResult = serde_json::from_str(&response).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("bad helper response ({}): {}", e, response.trim()),
            )
        })?;

        if let Some(error) = result.error {
            warn!("Hand landmark helper error: {}", error);
            return Ok(None);
        }

        // Accept the first hand that clears the confidence threshold
        for hand in result.hands {
            if hand.score < self.min_confidence {
                continue;
            }
            if hand.landmarks.len() != HAND_LANDMARK_COUNT {
                warn!(
                    "Expected {} landmarks, got {}",
                    HAND_LANDMARK_COUNT,
                    hand.landmarks.len()
                );
                continue;
            }

            let mut keypoints = [Keypoint::default(); HAND_LANDMARK_COUNT];
            for (i, lm) in hand.landmarks.iter().enumerate() {
                keypoints[i] = Keypoint { x: lm.x, y: lm.y };
            }

            debug!(
                "Hand detected (confidence={:.2}), wrist=({:.3},{:.3})",
                hand.score, keypoints[0].x, keypoints[0].y
            );

            return Ok(Some(HandDetection {
                keypoints,
                confidence: hand.score,
            }));
        }

        Ok(None)
    }
}

impl Drop for LandmarkBridge {
    fn drop(&mut self) {
        // Closing stdin tells the helper to exit; reap it so no zombie is left
        drop(self.process.stdin.take());
        let _ = self.process.wait();
    }
}
