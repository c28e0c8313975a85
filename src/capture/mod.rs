//! Capture/Export Module
//!
//! Writes a still of the measuring view to the capture directory and builds
//! the result payload handed back to the host. Every failure is folded into
//! a [`CaptureResult::Failed`] message; nothing here returns an error.

use bevy::log::{info, warn};
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::scene::{SnapshotImage, SnapshotSource};

pub const SAVED_MESSAGE: &str = "Snapshot saved successfully";
pub const CONVERT_FAILED_MESSAGE: &str = "Failed to convert image to data";

/// Disambiguates snapshots taken within the same millisecond
static SNAPSHOT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Transport-neutral capture payload.
///
/// Serializes as `{"imagePath", "message", "measures"}` on success and as
/// `{"message"}` alone on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CaptureResult {
    Saved {
        #[serde(rename = "imagePath")]
        image_path: String,
        message: String,
        measures: Vec<String>,
    },
    Failed {
        message: String,
    },
}

impl CaptureResult {
    pub fn failed(message: impl Into<String>) -> Self {
        CaptureResult::Failed {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CaptureResult::Saved { message, .. } | CaptureResult::Failed { message } => message,
        }
    }

    pub fn image_path(&self) -> Option<&str> {
        match self {
            CaptureResult::Saved { image_path, .. } => Some(image_path),
            CaptureResult::Failed { .. } => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, CaptureResult::Saved { .. })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::json!({ "message": self.message() }))
    }
}

/// File name for a new snapshot
fn snapshot_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let seq = SNAPSHOT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("snapshot_{}_{}.png", timestamp, seq)
}

/// Encode and write a snapshot into `dir`, creating the directory if needed.
pub fn write_snapshot(snapshot: SnapshotImage, dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create capture directory: {}", e))?;

    let SnapshotImage { width, height, rgba } = snapshot;
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| CONVERT_FAILED_MESSAGE.to_string())?;

    let path = dir.join(snapshot_file_name());
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| format!("Error saving snapshot: {}", e))?;
    Ok(path)
}

/// Grab a still from `source`, write it, and describe the outcome.
///
/// `measures` is the session summary at capture time.
pub fn capture(source: &mut dyn SnapshotSource, dir: &Path, measures: Vec<String>) -> CaptureResult {
    let Some(snapshot) = source.snapshot_image() else {
        warn!("Capture failed: renderer produced no image");
        return CaptureResult::failed(CONVERT_FAILED_MESSAGE);
    };

    match write_snapshot(snapshot, dir) {
        Ok(path) => {
            info!("Snapshot saved to {:?}", path);
            CaptureResult::Saved {
                image_path: path.display().to_string(),
                message: SAVED_MESSAGE.to_string(),
                measures,
            }
        }
        Err(message) => {
            warn!("Capture failed: {}", message);
            CaptureResult::failed(message)
        }
    }
}
