use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::StorageError;
use crate::models::recording_result::RecordingMetadata;

/// Path of the JSON sidecar for a recording: `{recording_path}.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    let mut name = recording_path.as_os_str().to_owned();
    name.push(".metadata.json");
    PathBuf::from(name)
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(metadata).map_err(|e| StorageError::Serialize(e.to_string()))?;
    fs::write(metadata_path(recording_path), json).map_err(|e| StorageError::Io(e.to_string()))?;
    Ok(())
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, StorageError> {
    let json = fs::read_to_string(metadata_path(recording_path)).map_err(|e| StorageError::Io(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| StorageError::Serialize(e.to_string()))
}
