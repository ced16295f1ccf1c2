use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::config::CaptureConfig;
use crate::models::recording_result::RecordingMetadata;
use crate::storage::metadata;
use crate::traits::output_sink::OutputSink;

/// Raw PCM file sink.
///
/// ## File Format
///
/// ```text
/// [chunk 1: buffer_size bytes of 16-bit LE mono PCM]
/// [chunk 2: ...]
/// ...
/// ```
///
/// No header is written. When built `with_metadata`, closing the sink also
/// writes `{file}.metadata.json` with the sample rate, format and SHA-256
/// checksum, since players cannot recover those from the raw bytes.
pub struct FileSink {
    file_path: PathBuf,
    writer: BufWriter<File>,
    hasher: Sha256,
    bytes_written: u64,
    metadata_config: Option<CaptureConfig>,
}

impl FileSink {
    /// Create (or truncate) the file, creating parent directories as needed.
    pub fn create(file_path: impl Into<PathBuf>) -> io::Result<Self> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&file_path)?;
        log::debug!("Recording to {}", file_path.display());

        Ok(Self {
            file_path,
            writer: BufWriter::new(file),
            hasher: Sha256::new(),
            bytes_written: 0,
            metadata_config: None,
        })
    }

    /// Write a JSON metadata sidecar describing `config` on close.
    pub fn with_metadata(mut self, config: &CaptureConfig) -> Self {
        self.metadata_config = Some(config.clone());
        self
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Flush the file and write the sidecar, if any. Returns the SHA-256 hex digest.
    pub fn finish(mut self) -> io::Result<String> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;

        let checksum = hex_encode(&self.hasher.finalize());

        if let Some(config) = self.metadata_config {
            let meta = RecordingMetadata::new(
                &config,
                &self.file_path.to_string_lossy(),
                self.bytes_written,
                &checksum,
            );
            metadata::write_metadata(&meta, &self.file_path).map_err(io::Error::other)?;
        }

        Ok(checksum)
    }
}

impl OutputSink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let path = self.file_path.clone();
        let bytes = self.bytes_written;
        let checksum = (*self).finish()?;
        log::info!("Recording saved: {} ({} bytes, sha256 {})", path.display(), bytes, checksum);
        Ok(())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
