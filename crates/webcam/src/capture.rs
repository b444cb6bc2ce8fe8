//! Single-frame photo capture.

use std::path::{Path, PathBuf};

use base64::Engine;
use chrono::{DateTime, Utc};

use crate::command::{run_command, CommandLine};
use crate::media::timestamped_path;
use crate::platform::CameraBackend;
use crate::types::{CaptureOptions, CaptureOutcome, CapturePayload, ReturnType, WebcamError, WebcamResult};

/// A capture resolved to a device and output file, ready to run.
///
/// Planning needs the session (selected camera, captures directory);
/// running does not, so the two are split and the session is free while
/// the external process works.
#[derive(Debug, Clone)]
pub struct CapturePlan {
    pub device: String,
    pub command: CommandLine,
    pub output_path: PathBuf,
    pub options: CaptureOptions,
    pub timestamp: DateTime<Utc>,
}

impl CapturePlan {
    pub fn new(
        backend: &dyn CameraBackend,
        device: &str,
        options: CaptureOptions,
        output_dir: &Path,
    ) -> WebcamResult<Self> {
        let timestamp = Utc::now();
        let output_path = timestamped_path(output_dir, "capture", options.format.extension(), timestamp);
        Self::at_path(backend, device, options, output_path, timestamp)
    }

    /// Plan a capture into a caller-chosen file.
    pub fn at_path(
        backend: &dyn CameraBackend,
        device: &str,
        options: CaptureOptions,
        output_path: PathBuf,
        timestamp: DateTime<Utc>,
    ) -> WebcamResult<Self> {
        let command = backend.capture_command(device, &options, &output_path)?;
        Ok(Self {
            device: device.to_string(),
            command,
            output_path,
            options,
            timestamp,
        })
    }

    /// Run the capture and read the artifact back.
    pub async fn execute(self) -> WebcamResult<CaptureOutcome> {
        if let Some(parent) = self.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        run_command(&self.command).await?;

        let bytes = tokio::fs::read(&self.output_path).await.map_err(|e| {
            WebcamError::ExternalProcessFailure {
                program: self.command.program.clone(),
                reason: format!("no image written to {}: {e}", self.output_path.display()),
            }
        })?;
        if bytes.is_empty() {
            return Err(WebcamError::ExternalProcessFailure {
                program: self.command.program.clone(),
                reason: format!("empty image written to {}", self.output_path.display()),
            });
        }

        let dimensions = image::image_dimensions(&self.output_path).ok();
        tracing::info!(
            device = %self.device,
            path = %self.output_path.display(),
            bytes = bytes.len(),
            "Captured photo"
        );

        let size_bytes = bytes.len() as u64;
        let payload = match self.options.return_type {
            ReturnType::Location => CapturePayload::Location(self.output_path.clone()),
            ReturnType::Buffer => CapturePayload::Buffer(bytes),
            ReturnType::Base64 => {
                CapturePayload::Base64(base64::engine::general_purpose::STANDARD.encode(&bytes))
            }
        };

        Ok(CaptureOutcome {
            path: self.output_path,
            format: self.options.format,
            timestamp: self.timestamp,
            size_bytes,
            dimensions,
            payload,
        })
    }
}
