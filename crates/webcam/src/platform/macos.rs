//! AVFoundation backend. macOS has no command-line control interface, so
//! settings are read-only "not available".

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use super::{ffmpeg_capture, ffmpeg_recording, CameraBackend, Platform};
use crate::command::{run_command, spawn_error, CommandLine, InputFormat};
use crate::settings::{CameraSettings, SettingControl};
use crate::types::{CameraDescriptor, CaptureOptions, RecordingOptions, WebcamError, WebcamResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct MacosBackend;

/// Parse the stderr of `ffmpeg -f avfoundation -list_devices true -i ""`.
///
/// Only the video section is read and screen-capture inputs are skipped.
/// Ids are the bracketed indices, which are what `-i <index>` accepts.
pub fn parse_avfoundation_devices(stderr: &str) -> Vec<CameraDescriptor> {
    let mut cameras = Vec::new();
    let mut in_video = false;

    for line in stderr.lines() {
        if line.contains("AVFoundation video devices:") {
            in_video = true;
            continue;
        }
        if line.contains("AVFoundation audio devices:") {
            in_video = false;
            continue;
        }
        if !in_video {
            continue;
        }

        let Some(start) = line.find("] [") else {
            continue;
        };
        let rest = &line[start + 3..];
        let Some((index, name)) = rest.split_once(']') else {
            continue;
        };
        let (index, name) = (index.trim(), name.trim());
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) || name.is_empty() {
            continue;
        }
        if name.starts_with("Capture screen") {
            continue;
        }
        cameras.push(CameraDescriptor::new(index, name, None));
    }
    cameras
}

/// Parse `system_profiler SPCameraDataType -json`.
///
/// Ids are positions in this listing. AVFoundation does not promise the same
/// order, so these ids are only a fallback for when ffmpeg cannot list
/// devices; the entries otherwise just supply locations by name.
pub fn parse_system_profiler(json: &str) -> WebcamResult<Vec<CameraDescriptor>> {
    let root: Value = serde_json::from_str(json)?;
    let entries = root
        .get("SPCameraDataType")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let name = entry
                .get("_name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Camera {index}"));
            let location = entry
                .get("spcamera_model-id")
                .or_else(|| entry.get("spcamera_unique-id"))
                .and_then(Value::as_str)
                .map(str::to_string);
            CameraDescriptor::new(index.to_string(), name, location)
        })
        .collect())
}

impl MacosBackend {
    async fn profile_cameras(&self) -> WebcamResult<Vec<CameraDescriptor>> {
        let line = CommandLine::new("system_profiler").args(["SPCameraDataType", "-json"]);
        let output = run_command(&line).await?;
        parse_system_profiler(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Copy locations from the profiler entries onto ffmpeg's list by name.
fn with_locations(listed: Vec<CameraDescriptor>, profiled: &[CameraDescriptor]) -> Vec<CameraDescriptor> {
    listed
        .into_iter()
        .map(|mut camera| {
            camera.location = profiled
                .iter()
                .find(|p| p.name == camera.name)
                .and_then(|p| p.location.clone());
            camera
        })
        .collect()
}

#[async_trait]
impl CameraBackend for MacosBackend {
    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    fn default_device(&self) -> String {
        "0".to_string()
    }

    async fn enumerate_cameras(&self) -> Vec<CameraDescriptor> {
        let profiled = self.profile_cameras().await;

        // The listing always exits non-zero because "" is not a device.
        let line = CommandLine::new("ffmpeg")
            .args(["-hide_banner", "-f", "avfoundation", "-list_devices", "true", "-i", ""]);
        let listed = match line.to_command().output().await {
            Ok(output) => parse_avfoundation_devices(&String::from_utf8_lossy(&output.stderr)),
            Err(e) => {
                tracing::warn!("ffmpeg device listing failed: {}", spawn_error(&line.program, e));
                Vec::new()
            }
        };

        if !listed.is_empty() {
            return with_locations(listed, profiled.as_deref().unwrap_or_default());
        }
        match profiled {
            Ok(cameras) if !cameras.is_empty() => {
                tracing::warn!("Using system_profiler order for camera indices");
                cameras
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::warn!("Camera enumeration failed, using default device: {}", e);
                self.fallback_cameras()
            }
        }
    }

    async fn read_settings(&self, _device: &str) -> Option<CameraSettings> {
        None
    }

    async fn write_control(&self, _device: &str, _control: SettingControl, _value: i32) -> WebcamResult<()> {
        Err(WebcamError::PlatformUnsupported(
            "Platform not fully supported for camera settings".to_string(),
        ))
    }

    fn capture_command(&self, device: &str, options: &CaptureOptions, output: &Path) -> WebcamResult<CommandLine> {
        Ok(ffmpeg_capture(InputFormat::AvFoundation, device, options, output))
    }

    fn recording_command(&self, device: &str, options: &RecordingOptions, output: &Path) -> WebcamResult<CommandLine> {
        Ok(ffmpeg_recording(InputFormat::AvFoundation, device, options, output))
    }

    fn open_url_command(&self, url: &str) -> WebcamResult<CommandLine> {
        Ok(CommandLine::new("open").arg(url))
    }
}
