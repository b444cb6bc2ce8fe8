//! DirectShow backend, enumerating through ffmpeg's device listing.

use std::path::Path;

use async_trait::async_trait;

use super::{ffmpeg_capture, ffmpeg_recording, CameraBackend, Platform};
use crate::command::{spawn_error, CommandLine, InputFormat};
use crate::settings::{CameraSettings, SettingControl};
use crate::types::{CameraDescriptor, CaptureOptions, RecordingOptions, WebcamError, WebcamResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsBackend;

fn quoted(line: &str) -> Option<&str> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')? + start + 1;
    Some(&line[start + 1..end])
}

/// Parse the stderr of `ffmpeg -list_devices true -f dshow -i dummy`.
///
/// Handles both the tagged layout (`"Name" (video)`) and the older layout
/// with "DirectShow video devices" section headers.
pub fn parse_dshow_devices(stderr: &str) -> Vec<CameraDescriptor> {
    let mut cameras: Vec<CameraDescriptor> = Vec::new();
    let mut in_video_section = false;
    let mut last_was_video = false;

    for line in stderr.lines() {
        if line.contains("DirectShow video devices") {
            in_video_section = true;
            continue;
        }
        if line.contains("DirectShow audio devices") {
            in_video_section = false;
            continue;
        }
        if line.contains("Alternative name") {
            if last_was_video {
                if let (Some(alt), Some(camera)) = (quoted(line), cameras.last_mut()) {
                    camera.location = Some(alt.to_string());
                }
            }
            continue;
        }
        let Some(name) = quoted(line) else {
            continue;
        };
        let is_video = if line.contains("(video)") {
            true
        } else if line.contains("(audio)") {
            false
        } else {
            in_video_section
        };
        last_was_video = is_video;
        if is_video {
            cameras.push(CameraDescriptor::new(name, name, None));
        }
    }

    cameras
}

#[async_trait]
impl CameraBackend for WindowsBackend {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn default_device(&self) -> String {
        "Default Camera".to_string()
    }

    async fn enumerate_cameras(&self) -> Vec<CameraDescriptor> {
        // The listing always exits non-zero because "dummy" is not a device.
        let line = CommandLine::new("ffmpeg").args(["-hide_banner", "-list_devices", "true", "-f", "dshow", "-i", "dummy"]);
        match line.to_command().output().await {
            Ok(output) => parse_dshow_devices(&String::from_utf8_lossy(&output.stderr)),
            Err(e) => {
                tracing::warn!(
                    "Camera enumeration failed, using default device: {}",
                    spawn_error(&line.program, e)
                );
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
        Ok(ffmpeg_capture(InputFormat::DShow, device, options, output))
    }

    fn recording_command(&self, device: &str, options: &RecordingOptions, output: &Path) -> WebcamResult<CommandLine> {
        Ok(ffmpeg_recording(InputFormat::DShow, device, options, output))
    }

    fn open_url_command(&self, url: &str) -> WebcamResult<CommandLine> {
        // The empty string is the window title argument of `start`.
        Ok(CommandLine::new("cmd").args(["/C", "start", "", url]))
    }
}
