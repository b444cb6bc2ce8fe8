//! Video4Linux backend driven through `v4l2-ctl` and `ffmpeg`.

use std::path::Path;

use async_trait::async_trait;

use super::{ffmpeg_capture, ffmpeg_recording, CameraBackend, Platform};
use crate::command::{run_command, CommandLine, InputFormat};
use crate::settings::{CameraSettings, SettingControl};
use crate::types::{CameraDescriptor, CaptureOptions, RecordingOptions, WebcamError, WebcamResult};

const DEFAULT_DEVICE: &str = "/dev/video0";

#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxBackend;

/// V4L2 control names for a setting, preferred name first.
fn v4l2_names(control: SettingControl) -> &'static [&'static str] {
    match control {
        SettingControl::Brightness => &["brightness"],
        SettingControl::Contrast => &["contrast"],
        SettingControl::Saturation => &["saturation"],
        SettingControl::Hue => &["hue"],
        SettingControl::Gamma => &["gamma"],
        SettingControl::Sharpness => &["sharpness"],
        SettingControl::WhiteBalance => &["white_balance_temperature"],
        SettingControl::Exposure => &["exposure_time_absolute", "exposure_absolute"],
        SettingControl::Gain => &["gain"],
        SettingControl::Focus => &["focus_absolute"],
    }
}

fn control_for_v4l2_name(name: &str) -> Option<SettingControl> {
    SettingControl::ALL
        .into_iter()
        .find(|c| v4l2_names(*c).contains(&name))
}

/// Parse `v4l2-ctl --list-devices` output.
///
/// Each unindented header names a physical camera, optionally followed by its
/// bus location in parentheses; each indented `/dev/video*` node under it
/// becomes one descriptor.
pub fn parse_list_devices(output: &str) -> Vec<CameraDescriptor> {
    let mut cameras = Vec::new();
    let mut name = String::new();
    let mut location = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            let header = line.trim().trim_end_matches(':');
            match (header.rfind(" ("), header.ends_with(')')) {
                (Some(open), true) => {
                    name = header[..open].trim().to_string();
                    location = Some(header[open + 2..header.len() - 1].to_string());
                }
                _ => {
                    name = header.to_string();
                    location = None;
                }
            }
            continue;
        }

        let node = line.trim();
        if node.starts_with("/dev/video") {
            let display = if name.is_empty() {
                format!("Camera {}", cameras.len())
            } else {
                name.clone()
            };
            cameras.push(CameraDescriptor::new(
                node,
                display,
                Some(location.clone().unwrap_or_else(|| node.to_string())),
            ));
        }
    }

    cameras
}

/// Parse `v4l2-ctl --list-ctrls` output into the controls we know about.
pub fn parse_list_ctrls(output: &str) -> CameraSettings {
    let mut settings = CameraSettings::default();

    for line in output.lines() {
        let Some(name) = line.split_whitespace().next() else {
            continue;
        };
        let Some(control) = control_for_v4l2_name(name) else {
            continue;
        };
        let value = line
            .split_whitespace()
            .find_map(|field| field.strip_prefix("value="))
            .and_then(|v| v.parse::<i32>().ok());
        if let Some(value) = value {
            settings.set(control, value);
        }
    }

    settings
}

#[async_trait]
impl CameraBackend for LinuxBackend {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn default_device(&self) -> String {
        DEFAULT_DEVICE.to_string()
    }

    async fn enumerate_cameras(&self) -> Vec<CameraDescriptor> {
        match run_command(&CommandLine::new("v4l2-ctl").arg("--list-devices")).await {
            Ok(output) => parse_list_devices(&String::from_utf8_lossy(&output.stdout)),
            Err(e) => {
                tracing::warn!("Camera enumeration failed, using default device: {}", e);
                self.fallback_cameras()
            }
        }
    }

    async fn read_settings(&self, device: &str) -> Option<CameraSettings> {
        let line = CommandLine::new("v4l2-ctl").args(["-d", device, "--list-ctrls"]);
        match run_command(&line).await {
            Ok(output) => Some(parse_list_ctrls(&String::from_utf8_lossy(&output.stdout))),
            Err(e) => {
                tracing::warn!(device, "Reading camera controls failed: {}", e);
                None
            }
        }
    }

    async fn write_control(&self, device: &str, control: SettingControl, value: i32) -> WebcamResult<()> {
        let mut last_err = None;
        for name in v4l2_names(control) {
            let line = CommandLine::new("v4l2-ctl")
                .args(["-d", device])
                .arg(format!("--set-ctrl={name}={value}"));
            match run_command(&line).await {
                Ok(_) => {
                    tracing::debug!(device, control = *name, value, "Control written");
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| WebcamError::DeviceUnavailable(device.to_string())))
    }

    fn capture_command(&self, device: &str, options: &CaptureOptions, output: &Path) -> WebcamResult<CommandLine> {
        Ok(ffmpeg_capture(InputFormat::V4l2, device, options, output))
    }

    fn recording_command(&self, device: &str, options: &RecordingOptions, output: &Path) -> WebcamResult<CommandLine> {
        Ok(ffmpeg_recording(InputFormat::V4l2, device, options, output))
    }

    fn open_url_command(&self, url: &str) -> WebcamResult<CommandLine> {
        Ok(CommandLine::new("xdg-open").arg(url))
    }
}
