//! Per-OS camera strategies behind one trait.

mod linux;
mod macos;
mod windows;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::command::{CaptureCommand, CommandLine, InputFormat, RecordingCommand};
use crate::settings::{CameraSettings, SettingControl};
use crate::types::{CameraDescriptor, CaptureOptions, RecordingOptions, WebcamError, WebcamResult};

pub use linux::{parse_list_ctrls, parse_list_devices, LinuxBackend};
pub use macos::{parse_system_profiler, MacosBackend};
pub use windows::{parse_dshow_devices, WindowsBackend};

/// Operating system family the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other => std::env::consts::OS,
        }
    }

    pub fn backend(self) -> Arc<dyn CameraBackend> {
        match self {
            Platform::Linux => Arc::new(LinuxBackend),
            Platform::MacOs => Arc::new(MacosBackend),
            Platform::Windows => Arc::new(WindowsBackend),
            Platform::Other => Arc::new(UnsupportedBackend),
        }
    }
}

/// Device operations every platform provides.
///
/// Implementations hold no camera handles between calls; every method gets
/// the device id it works on.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    fn platform(&self) -> Platform;

    /// Device used when nothing is selected and no device is given.
    fn default_device(&self) -> String;

    /// Never fails: an enumeration error yields [`CameraBackend::fallback_cameras`].
    async fn enumerate_cameras(&self) -> Vec<CameraDescriptor>;

    /// Whatever subset of controls the device exposes, or `None` when the
    /// platform has no way to read them.
    async fn read_settings(&self, device: &str) -> Option<CameraSettings>;

    async fn write_control(&self, device: &str, control: SettingControl, value: i32) -> WebcamResult<()>;

    /// Apply supplied fields one at a time in [`SettingControl::ALL`] order.
    ///
    /// There is no rollback: on failure the fields already written stay
    /// applied and the rest are skipped.
    async fn write_settings(&self, device: &str, settings: &CameraSettings) -> WebcamResult<Vec<SettingControl>> {
        let mut applied = Vec::new();
        for (control, value) in settings.fields() {
            if let Err(err) = self.write_control(device, control, value).await {
                tracing::warn!(device, control = control.name(), "Settings write failed: {}", err);
                if applied.is_empty() {
                    return Err(err);
                }
                return Err(WebcamError::SettingsPartiallyApplied {
                    applied: applied.iter().map(|c: &SettingControl| c.name().to_string()).collect(),
                    field: control.name().to_string(),
                    reason: err.to_string(),
                });
            }
            applied.push(control);
        }
        Ok(applied)
    }

    fn capture_command(&self, device: &str, options: &CaptureOptions, output: &Path) -> WebcamResult<CommandLine>;

    fn recording_command(&self, device: &str, options: &RecordingOptions, output: &Path) -> WebcamResult<CommandLine>;

    /// Command that opens `url` in the user's browser.
    fn open_url_command(&self, url: &str) -> WebcamResult<CommandLine>;

    /// The synthetic single-camera listing used when enumeration fails.
    fn fallback_cameras(&self) -> Vec<CameraDescriptor> {
        let device = self.default_device();
        vec![CameraDescriptor::new(device.clone(), "Default Camera", Some(device))]
    }
}

pub(crate) fn ffmpeg_capture(format: InputFormat, device: &str, options: &CaptureOptions, output: &Path) -> CommandLine {
    CaptureCommand::new(format, device, output)
        .with_options(options)
        .build()
}

pub(crate) fn ffmpeg_recording(format: InputFormat, device: &str, options: &RecordingOptions, output: &Path) -> CommandLine {
    RecordingCommand::new(format, device, output)
        .with_options(options)
        .build()
}

/// Backend for operating systems without camera tooling support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedBackend;

impl UnsupportedBackend {
    fn unsupported(&self, what: &str) -> WebcamError {
        WebcamError::PlatformUnsupported(format!("{what} is not supported on {}", Platform::Other.label()))
    }
}

#[async_trait]
impl CameraBackend for UnsupportedBackend {
    fn platform(&self) -> Platform {
        Platform::Other
    }

    fn default_device(&self) -> String {
        "0".to_string()
    }

    async fn enumerate_cameras(&self) -> Vec<CameraDescriptor> {
        vec![CameraDescriptor::new(
            self.default_device(),
            "Default Camera",
            Some(Platform::Other.label().to_string()),
        )]
    }

    async fn read_settings(&self, _device: &str) -> Option<CameraSettings> {
        None
    }

    async fn write_control(&self, _device: &str, _control: SettingControl, _value: i32) -> WebcamResult<()> {
        Err(self.unsupported("Changing camera settings"))
    }

    fn capture_command(&self, _device: &str, _options: &CaptureOptions, _output: &Path) -> WebcamResult<CommandLine> {
        Err(self.unsupported("Photo capture"))
    }

    fn recording_command(&self, _device: &str, _options: &RecordingOptions, _output: &Path) -> WebcamResult<CommandLine> {
        Err(self.unsupported("Video recording"))
    }

    fn open_url_command(&self, _url: &str) -> WebcamResult<CommandLine> {
        Err(self.unsupported("Opening a browser"))
    }
}
