//! Core data types for cameras, captures, and recordings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A camera as reported by the platform at enumeration time.
///
/// Descriptors are never cached: cameras can be hot-plugged, so every listing
/// asks the platform again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    /// Platform-specific handle (`/dev/video0`, an AVFoundation index, a DirectShow name).
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CameraDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
        }
    }
}

/// Still image output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
    Bmp,
}

impl ImageFormat {
    pub const NAMES: &'static [&'static str] = &["jpeg", "png", "bmp"];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// How a captured photo is handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    /// Path of the file left in the captures directory.
    #[default]
    Location,
    /// Raw image bytes.
    Buffer,
    /// Base64 text of the image bytes.
    Base64,
}

impl ReturnType {
    pub const NAMES: &'static [&'static str] = &["location", "buffer", "base64"];

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnType::Location => "location",
            ReturnType::Buffer => "buffer",
            ReturnType::Base64 => "base64",
        }
    }
}

/// Video container for recordings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    #[default]
    Mp4,
    Avi,
    Mkv,
}

impl VideoContainer {
    pub const NAMES: &'static [&'static str] = &["mp4", "avi", "mkv"];

    pub fn as_str(self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Avi => "avi",
            VideoContainer::Mkv => "mkv",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

macro_rules! impl_name_parsing {
    ($ty:ty, $($name:literal => $variant:expr),+ $(,)?) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(format!(
                        "'{other}' is not one of: {}",
                        <$ty>::NAMES.join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_name_parsing!(ImageFormat, "jpeg" => ImageFormat::Jpeg, "jpg" => ImageFormat::Jpeg, "png" => ImageFormat::Png, "bmp" => ImageFormat::Bmp);
impl_name_parsing!(ReturnType, "location" => ReturnType::Location, "buffer" => ReturnType::Buffer, "base64" => ReturnType::Base64);
impl_name_parsing!(VideoContainer, "mp4" => VideoContainer::Mp4, "avi" => VideoContainer::Avi, "mkv" => VideoContainer::Mkv);

/// Parameters of a single photo capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOptions {
    pub width: u32,
    pub height: u32,
    /// 1–100, only meaningful for JPEG.
    pub quality: u8,
    pub format: ImageFormat,
    pub return_type: ReturnType,
    /// Explicit device; `None` means selected camera, then platform default.
    pub device: Option<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            quality: 85,
            format: ImageFormat::Jpeg,
            return_type: ReturnType::Location,
            device: None,
        }
    }
}

/// Parameters of a video recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingOptions {
    /// Enforced by the encoder process itself (`-t`).
    pub duration_secs: u32,
    pub fps: u32,
    pub format: VideoContainer,
    pub codec: String,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            fps: 30,
            format: VideoContainer::Mp4,
            codec: "libx264".to_string(),
        }
    }
}

/// The captured image, in the encoding the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturePayload {
    Location(PathBuf),
    Buffer(Vec<u8>),
    Base64(String),
}

/// Result of one successful photo capture.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub timestamp: DateTime<Utc>,
    pub size_bytes: u64,
    /// Read back from the file header when the format is decodable.
    pub dimensions: Option<(u32, u32)>,
    pub payload: CapturePayload,
}

/// Errors that can occur while driving cameras.
#[derive(thiserror::Error, Debug)]
pub enum WebcamError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {field} {constraint}")]
    InvalidArguments { field: String, constraint: String },

    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Device busy: {0}")]
    DeviceBusy(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Platform not supported: {0}")]
    PlatformUnsupported(String),

    #[error("{program} failed: {reason}")]
    ExternalProcessFailure { program: String, reason: String },

    #[error(
        "Settings partially applied (applied: {}); failed on {field}: {reason}",
        .applied.join(", ")
    )]
    SettingsPartiallyApplied {
        applied: Vec<String>,
        field: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebcamError {
    pub fn invalid(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        WebcamError::InvalidArguments {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            WebcamError::UnknownTool(_) => "unknown_tool",
            WebcamError::InvalidArguments { .. } => "invalid_arguments",
            WebcamError::AlreadyRecording => "already_recording",
            WebcamError::NotRecording => "not_recording",
            WebcamError::DeviceBusy(_) => "device_busy",
            WebcamError::DeviceUnavailable(_) => "device_unavailable",
            WebcamError::PlatformUnsupported(_) => "platform_unsupported",
            WebcamError::ExternalProcessFailure { .. } => "external_process_failure",
            WebcamError::SettingsPartiallyApplied { .. } => "settings_partially_applied",
            WebcamError::Io(_) => "io",
            WebcamError::Json(_) => "json",
            WebcamError::Internal(_) => "internal",
        }
    }
}

/// Convenience result type.
pub type WebcamResult<T> = Result<T, WebcamError>;
