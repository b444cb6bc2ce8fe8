//! Webcam core library: camera backends, capture, recording command lines and preferences.

pub mod capture;
pub mod command;
pub mod media;
pub mod platform;
pub mod settings;
pub mod storage;
pub mod types;

pub use capture::CapturePlan;
pub use command::{CaptureCommand, CommandLine, InputFormat, RecordingCommand};
pub use media::{list_media, CAPTURE_EXTENSIONS, RECORDING_EXTENSIONS};
pub use platform::{CameraBackend, Platform, UnsupportedBackend};
pub use settings::{CameraSettings, SettingControl};
pub use storage::{Preferences, PreferencesStore, PREFERENCES_FILE};
pub use types::*;
