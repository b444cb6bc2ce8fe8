//! The device session: selected camera, recording lifecycle, and the entry
//! points every tool goes through.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use webcam::media::timestamped_path;
use webcam::{
    CameraBackend, CameraDescriptor, CameraSettings, CaptureOptions, CapturePlan, ImageFormat,
    Preferences, PreferencesStore, RecordingOptions, ReturnType, SettingControl, WebcamError,
    WebcamResult,
};

use super::recording::{ActiveRecording, RecordingInfo};
use crate::config::ServerConfig;

/// Preview frames for the camera picker.
const PREVIEW_WIDTH: u32 = 640;
const PREVIEW_HEIGHT: u32 = 480;
const PREVIEW_QUALITY: u8 = 70;

/// Coarse state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

enum RecordingState {
    Idle,
    Recording(ActiveRecording),
}

/// Single owner of the selected camera and the active recording.
///
/// Shared behind one mutex by the transport and the camera picker. Every
/// method that looks at the recording first reaps a finished recorder, so
/// an exit report can never slip between a state check and a state write.
pub struct DeviceSession {
    backend: Arc<dyn CameraBackend>,
    captures_dir: PathBuf,
    recordings_dir: PathBuf,
    preferences: PreferencesStore,
    selected_camera: Option<String>,
    recording: RecordingState,
}

impl DeviceSession {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        captures_dir: impl Into<PathBuf>,
        recordings_dir: impl Into<PathBuf>,
        preferences: PreferencesStore,
    ) -> Self {
        let selected_camera = preferences.load().selected_camera;
        if let Some(camera) = &selected_camera {
            tracing::info!("Loaded selected camera: {camera}");
        }

        Self {
            backend,
            captures_dir: captures_dir.into(),
            recordings_dir: recordings_dir.into(),
            preferences,
            selected_camera,
            recording: RecordingState::Idle,
        }
    }

    /// Open the session for a configured data directory.
    pub fn open(config: &ServerConfig, backend: Arc<dyn CameraBackend>) -> Self {
        config.ensure_directories();
        tracing::info!(
            platform = backend.platform().label(),
            data_dir = %config.data_dir.display(),
            "Opening device session"
        );
        Self::new(
            backend,
            &config.captures_dir,
            &config.recordings_dir,
            PreferencesStore::new(&config.preferences_path),
        )
    }

    pub fn backend(&self) -> Arc<dyn CameraBackend> {
        Arc::clone(&self.backend)
    }

    pub fn captures_dir(&self) -> &Path {
        &self.captures_dir
    }

    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    // ── Selection ──────────────────────────────────────────────────

    pub fn selected_camera(&self) -> Option<&str> {
        self.selected_camera.as_deref()
    }

    /// Persist the selection, then adopt it. A failed write leaves the
    /// previous selection in place.
    pub fn select_camera(&mut self, camera_id: &str) -> WebcamResult<()> {
        let camera_id = camera_id.trim();
        if camera_id.is_empty() {
            return Err(WebcamError::invalid("cameraId", "must not be empty"));
        }

        self.preferences.save(&Preferences {
            selected_camera: Some(camera_id.to_string()),
        })?;
        self.selected_camera = Some(camera_id.to_string());
        tracing::info!("Selected camera: {camera_id}");
        Ok(())
    }

    /// Explicit device, then selected camera, then the platform default.
    pub fn resolve_device(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.selected_camera.clone())
            .unwrap_or_else(|| self.backend.default_device())
    }

    pub async fn list_cameras(&self) -> Vec<CameraDescriptor> {
        self.backend.enumerate_cameras().await
    }

    // ── Capture ────────────────────────────────────────────────────

    /// Resolve a capture into a runnable plan. Running it does not need the
    /// session, so callers release the lock before [`CapturePlan::execute`].
    pub fn plan_capture(&self, options: CaptureOptions) -> WebcamResult<CapturePlan> {
        let device = self.resolve_device(options.device.as_deref());
        CapturePlan::new(self.backend.as_ref(), &device, options, &self.captures_dir)
    }

    /// Small JPEG of `device` written outside the captures directory. Each
    /// frame gets its own file since the picker serves requests concurrently.
    pub fn plan_preview(&self, device: &str) -> WebcamResult<CapturePlan> {
        let options = CaptureOptions {
            width: PREVIEW_WIDTH,
            height: PREVIEW_HEIGHT,
            quality: PREVIEW_QUALITY,
            format: ImageFormat::Jpeg,
            return_type: ReturnType::Buffer,
            device: Some(device.to_string()),
        };
        let file = format!("preview_{}.{}", uuid::Uuid::new_v4(), options.format.extension());
        let path = std::env::temp_dir().join("webcam-mcp-previews").join(file);
        CapturePlan::at_path(self.backend.as_ref(), device, options, path, Utc::now())
    }

    // ── Settings ───────────────────────────────────────────────────

    pub async fn get_camera_settings(&self, device: Option<&str>) -> WebcamResult<(String, CameraSettings)> {
        let device = self.resolve_device(device);
        match self.backend.read_settings(&device).await {
            Some(settings) => Ok((device, settings)),
            None => Err(WebcamError::DeviceUnavailable(
                "Camera settings are not available for this device".to_string(),
            )),
        }
    }

    /// Write only the supplied fields; the rest keep their device value.
    pub async fn set_camera_settings(
        &self,
        device: Option<&str>,
        settings: &CameraSettings,
    ) -> WebcamResult<(String, Vec<SettingControl>)> {
        settings.validate()?;
        let device = self.resolve_device(device);
        let applied = self.backend.write_settings(&device, settings).await?;
        tracing::info!(device = %device, count = applied.len(), "Camera settings applied");
        Ok((device, applied))
    }

    // ── Recording ──────────────────────────────────────────────────

    fn reap_finished(&mut self) {
        if let RecordingState::Recording(active) = &mut self.recording {
            if active.has_exited() {
                self.recording = RecordingState::Idle;
            }
        }
    }

    pub fn state(&mut self) -> SessionState {
        self.reap_finished();
        match self.recording {
            RecordingState::Idle => SessionState::Idle,
            RecordingState::Recording(_) => SessionState::Recording,
        }
    }

    pub fn is_recording(&mut self) -> bool {
        self.state() == SessionState::Recording
    }

    pub fn recording_status(&mut self) -> Option<RecordingInfo> {
        self.reap_finished();
        match &self.recording {
            RecordingState::Recording(active) => Some(active.info()),
            RecordingState::Idle => None,
        }
    }

    /// Spawn a recorder for the selected (or default) camera and return
    /// without waiting for it. The duration is enforced by the recorder.
    pub fn start_recording(&mut self, options: RecordingOptions) -> WebcamResult<RecordingInfo> {
        self.reap_finished();
        if let RecordingState::Recording(_) = self.recording {
            return Err(WebcamError::AlreadyRecording);
        }

        let device = self.resolve_device(None);
        std::fs::create_dir_all(&self.recordings_dir)?;
        let output_path = timestamped_path(
            &self.recordings_dir,
            "recording",
            options.format.extension(),
            Utc::now(),
        );
        let line = self.backend.recording_command(&device, &options, &output_path)?;

        let active = ActiveRecording::spawn(&line, output_path, options)?;
        let info = active.info();
        self.recording = RecordingState::Recording(active);
        Ok(info)
    }

    /// Signal the recorder and go idle at once; the recorder finalizes its
    /// file on its own.
    pub fn stop_recording(&mut self) -> WebcamResult<RecordingInfo> {
        self.reap_finished();
        match std::mem::replace(&mut self.recording, RecordingState::Idle) {
            RecordingState::Idle => Err(WebcamError::NotRecording),
            RecordingState::Recording(mut active) => {
                let info = active.info();
                active.request_stop();
                tracing::info!(id = %active.id(), elapsed = info.elapsed_secs, "Recording stop requested");
                Ok(info)
            }
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        if let RecordingState::Recording(active) = &mut self.recording {
            if !active.has_exited() {
                tracing::info!(id = %active.id(), "Stopping recording on shutdown");
                active.interrupt_blocking();
            }
        }
    }
}
