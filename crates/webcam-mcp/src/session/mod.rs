//! Device session state shared by the transport and the camera picker.

pub mod manager;
pub mod recording;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use manager::{DeviceSession, SessionState};
pub use recording::{RecordingInfo, STOP_GRACE};

/// The one session instance, shared by every access path.
pub type SharedSession = Arc<Mutex<DeviceSession>>;

pub fn shared(session: DeviceSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}
