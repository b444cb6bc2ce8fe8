//! MCP tool implementations.

mod args;
pub mod capture_photo;
pub mod get_camera_settings;
pub mod get_current_camera;
pub mod list_cameras;
pub mod registry;
pub mod select_camera;
pub mod set_camera_settings;
pub mod start_recording;
pub mod stop_recording;

use std::sync::Arc;

use crate::picker::CameraPicker;
use crate::session::SharedSession;

pub use registry::ToolRegistry;

/// What a tool handler may touch.
#[derive(Clone)]
pub struct ToolContext {
    pub session: SharedSession,
    pub picker: Arc<CameraPicker>,
}

impl ToolContext {
    pub fn new(session: SharedSession) -> Self {
        let picker = Arc::new(CameraPicker::new(session.clone()));
        Self { session, picker }
    }
}
