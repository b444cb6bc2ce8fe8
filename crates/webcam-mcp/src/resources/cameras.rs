//! Resource: webcam://cameras

use crate::session::SharedSession;
use crate::types::{McpResult, ReadResourceResult};

use super::templates::CAMERAS_URI;
use super::json_content;

pub async fn read_cameras(session: &SharedSession) -> McpResult<ReadResourceResult> {
    let cameras = session.lock().await.list_cameras().await;
    json_content(CAMERAS_URI, &cameras)
}
