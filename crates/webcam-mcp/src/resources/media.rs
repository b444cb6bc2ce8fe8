//! Resources: webcam://captures and webcam://recordings
//!
//! Both are plain file-name listings of an output directory. A directory
//! that does not exist yet lists as empty.

use webcam::{list_media, CAPTURE_EXTENSIONS, RECORDING_EXTENSIONS};

use crate::session::SharedSession;
use crate::types::{McpResult, ReadResourceResult};

use super::json_content;
use super::templates::{CAPTURES_URI, RECORDINGS_URI};

pub async fn read_captures(session: &SharedSession) -> McpResult<ReadResourceResult> {
    let dir = session.lock().await.captures_dir().to_path_buf();
    json_content(CAPTURES_URI, &list_media(&dir, CAPTURE_EXTENSIONS))
}

pub async fn read_recordings(session: &SharedSession) -> McpResult<ReadResourceResult> {
    let dir = session.lock().await.recordings_dir().to_path_buf();
    json_content(RECORDINGS_URI, &list_media(&dir, RECORDING_EXTENSIONS))
}
