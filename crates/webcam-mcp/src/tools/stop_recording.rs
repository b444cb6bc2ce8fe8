//! Tool: stop_recording. Interrupt the active recording.

use serde_json::{json, Value};

use webcam::WebcamResult;

use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "stop_recording".to_string(),
        description: Some("Stop the current video recording".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub async fn execute(_args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let info = ctx.session.lock().await.stop_recording()?;

    Ok(ToolCallResult::json(&json!({
        "success": true,
        "id": info.id,
        "filename": info.filename,
        "path": info.path.display().to_string(),
        "elapsed_secs": info.elapsed_secs,
        "message": "Recording stopped. The file is finalized in the background.",
    })))
}
