//! Tool: get_current_camera. Report the persisted camera selection.

use serde_json::{json, Value};

use webcam::WebcamResult;

use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_current_camera".to_string(),
        description: Some("Get the currently selected camera".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub async fn execute(_args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let session = ctx.session.lock().await;

    let result = match session.selected_camera() {
        Some(camera) => json!({
            "success": true,
            "selected": camera,
            "message": format!("Current camera: {camera}"),
        }),
        None => json!({
            "success": true,
            "selected": null,
            "message": "No camera currently selected. Use the select_camera tool to choose one.",
        }),
    };
    Ok(ToolCallResult::json(&result))
}
