//! Tool: list_cameras. Enumerate the cameras the platform reports.

use serde_json::{json, Value};

use webcam::WebcamResult;

use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_cameras".to_string(),
        description: Some("List all available camera devices".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub async fn execute(_args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let cameras = ctx.session.lock().await.list_cameras().await;

    let mut result = json!({
        "success": true,
        "count": cameras.len(),
        "cameras": &cameras,
    });
    if cameras.is_empty() {
        result["message"] = json!(
            "No cameras found. Make sure you have a webcam connected and proper drivers installed."
        );
    }
    Ok(ToolCallResult::json(&result))
}
