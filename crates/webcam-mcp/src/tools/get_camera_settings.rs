//! Tool: get_camera_settings. Read the image controls a camera exposes.

use serde_json::{json, Value};

use webcam::WebcamResult;

use super::args::Arguments;
use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_camera_settings".to_string(),
        description: Some("Get current camera settings".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "device": {
                    "type": "string",
                    "description": "Camera device ID (defaults to the selected camera)"
                }
            }
        }),
    }
}

pub async fn execute(args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let args = Arguments::new(&args)?;
    let device = args.string("device")?;

    let (device, settings) = ctx.session.lock().await.get_camera_settings(device).await?;

    Ok(ToolCallResult::json(&json!({
        "success": true,
        "device": device,
        "settings": settings,
    })))
}
