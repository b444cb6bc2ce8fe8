//! Tool: select_camera. Open the browser camera picker.

use serde_json::{json, Value};

use webcam::WebcamResult;

use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "select_camera".to_string(),
        description: Some("Open camera selection UI to choose from available cameras".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub async fn execute(_args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let launch = ctx.picker.open().await?;
    let expires_in = launch.expires_in.as_secs();

    let message = if launch.reopened {
        "Camera selection UI reopened in your browser".to_string()
    } else {
        format!(
            "Camera selection UI opened in your browser at {}. It stays open for {expires_in} seconds.",
            launch.url
        )
    };

    Ok(ToolCallResult::json(&json!({
        "success": true,
        "url": launch.url,
        "expires_in_secs": expires_in,
        "browser_opened": launch.browser_opened,
        "message": message,
    })))
}
