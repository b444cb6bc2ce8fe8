//! Tool: capture_photo. Take a still image from a camera.

use base64::Engine;
use serde_json::{json, Value};

use webcam::{CaptureOptions, CapturePayload, ImageFormat, ReturnType, WebcamResult};

use super::args::Arguments;
use super::ToolContext;
use crate::types::{ToolCallResult, ToolContent, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "capture_photo".to_string(),
        description: Some("Capture a photo from the webcam".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "width": {
                    "type": "integer",
                    "description": "Image width in pixels",
                    "minimum": 320,
                    "maximum": 3840,
                    "default": 1280
                },
                "height": {
                    "type": "integer",
                    "description": "Image height in pixels",
                    "minimum": 240,
                    "maximum": 2160,
                    "default": 720
                },
                "quality": {
                    "type": "integer",
                    "description": "JPEG quality (1-100)",
                    "minimum": 1,
                    "maximum": 100,
                    "default": 85
                },
                "format": {
                    "type": "string",
                    "enum": ImageFormat::NAMES,
                    "default": "jpeg"
                },
                "return_type": {
                    "type": "string",
                    "enum": ReturnType::NAMES,
                    "description": "Return the file path, the raw image, or base64 text",
                    "default": "location"
                },
                "device": {
                    "type": "string",
                    "description": "Camera device ID (defaults to the selected camera)"
                }
            }
        }),
    }
}

pub(crate) fn parse(raw: &Value) -> WebcamResult<CaptureOptions> {
    let args = Arguments::new(raw)?;
    let defaults = CaptureOptions::default();

    Ok(CaptureOptions {
        width: args.integer("width", 320, 3840)?.map_or(defaults.width, |v| v as u32),
        height: args.integer("height", 240, 2160)?.map_or(defaults.height, |v| v as u32),
        quality: args.integer("quality", 1, 100)?.map_or(defaults.quality, |v| v as u8),
        format: args.choice("format", ImageFormat::NAMES)?.unwrap_or(defaults.format),
        return_type: args
            .choice("return_type", ReturnType::NAMES)?
            .unwrap_or(defaults.return_type),
        device: args.string("device")?.map(str::to_string),
    })
}

pub async fn execute(args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let options = parse(&args)?;

    let plan = {
        let session = ctx.session.lock().await;
        session.plan_capture(options)?
    };
    let outcome = plan.execute().await?;

    let mut summary = json!({
        "success": true,
        "format": outcome.format,
        "timestamp": outcome.timestamp.to_rfc3339(),
        "path": outcome.path.display().to_string(),
        "size_bytes": outcome.size_bytes,
    });
    if let Some((width, height)) = outcome.dimensions {
        summary["dimensions"] = json!({ "width": width, "height": height });
    }

    let result = ToolCallResult::json(&summary);
    Ok(match outcome.payload {
        CapturePayload::Location(_) => result,
        CapturePayload::Base64(text) => result.with_content(ToolContent::Text { text }),
        CapturePayload::Buffer(bytes) => result.with_content(ToolContent::Image {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: outcome.format.mime_type().to_string(),
        }),
    })
}
