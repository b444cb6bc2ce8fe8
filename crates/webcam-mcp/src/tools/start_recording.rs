//! Tool: start_recording. Begin recording video in the background.

use serde_json::{json, Value};

use webcam::{RecordingOptions, VideoContainer, WebcamError, WebcamResult};

use super::args::Arguments;
use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "start_recording".to_string(),
        description: Some("Start recording video from the webcam".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "duration": {
                    "type": "integer",
                    "description": "Recording duration in seconds",
                    "minimum": 1,
                    "maximum": 3600,
                    "default": 30
                },
                "fps": {
                    "type": "integer",
                    "description": "Frames per second",
                    "minimum": 1,
                    "maximum": 60,
                    "default": 30
                },
                "format": {
                    "type": "string",
                    "enum": VideoContainer::NAMES,
                    "description": "Video container",
                    "default": "mp4"
                },
                "codec": {
                    "type": "string",
                    "description": "Video codec passed to the encoder (e.g. libx264, libx265)",
                    "default": "libx264"
                }
            }
        }),
    }
}

pub(crate) fn parse(raw: &Value) -> WebcamResult<RecordingOptions> {
    let args = Arguments::new(raw)?;
    let defaults = RecordingOptions::default();

    let codec = match args.string("codec")? {
        Some(codec) if codec.trim().is_empty() => {
            return Err(WebcamError::invalid("codec", "must not be empty"));
        }
        Some(codec) => codec.trim().to_string(),
        None => defaults.codec,
    };

    Ok(RecordingOptions {
        duration_secs: args
            .integer("duration", 1, 3600)?
            .map_or(defaults.duration_secs, |v| v as u32),
        fps: args.integer("fps", 1, 60)?.map_or(defaults.fps, |v| v as u32),
        format: args.choice("format", VideoContainer::NAMES)?.unwrap_or(defaults.format),
        codec,
    })
}

pub async fn execute(args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let options = parse(&args)?;
    let info = ctx.session.lock().await.start_recording(options)?;

    Ok(ToolCallResult::json(&json!({
        "success": true,
        "id": info.id,
        "filename": info.filename,
        "path": info.path.display().to_string(),
        "duration": info.options.duration_secs,
        "fps": info.options.fps,
        "format": info.options.format,
        "codec": info.options.codec,
        "started_at": info.started_at.to_rfc3339(),
        "message": format!(
            "Recording started. It stops by itself after {} seconds, or call stop_recording.",
            info.options.duration_secs
        ),
    })))
}
