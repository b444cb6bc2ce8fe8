//! Tool: set_camera_settings. Change some image controls, leave the rest.

use serde_json::{json, Map, Value};

use webcam::{CameraSettings, SettingControl, WebcamResult};

use super::args::Arguments;
use super::ToolContext;
use crate::types::{ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    let mut properties = Map::new();
    properties.insert(
        "device".to_string(),
        json!({
            "type": "string",
            "description": "Camera device ID (defaults to the selected camera)"
        }),
    );
    for control in SettingControl::ALL {
        let range = control.range();
        properties.insert(
            control.name().to_string(),
            json!({
                "type": "integer",
                "description": control.description(),
                "minimum": range.start(),
                "maximum": range.end()
            }),
        );
    }

    ToolDefinition {
        name: "set_camera_settings".to_string(),
        description: Some(
            "Adjust camera settings like brightness, contrast, etc. Only the supplied fields change."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": properties
        }),
    }
}

pub(crate) fn parse(raw: &Value) -> WebcamResult<(Option<String>, CameraSettings)> {
    let args = Arguments::new(raw)?;
    let device = args.string("device")?.map(str::to_string);

    let mut settings = CameraSettings::default();
    for control in SettingControl::ALL {
        let range = control.range();
        if let Some(value) = args.integer(control.name(), i64::from(*range.start()), i64::from(*range.end()))? {
            settings.set(control, control.check(value)?);
        }
    }
    Ok((device, settings))
}

pub async fn execute(args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
    let (device, settings) = parse(&args)?;

    if settings.is_empty() {
        return Ok(ToolCallResult::json(&json!({
            "success": true,
            "message": "No settings provided to change.",
        })));
    }

    let (device, applied) = ctx
        .session
        .lock()
        .await
        .set_camera_settings(device.as_deref(), &settings)
        .await?;

    let applied: Map<String, Value> = applied
        .into_iter()
        .filter_map(|c| settings.get(c).map(|v| (c.name().to_string(), json!(v))))
        .collect();

    Ok(ToolCallResult::json(&json!({
        "success": true,
        "device": device,
        "applied": applied,
    })))
}
