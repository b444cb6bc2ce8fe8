//! Tool registration and dispatch.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::{Map, Value};

use webcam::{WebcamError, WebcamResult};

use super::{
    capture_photo, get_camera_settings, get_current_camera, list_cameras, select_camera,
    set_camera_settings, start_recording, stop_recording, ToolContext,
};
use crate::types::{ToolCallResult, ToolDefinition};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            capture_photo::definition(),
            start_recording::definition(),
            stop_recording::definition(),
            list_cameras::definition(),
            get_camera_settings::definition(),
            set_camera_settings::definition(),
            select_camera::definition(),
            get_current_camera::definition(),
        ]
    }

    /// Run a tool. Never fails: unknown names, invalid arguments, handler
    /// errors and panics all come back as error-flagged results.
    pub async fn call(name: &str, arguments: Option<Value>, ctx: &ToolContext) -> ToolCallResult {
        let args = arguments.unwrap_or_else(|| Value::Object(Map::new()));

        match AssertUnwindSafe(Self::dispatch(name, args, ctx)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                tracing::debug!(tool = name, kind = err.kind(), "Tool failed: {err}");
                ToolCallResult::failure(&err)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = name, "Tool panicked: {message}");
                ToolCallResult::failure(&WebcamError::Internal(message))
            }
        }
    }

    async fn dispatch(name: &str, args: Value, ctx: &ToolContext) -> WebcamResult<ToolCallResult> {
        match name {
            "capture_photo" => capture_photo::execute(args, ctx).await,
            "start_recording" => start_recording::execute(args, ctx).await,
            "stop_recording" => stop_recording::execute(args, ctx).await,
            "list_cameras" => list_cameras::execute(args, ctx).await,
            "get_camera_settings" => get_camera_settings::execute(args, ctx).await,
            "set_camera_settings" => set_camera_settings::execute(args, ctx).await,
            "select_camera" => select_camera::execute(args, ctx).await,
            "get_current_camera" => get_current_camera::execute(args, ctx).await,
            _ => Err(WebcamError::UnknownTool(name.to_string())),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_unique_and_stable() {
        let names: Vec<String> = ToolRegistry::list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "capture_photo");
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), names.len());
        assert_eq!(
            names,
            ToolRegistry::list_tools().into_iter().map(|t| t.name).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
