//! MCP resource implementations.

pub mod cameras;
pub mod media;
pub mod registry;
pub mod templates;

use serde::Serialize;

use crate::types::{McpError, McpResult, ReadResourceResult, ResourceContent};

pub use registry::ResourceRegistry;

/// A single pretty-printed JSON text content for `uri`.
fn json_content(uri: &str, value: &impl Serialize) -> McpResult<ReadResourceResult> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::InternalError(e.to_string()))?;
    Ok(ReadResourceResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: Some(templates::JSON_MIME.to_string()),
            text: Some(text),
        }],
    })
}
