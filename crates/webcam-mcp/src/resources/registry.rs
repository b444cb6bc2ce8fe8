//! Resource registration and dispatch.

use crate::session::SharedSession;
use crate::types::{McpError, McpResult, ReadResourceResult, ResourceDefinition};

use super::templates::{self, CAMERAS_URI, CAPTURES_URI, RECORDINGS_URI};
use super::{cameras, media};

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_resources() -> Vec<ResourceDefinition> {
        templates::list_resources()
    }

    pub async fn read(uri: &str, session: &SharedSession) -> McpResult<ReadResourceResult> {
        match uri {
            CAMERAS_URI => cameras::read_cameras(session).await,
            CAPTURES_URI => media::read_captures(session).await,
            RECORDINGS_URI => media::read_recordings(session).await,
            _ => Err(McpError::ResourceNotFound(uri.to_string())),
        }
    }
}
