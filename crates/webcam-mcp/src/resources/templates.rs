//! Static resource definitions.

use crate::types::ResourceDefinition;

pub const CAMERAS_URI: &str = "webcam://cameras";
pub const CAPTURES_URI: &str = "webcam://captures";
pub const RECORDINGS_URI: &str = "webcam://recordings";

pub const JSON_MIME: &str = "application/json";

pub fn list_resources() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: CAMERAS_URI.to_string(),
            name: "Available Cameras".to_string(),
            description: Some("Cameras detected on this machine".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
        },
        ResourceDefinition {
            uri: CAPTURES_URI.to_string(),
            name: "Captured Photos".to_string(),
            description: Some("File names of the photos in the captures directory".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
        },
        ResourceDefinition {
            uri: RECORDINGS_URI.to_string(),
            name: "Video Recordings".to_string(),
            description: Some("File names of the videos in the recordings directory".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
        },
    ]
}
