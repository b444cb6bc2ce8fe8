//! Webcam MCP server: photo capture, video recording and camera settings
//! for LLM clients over stdio.

pub mod config;
pub mod picker;
pub mod protocol;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use picker::CameraPicker;
pub use protocol::ProtocolHandler;
pub use session::{DeviceSession, SharedSession};
pub use transport::StdioTransport;
