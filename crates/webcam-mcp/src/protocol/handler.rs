//! Main request dispatcher: receives JSON-RPC messages and routes them to
//! the tool and resource registries.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::resources::ResourceRegistry;
use crate::session::SharedSession;
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::validate_request;

/// The protocol handler that dispatches incoming JSON-RPC messages.
pub struct ProtocolHandler {
    tools: ToolContext,
    capabilities: Arc<Mutex<NegotiatedCapabilities>>,
}

impl ProtocolHandler {
    pub fn new(session: SharedSession) -> Self {
        Self::with_context(ToolContext::new(session))
    }

    /// Handler over a prepared tool context, e.g. one whose picker does not
    /// launch a browser.
    pub fn with_context(tools: ToolContext) -> Self {
        Self {
            tools,
            capabilities: Arc::new(Mutex::new(NegotiatedCapabilities::default())),
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.tools.session
    }

    pub async fn is_initialized(&self) -> bool {
        self.capabilities.lock().await.initialized
    }

    /// Handle one frame. Requests always produce a response value;
    /// notifications and stray responses produce nothing.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return error_value(e.to_json_rpc_error(request.id));
        }

        let id = request.id.clone();
        tracing::debug!(id = %id, method = %request.method, "Request");

        match self.dispatch_request(request).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::debug!(code = e.code(), "Request failed: {e}");
                error_value(e.to_json_rpc_error(id))
            }
        }
    }

    async fn dispatch_request(&self, request: JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "shutdown" => self.handle_shutdown().await,
            "ping" => Ok(Value::Object(serde_json::Map::new())),

            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,

            "resources/list" => self.handle_resources_list(),
            "resources/read" => self.handle_resources_read(request.params).await,

            _ => Err(McpError::MethodNotFound(request.method)),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.capabilities.lock().await.mark_initialized();
            }
            "notifications/cancelled" => {
                tracing::info!("Received cancellation notification");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = required_params(params, "Initialize params required")?;

        let mut caps = self.capabilities.lock().await;
        let result = caps.negotiate(init_params);

        to_result(&result)
    }

    /// Stop a running recording and the picker; the process itself exits
    /// when the client closes stdin.
    async fn handle_shutdown(&self) -> McpResult<Value> {
        tracing::info!("Shutdown requested");
        {
            let mut session = self.tools.session.lock().await;
            if session.is_recording() {
                if let Err(e) = session.stop_recording() {
                    tracing::warn!("Failed to stop recording on shutdown: {e}");
                }
            }
        }
        self.tools.picker.close().await;
        Ok(Value::Object(serde_json::Map::new()))
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        to_result(&ToolListResult {
            tools: ToolRegistry::list_tools(),
            next_cursor: None,
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = required_params(params, "Tool call params required")?;

        let result = ToolRegistry::call(&call_params.name, call_params.arguments, &self.tools).await;

        to_result(&result)
    }

    fn handle_resources_list(&self) -> McpResult<Value> {
        to_result(&ResourceListResult {
            resources: ResourceRegistry::list_resources(),
            next_cursor: None,
        })
    }

    async fn handle_resources_read(&self, params: Option<Value>) -> McpResult<Value> {
        let read_params: ResourceReadParams = required_params(params, "Resource read params required")?;

        let result = ResourceRegistry::read(&read_params.uri, &self.tools.session).await?;

        to_result(&result)
    }
}

fn required_params<T: DeserializeOwned>(params: Option<Value>, missing: &str) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(missing.to_string()))
}

fn to_result(value: &impl serde::Serialize) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn error_value(error: JsonRpcError) -> Value {
    serde_json::to_value(error).unwrap_or_default()
}
