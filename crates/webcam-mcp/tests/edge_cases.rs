//! Integration tests for webcam-mcp, driving the protocol handler with raw
//! JSON-RPC frames against a scripted camera backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use webcam::{
    CameraBackend, CameraDescriptor, CameraSettings, CaptureOptions, CommandLine, Platform,
    PreferencesStore, RecordingOptions, SettingControl, WebcamError, WebcamResult,
};
use webcam_mcp::picker::CameraPicker;
use webcam_mcp::protocol::ProtocolHandler;
use webcam_mcp::session::{self, DeviceSession, SharedSession};
use webcam_mcp::tools::ToolContext;
use webcam_mcp::transport::StdioTransport;
use webcam_mcp::types::*;

// ─────────────────────── fake backend ───────────────────────

/// Camera backend that keeps settings in memory and stands in shell
/// utilities for ffmpeg.
struct FakeBackend {
    cameras: Vec<CameraDescriptor>,
    settings: StdMutex<HashMap<String, CameraSettings>>,
    writes: StdMutex<Vec<(String, SettingControl, i32)>>,
    fail_on: Option<SettingControl>,
    /// Copied into place by captures; `None` makes every capture fail.
    fixture: Option<PathBuf>,
    recorder: CommandLine,
    opener: CommandLine,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            cameras: vec![
                CameraDescriptor::new("/dev/video0", "Integrated Camera", Some("usb-0000:00:14.0-5".into())),
                CameraDescriptor::new("/dev/video2", "USB Webcam", Some("usb-0000:00:14.0-2".into())),
            ],
            settings: StdMutex::new(HashMap::new()),
            writes: StdMutex::new(Vec::new()),
            fail_on: None,
            fixture: None,
            recorder: CommandLine::new("sleep").arg("30"),
            opener: CommandLine::new("true"),
        }
    }

    fn without_cameras(mut self) -> Self {
        self.cameras.clear();
        self
    }

    fn failing_on(mut self, control: SettingControl) -> Self {
        self.fail_on = Some(control);
        self
    }

    fn with_fixture(mut self, fixture: PathBuf) -> Self {
        self.fixture = Some(fixture);
        self
    }

    fn with_recorder(mut self, recorder: CommandLine) -> Self {
        self.recorder = recorder;
        self
    }

    fn with_opener(mut self, opener: CommandLine) -> Self {
        self.opener = opener;
        self
    }

    fn baseline() -> CameraSettings {
        CameraSettings::default()
            .with(SettingControl::Brightness, 50)
            .with(SettingControl::Contrast, 50)
            .with(SettingControl::Saturation, 50)
            .with(SettingControl::Hue, 0)
            .with(SettingControl::Sharpness, 30)
    }

    fn writes(&self) -> Vec<(String, SettingControl, i32)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CameraBackend for FakeBackend {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn default_device(&self) -> String {
        "/dev/video0".to_string()
    }

    async fn enumerate_cameras(&self) -> Vec<CameraDescriptor> {
        self.cameras.clone()
    }

    async fn read_settings(&self, device: &str) -> Option<CameraSettings> {
        let settings = self.settings.lock().unwrap();
        Some(settings.get(device).cloned().unwrap_or_else(Self::baseline))
    }

    async fn write_control(&self, device: &str, control: SettingControl, value: i32) -> WebcamResult<()> {
        if self.fail_on == Some(control) {
            return Err(WebcamError::DeviceUnavailable(format!("{} rejected", control.name())));
        }
        self.writes.lock().unwrap().push((device.to_string(), control, value));
        self.settings
            .lock()
            .unwrap()
            .entry(device.to_string())
            .or_insert_with(Self::baseline)
            .set(control, value);
        Ok(())
    }

    fn capture_command(&self, _device: &str, _options: &CaptureOptions, output: &Path) -> WebcamResult<CommandLine> {
        Ok(match &self.fixture {
            Some(fixture) => CommandLine::new("cp")
                .arg(fixture.display().to_string())
                .arg(output.display().to_string()),
            None => CommandLine::new("false"),
        })
    }

    fn recording_command(&self, _device: &str, _options: &RecordingOptions, _output: &Path) -> WebcamResult<CommandLine> {
        Ok(self.recorder.clone())
    }

    fn open_url_command(&self, _url: &str) -> WebcamResult<CommandLine> {
        Ok(self.opener.clone())
    }
}

// ─────────────────────── helpers ───────────────────────

fn shared_session(dir: &Path, backend: Arc<FakeBackend>) -> SharedSession {
    session::shared(DeviceSession::new(
        backend,
        dir.join("captures"),
        dir.join("recordings"),
        PreferencesStore::new(dir.join(".camera-preferences.json")),
    ))
}

fn handler_for(session: SharedSession) -> ProtocolHandler {
    let picker = Arc::new(CameraPicker::new(session.clone()).without_browser());
    ProtocolHandler::with_context(ToolContext { session, picker })
}

fn handler(dir: &Path, backend: Arc<FakeBackend>) -> ProtocolHandler {
    handler_for(shared_session(dir, backend))
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// Call a tool and return `(isError, payload of the first text item)`.
async fn call_tool(handler: &ProtocolHandler, name: &str, arguments: Value) -> (bool, Value) {
    let response = send_unwrap(handler, tool_call(1, name, arguments)).await;
    let result = &response["result"];
    let is_error = result["isError"].as_bool().unwrap_or(false);
    let text = result["content"][0]["text"].as_str().expect("text content");
    (is_error, serde_json::from_str(text).expect("JSON payload"))
}

/// A small real PNG to stand in for a camera frame.
fn write_fixture(dir: &Path) -> PathBuf {
    let img = image::DynamicImage::new_rgb8(4, 3);
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    img.write_with_encoder(encoder).unwrap();
    let path = dir.join("fixture.png");
    std::fs::write(&path, buf).unwrap();
    path
}

async fn wait_until_idle(session: &SharedSession) -> bool {
    for _ in 0..50 {
        if !session.lock().await.is_recording() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

// ═══════════════════════════════════════════════════════
// Dispatcher
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_tools_list_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let response = send_unwrap(&handler, mcp_request(1, "tools/list", json!({}))).await;
    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "capture_photo",
            "start_recording",
            "stop_recording",
            "list_cameras",
            "get_camera_settings",
            "set_camera_settings",
            "select_camera",
            "get_current_camera",
        ]
    );
}

#[tokio::test]
async fn test_unknown_tool_is_error_result() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let response = send_unwrap(&handler, tool_call(7, "fly_drone", json!({}))).await;
    assert_eq!(response["id"], 7);
    assert!(response.get("error").is_none(), "must not be a protocol error");

    let (is_error, payload) = call_tool(&handler, "fly_drone", json!({})).await;
    assert!(is_error);
    assert_eq!(payload["success"], false);
    assert!(payload["error"].as_str().unwrap().contains("fly_drone"));
    assert_eq!(payload["kind"], "unknown_tool");
}

#[tokio::test]
async fn test_out_of_range_argument_names_field() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new());
    let handler = handler(dir.path(), backend.clone());

    let (is_error, payload) = call_tool(&handler, "set_camera_settings", json!({"brightness": 150})).await;
    assert!(is_error);
    assert_eq!(payload["error"], "Invalid arguments: brightness must be ≤ 100");
    assert!(backend.writes().is_empty());

    let (is_error, payload) = call_tool(&handler, "start_recording", json!({"format": "webm"})).await;
    assert!(is_error);
    assert_eq!(payload["kind"], "invalid_arguments");
}

// ═══════════════════════════════════════════════════════
// Camera settings
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_brightness_round_trip_leaves_other_fields() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let (_, before) = call_tool(&handler, "get_camera_settings", json!({})).await;
    let (is_error, set) = call_tool(&handler, "set_camera_settings", json!({"brightness": 70})).await;
    assert!(!is_error);
    assert_eq!(set["applied"], json!({"brightness": 70}));

    let (_, after) = call_tool(&handler, "get_camera_settings", json!({})).await;
    assert_eq!(after["settings"]["brightness"], 70);
    for field in ["contrast", "saturation", "hue", "sharpness"] {
        assert_eq!(after["settings"][field], before["settings"][field], "{field} changed");
    }
    assert!(after["settings"].get("focus").is_none());
}

#[tokio::test]
async fn test_partial_settings_write_keeps_earlier_fields() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new().failing_on(SettingControl::Saturation));
    let handler = handler(dir.path(), backend.clone());

    let (is_error, payload) = call_tool(
        &handler,
        "set_camera_settings",
        json!({"brightness": 70, "contrast": 60, "saturation": 40, "hue": 10}),
    )
    .await;
    assert!(is_error);
    assert_eq!(payload["kind"], "settings_partially_applied");
    let message = payload["error"].as_str().unwrap();
    assert!(message.contains("brightness, contrast"), "{message}");
    assert!(message.contains("saturation"), "{message}");

    let written: Vec<SettingControl> = backend.writes().into_iter().map(|(_, c, _)| c).collect();
    assert_eq!(written, vec![SettingControl::Brightness, SettingControl::Contrast]);

    let (_, after) = call_tool(&handler, "get_camera_settings", json!({})).await;
    assert_eq!(after["settings"]["brightness"], 70);
    assert_eq!(after["settings"]["contrast"], 60);
    assert_eq!(after["settings"]["saturation"], 50);
    assert_eq!(after["settings"]["hue"], 0);
}

#[tokio::test]
async fn test_first_field_failure_keeps_original_error() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new().failing_on(SettingControl::Brightness));
    let handler = handler(dir.path(), backend);

    let (is_error, payload) = call_tool(&handler, "set_camera_settings", json!({"brightness": 10})).await;
    assert!(is_error);
    assert_eq!(payload["kind"], "device_unavailable");
}

#[tokio::test]
async fn test_empty_settings_call_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new());
    let handler = handler(dir.path(), backend.clone());

    let (is_error, payload) = call_tool(&handler, "set_camera_settings", json!({"device": "/dev/video2"})).await;
    assert!(!is_error);
    assert_eq!(payload["message"], "No settings provided to change.");
    assert!(backend.writes().is_empty());
}

#[tokio::test]
async fn test_settings_follow_selected_camera() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new());
    let session = shared_session(dir.path(), backend.clone());
    session.lock().await.select_camera("/dev/video2").unwrap();
    let handler = handler_for(session);

    let (_, payload) = call_tool(&handler, "set_camera_settings", json!({"gain": 5})).await;
    assert_eq!(payload["device"], "/dev/video2");
    assert_eq!(backend.writes()[0].0, "/dev/video2");
}

// ═══════════════════════════════════════════════════════
// Recording lifecycle
// ═══════════════════════════════════════════════════════

#[cfg(unix)]
#[tokio::test]
async fn test_second_start_is_already_recording() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let (is_error, first) = call_tool(&handler, "start_recording", json!({"duration": 5})).await;
    assert!(!is_error, "{first}");
    assert!(first["filename"].as_str().unwrap().starts_with("recording_"));
    assert!(first["filename"].as_str().unwrap().ends_with(".mp4"));
    assert_eq!(first["duration"], 5);

    let (is_error, second) = call_tool(&handler, "start_recording", json!({})).await;
    assert!(is_error);
    assert_eq!(second["success"], false);
    assert_eq!(second["error"], "Already recording");

    let (is_error, _) = call_tool(&handler, "stop_recording", json!({})).await;
    assert!(!is_error);
}

#[tokio::test]
async fn test_stop_while_idle_is_not_recording() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let (is_error, payload) = call_tool(&handler, "stop_recording", json!({})).await;
    assert!(is_error);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["error"], "Not recording");
}

#[cfg(unix)]
#[tokio::test]
async fn test_stop_returns_without_waiting_and_goes_idle() {
    let dir = tempfile::tempdir().unwrap();
    let session = shared_session(dir.path(), Arc::new(FakeBackend::new()));
    let handler = handler_for(session.clone());

    call_tool(&handler, "start_recording", json!({})).await;
    assert!(session.lock().await.recording_status().is_some());

    let started = std::time::Instant::now();
    let (is_error, payload) = call_tool(&handler, "stop_recording", json!({})).await;
    assert!(!is_error);
    assert!(payload["elapsed_secs"].as_f64().unwrap() >= 0.0);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!session.lock().await.is_recording());

    let (is_error, again) = call_tool(&handler, "stop_recording", json!({})).await;
    assert!(is_error);
    assert_eq!(again["error"], "Not recording");
}

#[cfg(unix)]
#[tokio::test]
async fn test_recorder_exit_returns_session_to_idle() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new().with_recorder(CommandLine::new("true")));
    let session = shared_session(dir.path(), backend);
    let handler = handler_for(session.clone());

    let (is_error, _) = call_tool(&handler, "start_recording", json!({"duration": 1})).await;
    assert!(!is_error);
    assert!(wait_until_idle(&session).await, "recorder exit was never reaped");

    let (is_error, payload) = call_tool(&handler, "stop_recording", json!({})).await;
    assert!(is_error);
    assert_eq!(payload["error"], "Not recording");

    let (is_error, _) = call_tool(&handler, "start_recording", json!({})).await;
    assert!(!is_error);
}

#[tokio::test]
async fn test_missing_recorder_is_device_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(
        FakeBackend::new().with_recorder(CommandLine::new("webcam-mcp-no-such-recorder")),
    );
    let session = shared_session(dir.path(), backend);
    let handler = handler_for(session.clone());

    let (is_error, payload) = call_tool(&handler, "start_recording", json!({})).await;
    assert!(is_error);
    assert_eq!(payload["kind"], "device_unavailable");
    assert!(!session.lock().await.is_recording());
}

// ═══════════════════════════════════════════════════════
// Camera selection
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_selection_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let handler = handler(dir.path(), Arc::new(FakeBackend::new()));
        let (_, before) = call_tool(&handler, "get_current_camera", json!({})).await;
        assert_eq!(before["selected"], Value::Null);
        handler.session().lock().await.select_camera("camX").unwrap();
    }

    let restarted = handler(dir.path(), Arc::new(FakeBackend::new()));
    let (is_error, payload) = call_tool(&restarted, "get_current_camera", json!({})).await;
    assert!(!is_error);
    assert_eq!(payload["selected"], "camX");

    let stored = std::fs::read_to_string(dir.path().join(".camera-preferences.json")).unwrap();
    let stored: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["selectedCamera"], "camX");
}

#[tokio::test]
async fn test_corrupt_preferences_mean_no_selection() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".camera-preferences.json"), "{not json").unwrap();

    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));
    let (is_error, payload) = call_tool(&handler, "get_current_camera", json!({})).await;
    assert!(!is_error);
    assert_eq!(payload["selected"], Value::Null);
}

#[tokio::test]
async fn test_list_cameras_reports_count() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let (is_error, payload) = call_tool(&handler, "list_cameras", json!({})).await;
    assert!(!is_error);
    assert_eq!(payload["count"], 2);
    assert_eq!(payload["cameras"][1]["id"], "/dev/video2");
    assert_eq!(payload["cameras"][1]["name"], "USB Webcam");
}

// ═══════════════════════════════════════════════════════
// Photo capture
// ═══════════════════════════════════════════════════════

#[cfg(unix)]
#[tokio::test]
async fn test_capture_without_cameras_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new().without_cameras()));

    let (is_error, payload) = call_tool(
        &handler,
        "capture_photo",
        json!({"width": 640, "height": 480, "format": "jpeg", "return_type": "base64"}),
    )
    .await;
    assert!(is_error);
    assert_eq!(payload["success"], false);
    assert!(!payload["error"].as_str().unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_capture_base64_and_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());
    let fixture_bytes = std::fs::read(&fixture).unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new().with_fixture(fixture)));

    let response = send_unwrap(
        &handler,
        tool_call(1, "capture_photo", json!({"format": "png", "return_type": "base64"})),
    )
    .await;
    let content = response["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    let summary: Value = serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["dimensions"], json!({"width": 4, "height": 3}));
    assert!(summary["path"].as_str().unwrap().contains("captures"));
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(content[1]["text"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, fixture_bytes);

    let response = send_unwrap(
        &handler,
        tool_call(2, "capture_photo", json!({"format": "png", "return_type": "buffer"})),
    )
    .await;
    let image = &response["result"]["content"][1];
    assert_eq!(image["type"], "image");
    assert_eq!(image["mimeType"], "image/png");
}

#[cfg(unix)]
#[tokio::test]
async fn test_capture_runs_during_recording() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());
    let handler = handler(dir.path(), Arc::new(FakeBackend::new().with_fixture(fixture)));

    call_tool(&handler, "start_recording", json!({})).await;
    let (is_error, payload) = call_tool(&handler, "capture_photo", json!({"format": "png"})).await;
    assert!(!is_error, "{payload}");
    call_tool(&handler, "stop_recording", json!({})).await;
}

// ═══════════════════════════════════════════════════════
// Resources
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_missing_captures_dir_lists_empty() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let response = send_unwrap(
        &handler,
        mcp_request(3, "resources/read", json!({"uri": "webcam://captures"})),
    )
    .await;
    assert!(response.get("error").is_none());
    let text = response["result"]["contents"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!([]));
}

#[tokio::test]
async fn test_unknown_resource_is_protocol_error() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(dir.path(), Arc::new(FakeBackend::new()));

    let response = send_unwrap(
        &handler,
        mcp_request(4, "resources/read", json!({"uri": "webcam://nothing"})),
    )
    .await;
    assert_eq!(response["id"], 4);
    assert_eq!(response["error"]["code"], mcp_error_codes::RESOURCE_NOT_FOUND);
}

// ═══════════════════════════════════════════════════════
// Transport
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_transport_echoes_ids_and_survives_bad_frames() {
    let dir = tempfile::tempdir().unwrap();
    let transport = StdioTransport::new(handler(dir.path(), Arc::new(FakeBackend::new())));

    let input = concat!(
        "{this is not json\n",
        "\n",
        "{\"jsonrpc\":\"2.0\",\"id\":\"req-a\",\"method\":\"ping\"}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"no/such/method\"}\n",
    );
    let mut output = Vec::new();
    transport
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    assert_eq!(lines[0]["id"], Value::Null);
    assert_eq!(lines[0]["error"]["code"], error_codes::PARSE_ERROR);

    assert_eq!(lines[1]["id"], "req-a");
    assert_eq!(lines[1]["result"], json!({}));

    assert_eq!(lines[2]["id"], 9);
    assert_eq!(lines[2]["error"]["code"], error_codes::METHOD_NOT_FOUND);

    assert!(transport.handler().is_initialized().await);
}

// ═══════════════════════════════════════════════════════
// Camera picker
// ═══════════════════════════════════════════════════════

/// Minimal HTTP/1.1 exchange; returns status, headers and body.
async fn http(url: &str, method: &str, path: &str, body: Option<&str>) -> (u16, String, Vec<u8>) {
    let addr = url.trim_start_matches("http://");
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();

    let mut request = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = body {
        request.push_str("Content-Type: application/json\r\n");
        request.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    } else {
        request.push_str("\r\n");
    }
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, head.to_ascii_lowercase(), raw[split + 4..].to_vec())
}

#[tokio::test]
async fn test_select_camera_tool_starts_picker() {
    let dir = tempfile::tempdir().unwrap();
    let session = shared_session(dir.path(), Arc::new(FakeBackend::new()));
    let picker = Arc::new(CameraPicker::new(session.clone()).without_browser());
    let handler = ProtocolHandler::with_context(ToolContext {
        session: session.clone(),
        picker: picker.clone(),
    });

    let (is_error, payload) = call_tool(&handler, "select_camera", json!({})).await;
    assert!(!is_error);
    assert_eq!(payload["expires_in_secs"], 60);
    let url = payload["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("http://127.0.0.1:"));

    let (status, _, body) = http(&url, "GET", "/api/cameras", None).await;
    assert_eq!(status, 200);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["cameras"].as_array().unwrap().len(), 2);
    assert_eq!(body["selectedCamera"], "/dev/video0");

    let (status, _, _) = http(&url, "POST", "/api/camera/select", Some(r#"{"cameraId":"/dev/video2"}"#)).await;
    assert_eq!(status, 200);
    assert_eq!(session.lock().await.selected_camera(), Some("/dev/video2"));

    let (is_error, current) = call_tool(&handler, "get_current_camera", json!({})).await;
    assert!(!is_error);
    assert_eq!(current["selected"], "/dev/video2");

    let (status, _, body) = http(&url, "POST", "/api/camera/select", Some("{}")).await;
    assert_eq!(status, 400);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Camera ID is required");

    let (_, reopened) = call_tool(&handler, "select_camera", json!({})).await;
    assert_eq!(reopened["url"], url.as_str());

    picker.close().await;
}

#[tokio::test]
async fn test_picker_serves_page() {
    let dir = tempfile::tempdir().unwrap();
    let session = shared_session(dir.path(), Arc::new(FakeBackend::new()));
    let picker = CameraPicker::new(session).without_browser();
    let launch = picker.open().await.unwrap();

    let (status, head, body) = http(&launch.url, "GET", "/", None).await;
    assert_eq!(status, 200);
    assert!(head.contains("text/html"));
    assert!(String::from_utf8_lossy(&body).contains("Select Camera"));

    picker.close().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_picker_preview_frames() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path());
    let fixture_bytes = std::fs::read(&fixture).unwrap();

    let good = shared_session(dir.path(), Arc::new(FakeBackend::new().with_fixture(fixture)));
    let picker = CameraPicker::new(good).without_browser();
    let launch = picker.open().await.unwrap();
    let (status, head, body) = http(&launch.url, "GET", "/api/camera/preview/%2Fdev%2Fvideo2", None).await;
    assert_eq!(status, 200);
    assert!(head.contains("image/jpeg"));
    assert_eq!(body, fixture_bytes);
    picker.close().await;

    let broken = shared_session(dir.path(), Arc::new(FakeBackend::new()));
    let picker = CameraPicker::new(broken).without_browser();
    let launch = picker.open().await.unwrap();
    let (status, _, body) = http(&launch.url, "GET", "/api/camera/preview/%2Fdev%2Fvideo0", None).await;
    assert_eq!(status, 500);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
    picker.close().await;
}

/// Launchers like `xdg-open` exit while a forked browser keeps running.
#[cfg(unix)]
#[tokio::test]
async fn test_open_returns_when_launcher_exits() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new().with_opener(CommandLine::new("sh").args(["-c", "sleep 4 & exit 0"]));
    let picker = CameraPicker::new(shared_session(dir.path(), Arc::new(backend)));

    let started = std::time::Instant::now();
    let launch = picker.open().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(launch.browser_opened);

    let started = std::time::Instant::now();
    let again = picker.open().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(again.reopened);

    picker.close().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_slow_launcher_does_not_hold_picker() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new().with_opener(CommandLine::new("sleep").arg("2"));
    let picker = Arc::new(CameraPicker::new(shared_session(dir.path(), Arc::new(backend))));

    let opening = tokio::spawn({
        let picker = picker.clone();
        async move { picker.open().await.unwrap() }
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let url = tokio::time::timeout(Duration::from_millis(500), picker.url())
        .await
        .expect("picker state is not held during browser launch");
    assert!(url.is_some());

    assert!(opening.await.unwrap().browser_opened);
    picker.close().await;
}

#[tokio::test]
async fn test_back_to_back_previews_get_distinct_paths() {
    let dir = tempfile::tempdir().unwrap();
    let session = shared_session(dir.path(), Arc::new(FakeBackend::new()));
    let session = session.lock().await;

    let first = session.plan_preview("/dev/video0").unwrap();
    let second = session.plan_preview("/dev/video0").unwrap();
    let other = session.plan_preview("/dev/video2").unwrap();

    assert_ne!(first.output_path, second.output_path);
    assert_ne!(first.output_path, other.output_path);
    let previews = std::env::temp_dir().join("webcam-mcp-previews");
    assert!(first.output_path.starts_with(&previews));
    assert!(second.output_path.starts_with(&previews));
}
