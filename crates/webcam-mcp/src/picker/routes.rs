//! HTTP routes of the camera picker.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use webcam::CapturePayload;

use super::page::INDEX_HTML;
use crate::session::SharedSession;

pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/cameras", get(handle_cameras))
        .route("/api/camera/select", post(handle_select))
        .route("/api/camera/preview/:camera_id", get(handle_preview))
        .layer(CorsLayer::permissive())
        .with_state(session)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, AxumJson(json!({ "error": message.into() }))).into_response()
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Cameras plus the current selection, falling back to the first camera.
async fn handle_cameras(State(session): State<SharedSession>) -> AxumJson<serde_json::Value> {
    let session = session.lock().await;
    let cameras = session.list_cameras().await;
    let selected = session
        .selected_camera()
        .map(str::to_string)
        .or_else(|| cameras.first().map(|c| c.id.clone()));

    AxumJson(json!({
        "cameras": cameras,
        "selectedCamera": selected,
    }))
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    #[serde(rename = "cameraId", default)]
    camera_id: Option<String>,
}

async fn handle_select(
    State(session): State<SharedSession>,
    AxumJson(body): AxumJson<SelectRequest>,
) -> Response {
    let Some(camera_id) = body.camera_id.filter(|id| !id.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Camera ID is required");
    };

    match session.lock().await.select_camera(&camera_id) {
        Ok(()) => AxumJson(json!({
            "success": true,
            "selectedCamera": camera_id.trim(),
        }))
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// One low-resolution JPEG frame of the camera. The frame file is removed
/// once it has been read.
async fn handle_preview(
    State(session): State<SharedSession>,
    Path(camera_id): Path<String>,
) -> Response {
    let plan = match session.lock().await.plan_preview(&camera_id) {
        Ok(plan) => plan,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let frame_path = plan.output_path.clone();

    let result = plan.execute().await;
    if let Err(e) = tokio::fs::remove_file(&frame_path).await {
        tracing::debug!("Preview frame {} not removed: {e}", frame_path.display());
    }

    match result {
        Ok(outcome) => match outcome.payload {
            CapturePayload::Buffer(bytes) => {
                ([(header::CONTENT_TYPE, outcome.format.mime_type())], bytes).into_response()
            }
            _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Preview produced no image"),
        },
        Err(e) => {
            tracing::debug!(camera = %camera_id, "Preview failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
