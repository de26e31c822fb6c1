//! Upload Routes
//!
//! Provides image upload endpoints for authenticated users.

mod handler;

pub use handler::UploadResponse;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    response::IntoResponse,
    routing::post,
};
use http::header;

use crate::core::ServerState;

/// 请求体上限: 5MB 图片 + multipart 边界开销
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Upload file response
enum UploadFileResponse {
    Ok(Bytes),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for UploadFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            UploadFileResponse::Ok(content) => (
                http::StatusCode::OK,
                [(header::CONTENT_TYPE, "image/jpeg")],
                content,
            )
                .into_response(),
            UploadFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            UploadFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Serve uploaded file handler
async fn serve_uploaded_file(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> UploadFileResponse {
    // Security check: prevent path traversal
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return UploadFileResponse::BadRequest("Invalid filename");
    }

    let file_path = state.config.images_dir().join(&filename);

    match tokio::fs::read(&file_path).await {
        Ok(content) => UploadFileResponse::Ok(content.into()),
        Err(e) => {
            tracing::debug!(filename = %filename, error = %e, "image not found");
            UploadFileResponse::NotFound
        }
    }
}

/// Build upload router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Upload image API - authentication required
        .route("/api/image/upload", post(handler::upload))
        // axum 默认 2MB 请求体上限低于图片上限，单独放宽
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        // Serve uploaded images - public access
        .route(
            "/api/image/{filename}",
            axum::routing::get(serve_uploaded_file),
        )
}
