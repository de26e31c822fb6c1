//! Data Transfer API — catalog export/import as versioned JSON
//!
//! - GET /api/transfer/export → full snapshot (tags, clothes, outfits)
//! - POST /api/transfer/import → validates the tag set, then upserts by id
//!
//! 仅管理员可用。图片文件不随快照走，导出里只有图片 URL。

mod handler;

pub use handler::{EXPORT_VERSION, ImportReport, WardrobeExport};

use axum::{
    Router, middleware,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// 导入请求体上限: 个人衣柜全量 JSON 远小于此
const IMPORT_BODY_LIMIT: usize = 20 * 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/transfer/export", get(handler::export))
        .route("/api/transfer/import", post(handler::import))
        .layer(middleware::from_fn(require_admin))
        .layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT))
}
