//! Tag Definition API 模块
//!
//! 动态表单系统的管理入口：普通用户读取解析后的表单字段，
//! 管理员通过变更协议维护选项和尺寸字段。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tags", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/form/{category}", get(handler::form));

    let manage_routes = Router::new()
        .route("/manage", get(handler::manage))
        .route("/seed", post(handler::seed))
        .route("/{id}/mutations", post(handler::mutate))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
