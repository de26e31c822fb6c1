//! Luoyi Wardrobe Server - 汉服衣柜目录服务
//!
//! # 架构概述
//!
//! 单机自托管的衣柜目录服务端，核心是动态标签模式引擎：
//!
//! - **标签模式** (`shared::schema`): 衣物表单字段由标签定义驱动，
//!   管理员可增删选项和尺寸字段而无需改代码
//! - **存储** (`store`): 双后端 — 嵌入式 SurrealDB 或 redb，启动时选定
//! - **认证** (`auth`): JWT 双角色体系 (admin / member)
//! - **HTTP API** (`api`): RESTful API 接口
//! - **图片清理** (`services`): 提交后异步回收孤儿图片
//!
//! # 模块结构
//!
//! ```text
//! luoyi-server/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── auth/          # JWT 认证、管理员中间件
//! ├── store/         # 存储端口与两个适配器
//! ├── services/      # 图片清理 outbox
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误类型、日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod services;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use services::CleanupService;
pub use store::{StoreError, WardrobeStore};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    __                        _
   / /   __  ______  ____  __(_)
  / /   / / / / __ \/ / / / / /
 / /___/ /_/ / /_/ / /_/ / / /
/_____/\__,_/\____/\__, / /_/
                  /____/
    "#
    );
}
