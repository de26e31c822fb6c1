//! 服务器状态
//!
//! [`ServerState`] 持有所有服务的共享引用，是每个请求处理函数
//! 看到的世界。Arc 浅拷贝，克隆成本极低。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::config::{Config, StorageBackend};
use crate::core::error::{Result, ServerError};
use crate::services::CleanupService;
use crate::store::{RedbStore, StoreResult, SurrealStore, WardrobeStore};
use shared::seed_definitions;

/// 服务器状态 - 持有所有服务的单例引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 存储后端 (surreal \| redb, 启动时选定) |
/// | jwt_service | JWT 认证服务 |
/// | cleanup | 图片清理 outbox |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 存储后端
    pub store: Arc<dyn WardrobeStore>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 图片清理服务
    pub cleanup: CleanupService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 存储后端 (database/wardrobe.db 或 database/wardrobe.redb)
    /// 3. 首次运行播种内置标签定义
    /// 4. JWT / 清理服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure().map_err(|e| {
            ServerError::Config(format!("无法创建工作目录 {}: {}", config.work_dir, e))
        })?;

        let store: Arc<dyn WardrobeStore> = match config.storage {
            StorageBackend::Surreal => {
                let path = config.database_dir().join("wardrobe.db");
                let store = SurrealStore::open(&path)
                    .await
                    .map_err(|e| ServerError::Storage(e.to_string()))?;
                tracing::info!(path = %path.display(), "SurrealDB storage opened");
                Arc::new(store)
            }
            StorageBackend::Redb => {
                let path = config.database_dir().join("wardrobe.redb");
                let store =
                    RedbStore::open(&path).map_err(|e| ServerError::Storage(e.to_string()))?;
                tracing::info!(path = %path.display(), "redb storage opened");
                Arc::new(store)
            }
        };

        seed_if_empty(store.as_ref())
            .await
            .map_err(|e| ServerError::Storage(format!("标签播种失败: {}", e)))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let cleanup = CleanupService::new();

        Ok(Self {
            config: config.clone(),
            store,
            jwt_service,
            cleanup,
        })
    }

    /// 启动后台任务，返回用于优雅停机的取消令牌
    ///
    /// 必须在 `Server::run()` 内、开始 serve 之前调用
    pub fn start_background_tasks(&self) -> CancellationToken {
        let shutdown = CancellationToken::new();
        self.cleanup.start(
            self.store.clone(),
            self.config.images_dir(),
            shutdown.clone(),
        );
        shutdown
    }
}

/// 空标签表 = 全新目录，写入内置定义集；已有数据一概不动
async fn seed_if_empty(store: &dyn WardrobeStore) -> StoreResult<()> {
    if !store.list_tags().await?.is_empty() {
        return Ok(());
    }
    let mut created = 0usize;
    for tag in seed_definitions() {
        if store.put_tag(&tag).await? {
            created += 1;
        }
    }
    tracing::info!(count = created, "首次运行: 内置标签定义已播种");
    Ok(())
}
