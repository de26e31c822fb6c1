//! 图片清理服务
//!
//! 删除和换图属于"提交后清理"：主操作落库成功之后才把旧图片的
//! URL 投递到这里，由后台工作者异步处理。清理失败只记日志，
//! 绝不回滚或拖慢主操作。
//!
//! 工作者删文件前会重查一次引用 — 入队到执行之间引用可能又回来
//! 了 (多条记录共用一张图、或刚好有一次导入)，有引用就跳过。

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::fs;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::store::{StoreError, WardrobeStore};

/// One queued check: an image URL that may have just lost its last reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCleanupTask {
    pub url: String,
}

/// 图片清理服务 (post-commit outbox)
#[derive(Clone)]
pub struct CleanupService {
    tx: mpsc::UnboundedSender<ImageCleanupTask>,
    // taken by the first start() call
    rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<ImageCleanupTask>>>>,
}

impl CleanupService {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// 主操作提交后调用。通道无界，入队永不阻塞请求。
    pub fn enqueue_image(&self, url: impl Into<String>) {
        let task = ImageCleanupTask { url: url.into() };
        if self.tx.send(task).is_err() {
            tracing::warn!("cleanup worker gone, orphan check skipped");
        }
    }

    /// 启动后台工作者。重复调用是空操作。
    pub fn start(
        &self,
        store: Arc<dyn WardrobeStore>,
        images_dir: PathBuf,
        shutdown: CancellationToken,
    ) {
        let receiver = self.rx.lock().ok().and_then(|mut guard| guard.take());
        let Some(mut rx) = receiver else {
            return;
        };

        tokio::spawn(async move {
            tracing::info!("Image cleanup worker started");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Image cleanup worker received shutdown signal");
                        break;
                    }
                    task = rx.recv() => {
                        let Some(task) = task else {
                            tracing::info!("Cleanup channel closed, worker stopping");
                            break;
                        };
                        process_task(store.as_ref(), &images_dir, &task).await;
                    }
                }
            }
        });
    }
}

impl Default for CleanupService {
    fn default() -> Self {
        Self::new()
    }
}

/// 只认本服务生成的 `/api/image/{file}` 直链；
/// 外链和历史遗留的云存储地址不归这里管。
fn filename_from_url(url: &str) -> Option<&str> {
    let name = url.strip_prefix("/api/image/")?;
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return None;
    }
    Some(name)
}

async fn image_still_referenced(
    store: &dyn WardrobeStore,
    url: &str,
) -> Result<bool, StoreError> {
    let dump = store.dump().await?;
    let in_clothes = dump
        .clothes
        .iter()
        .any(|item| item.image_url.as_deref() == Some(url));
    let in_outfits = dump.outfits.iter().any(|outfit| {
        outfit.outfit_image_url.as_deref() == Some(url)
            || outfit.fallback_image_url.as_deref() == Some(url)
    });
    Ok(in_clothes || in_outfits)
}

async fn process_task(store: &dyn WardrobeStore, images_dir: &Path, task: &ImageCleanupTask) {
    let Some(filename) = filename_from_url(&task.url) else {
        return;
    };

    match image_still_referenced(store, &task.url).await {
        Ok(true) => {
            tracing::debug!(url = %task.url, "image still referenced, kept");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            // 查不动引用就宁可留着文件
            tracing::warn!(url = %task.url, error = %e, "reference re-check failed, image kept");
            return;
        }
    }

    let path = images_dir.join(filename);
    if !path.exists() {
        return;
    }
    match fs::remove_file(&path).await {
        Ok(_) => tracing::info!(file = %filename, "orphan image removed"),
        Err(e) => tracing::warn!(file = %filename, error = %e, "failed to remove orphan image"),
    }
}
