//! Data Transfer Handlers
//!
//! 快照是普通 JSON，好处是能直接拿文本编辑器检查或修补。导入
//! 前整个标签集合先过一遍模式校验，任何非法定义都会在第一笔
//! 写入之前拒绝掉；衣物和搭配按 id 幂等覆盖，记录上携带的
//! 未知属性键保持原样 (孤儿键不致命，读取时惰性忽略)。

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::schema::TagSchema;
use shared::{ClothingItem, Outfit, TagDefinition, now_millis};

/// 导出格式版本，结构变更时递增
pub const EXPORT_VERSION: u32 = 1;

/// 全量快照
#[derive(Debug, Serialize, Deserialize)]
pub struct WardrobeExport {
    pub version: u32,
    /// 导出时间 (epoch millis)
    pub exported_at: i64,
    pub tags: Vec<TagDefinition>,
    pub clothes: Vec<ClothingItem>,
    pub outfits: Vec<Outfit>,
}

#[derive(Debug, Default, Serialize)]
pub struct EntityCounts {
    pub created: usize,
    pub updated: usize,
}

impl EntityCounts {
    fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }
}

/// 导入结果，按实体分开计数
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub tags: EntityCounts,
    pub clothes: EntityCounts,
    pub outfits: EntityCounts,
}

/// GET /api/transfer/export - 导出全量快照
pub async fn export(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<WardrobeExport>>> {
    let dump = state.store.dump().await?;
    tracing::info!(
        tags = dump.tags.len(),
        clothes = dump.clothes.len(),
        outfits = dump.outfits.len(),
        "目录快照已导出"
    );
    Ok(ok(WardrobeExport {
        version: EXPORT_VERSION,
        exported_at: now_millis(),
        tags: dump.tags,
        clothes: dump.clothes,
        outfits: dump.outfits,
    }))
}

/// POST /api/transfer/import - 导入快照 (按 id 幂等覆盖)
pub async fn import(
    State(state): State<ServerState>,
    Json(payload): Json<WardrobeExport>,
) -> AppResult<Json<AppResponse<ImportReport>>> {
    if payload.version != EXPORT_VERSION {
        return Err(AppError::validation(format!(
            "不支持的导出版本: {}",
            payload.version
        )));
    }

    // 标签集合整体校验；写入的是校验后的集合，内置标志随之落库
    let schema = TagSchema::load(payload.tags.clone())
        .map_err(|e| AppError::validation(format!("标签定义无效: {}", e)))?;

    // 结构预检：无 id 的记录在任何写入前拒绝
    if let Some(item) = payload.clothes.iter().find(|c| c.id.is_empty()) {
        return Err(AppError::validation(format!("衣物记录缺少 id: {}", item.name)));
    }
    if let Some(outfit) = payload.outfits.iter().find(|o| o.id.is_empty()) {
        return Err(AppError::validation(format!("搭配记录缺少 id: {}", outfit.name)));
    }

    let mut report = ImportReport::default();
    for tag in schema.tags() {
        report.tags.record(state.store.put_tag(tag).await?);
    }
    for item in &payload.clothes {
        report.clothes.record(state.store.put_clothing(item).await?);
    }
    for outfit in &payload.outfits {
        report.outfits.record(state.store.put_outfit(outfit).await?);
    }

    tracing::info!(
        tags_created = report.tags.created,
        clothes_created = report.clothes.created,
        outfits_created = report.outfits.created,
        "目录快照已导入"
    );
    Ok(ok(report))
}
