//! Tag Definition API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};
use shared::schema::{CategoryFields, TagGroup, TagMutation, TagSchema};
use shared::{TagDefinition, seed_definitions};

/// GET /api/tags - 全量定义视图 (含内置季节标签)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<TagDefinition>>>> {
    let stored = state.store.list_tags().await?;
    let schema = TagSchema::load(stored)?;
    Ok(ok(schema.tags().to_vec()))
}

/// GET /api/tags/form/:category - 分类的表单字段解析结果
///
/// 存储读取失败时降级为空字段集并附带提示消息，表单保持可打开。
/// 未知分类不报错，同样返回空字段集。
pub async fn form(
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> Json<AppResponse<CategoryFields>> {
    let schema = match state.store.list_tags().await {
        Ok(stored) => match TagSchema::load(stored) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!(error = %e, "标签定义解析失败，表单降级为空字段集");
                return ok_with_message(CategoryFields::empty(), "标签数据暂不可用，请稍后重试");
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "标签定义读取失败，表单降级为空字段集");
            return ok_with_message(CategoryFields::empty(), "标签数据暂不可用，请稍后重试");
        }
    };

    ok(schema.fields_for(&category))
}

/// GET /api/tags/manage - 管理列表 (衣物属性 / 尺寸 两组，内置标签不出现)
pub async fn manage(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<TagGroup>>>> {
    let stored = state.store.list_tags().await?;
    let schema = TagSchema::load(stored)?;
    Ok(ok(schema.managed_groups()))
}

/// POST /api/tags/:id/mutations - 应用一次标签变更
///
/// 变更在纯函数里校验并应用，失败时存储不发生任何写入。
pub async fn mutate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(mutation): Json<TagMutation>,
) -> AppResult<Json<AppResponse<TagDefinition>>> {
    let updated = state.store.mutate_tag(&id, &mutation).await?;
    tracing::info!(tag_id = %id, ?mutation, "标签定义已更新");
    Ok(ok(updated))
}

/// 播种结果
#[derive(Debug, Serialize)]
pub struct SeedReport {
    /// 本次新建的定义数
    pub created: usize,
    /// 已存在并被重置为内置内容的定义数
    pub updated: usize,
}

/// POST /api/tags/seed - 幂等播种内置定义集
///
/// 按 id 覆盖写入：缺失的定义新建，已存在的重置回内置内容
/// (恢复出厂)。管理员自建的其他定义不受影响。重复调用第二次
/// created 恒为 0。
pub async fn seed(State(state): State<ServerState>) -> AppResult<Json<AppResponse<SeedReport>>> {
    let mut report = SeedReport {
        created: 0,
        updated: 0,
    };
    for tag in seed_definitions() {
        if state.store.put_tag(&tag).await? {
            report.created += 1;
        } else {
            report.updated += 1;
        }
    }
    tracing::info!(created = report.created, updated = report.updated, "标签播种完成");
    Ok(ok(report))
}
