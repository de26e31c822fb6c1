//! Clothing API Handlers
//!
//! 衣物记录按标签模式校验后落库：属性/尺寸键必须在目标分类的
//! 允许列表内 (值不校验，选项删除不影响已有记录)。换图和删除
//! 在主操作提交之后才入队旧图清理。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::CATEGORIES;
use shared::schema::{CategoryFields, FormValues, TagSchema};
use shared::{
    ClothingCreate, ClothingItem, ClothingQuery, ClothingUpdate, Paged, now_millis, record_id,
};

async fn load_schema(state: &ServerState) -> Result<TagSchema, AppError> {
    let stored = state.store.list_tags().await?;
    Ok(TagSchema::load(stored)?)
}

fn ensure_known_category(category: &str) -> Result<(), AppError> {
    if !CATEGORIES.contains(&category) {
        return Err(AppError::validation(format!("未知分类: {}", category)));
    }
    Ok(())
}

/// POST /api/clothes - 创建衣物
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClothingCreate>,
) -> AppResult<Json<AppResponse<ClothingItem>>> {
    ensure_known_category(&payload.category)?;

    let schema = load_schema(&state).await?;
    schema.validate_item_keys(&payload.category, &payload.attributes, &payload.sizes)?;

    let item = payload.into_item(record_id(), now_millis());
    state.store.put_clothing(&item).await?;
    tracing::info!(id = %item.id, name = %item.name, category = %item.category, "衣物已创建");
    Ok(ok(item))
}

/// GET /api/clothes/:id - 获取单件衣物
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<ClothingItem>>> {
    let item = state
        .store
        .get_clothing(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("衣物 {} 不存在", id)))?;
    Ok(ok(item))
}

/// PUT /api/clothes/:id - 合并更新
///
/// 换图时旧图在更新提交后入队清理，清理失败不影响本次更新。
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ClothingUpdate>,
) -> AppResult<Json<AppResponse<ClothingItem>>> {
    if let Some(category) = &payload.category {
        ensure_known_category(category)?;
    }

    let existing = state
        .store
        .get_clothing(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("衣物 {} 不存在", id)))?;

    // 校验目标分类 (更新分类时按新分类解析允许键)
    if payload.attributes.is_some() || payload.sizes.is_some() {
        let category = payload.category.as_deref().unwrap_or(&existing.category);
        let empty = BTreeMap::new();
        let attributes = payload.attributes.as_ref().unwrap_or(&empty);
        let sizes = payload.sizes.as_ref().unwrap_or(&empty);
        let schema = load_schema(&state).await?;
        schema.validate_item_keys(category, attributes, sizes)?;
    }

    let updated = state.store.update_clothing(&id, &payload).await?;

    if let Some(new_url) = &payload.image_url
        && let Some(old_url) = &existing.image_url
        && old_url != new_url
    {
        state.cleanup.enqueue_image(old_url.clone());
    }

    tracing::info!(id = %id, "衣物已更新");
    Ok(ok(updated))
}

/// DELETE /api/clothes/:id - 删除衣物
///
/// 引用此衣物的搭配保留悬空 id，详情解析时跳过。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let existing = state.store.get_clothing(&id).await?;
    let deleted = state.store.delete_clothing(&id).await?;

    if deleted {
        if let Some(url) = existing.and_then(|item| item.image_url) {
            state.cleanup.enqueue_image(url);
        }
        tracing::info!(id = %id, "衣物已删除");
    }

    Ok(ok(deleted))
}

/// POST /api/clothes/query - 分页浏览
///
/// 过滤字段名必须是当前模式里的属性字段；同字段多值为 OR，
/// 跨字段为 AND。同时服务搭配组合的选择器。
pub async fn query(
    State(state): State<ServerState>,
    Json(query): Json<ClothingQuery>,
) -> AppResult<Json<AppResponse<Paged<ClothingItem>>>> {
    if let Some(category) = &query.category {
        ensure_known_category(category)?;
    }

    if !query.filters.is_empty() {
        let schema = load_schema(&state).await?;
        let known = schema.attribute_fields();
        for field in query.filters.keys() {
            if !known.contains(field.as_str()) {
                return Err(AppError::validation(format!("未知过滤字段: {}", field)));
            }
        }
    }

    let page = state.store.query_clothes(&query).await?;
    Ok(ok(page))
}

/// 编辑表单视图：分类的表单字段 + 记录当前值
#[derive(Debug, Serialize)]
pub struct ClothingEditForm {
    pub item: ClothingItem,
    pub fields: CategoryFields,
    pub values: FormValues,
}

/// GET /api/clothes/:id/form - 编辑表单解析
///
/// 属性只带记录里非空的值；尺寸按模式全键给出，缺测量值的为空串。
pub async fn edit_form(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<ClothingEditForm>>> {
    let item = state
        .store
        .get_clothing(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("衣物 {} 不存在", id)))?;

    let schema = load_schema(&state).await?;
    let fields = schema.fields_for(&item.category);
    let values = schema.extract(&item);

    Ok(ok(ClothingEditForm {
        item,
        fields,
        values,
    }))
}
