//! Outfit API Handlers
//!
//! 搭配引用衣物 id，不做外键约束：被删衣物留下的悬空引用在
//! 详情解析时静默跳过。封面规则 — 上传了合照用合照，否则回退
//! 到第一件有图下裙，再否则第一件有图上衣。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::{CATEGORY_ACCESSORY, CATEGORY_BOTTOM, CATEGORY_TOP, compute_fallback_image};
use shared::schema::SEASONS;
use shared::{Outfit, OutfitCreate, OutfitDetail, OutfitQuery, OutfitUpdate, Paged, now_millis, record_id};

fn ensure_known_season(season: &str) -> Result<(), AppError> {
    if !SEASONS.contains(&season) {
        return Err(AppError::validation(format!("未知季节: {}", season)));
    }
    Ok(())
}

/// POST /api/outfits - 创建搭配
///
/// 服务端按当前引用的衣物计算回退封面
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OutfitCreate>,
) -> AppResult<Json<AppResponse<Outfit>>> {
    ensure_known_season(&payload.season)?;

    let items = state.store.get_clothes_batch(&payload.clothes).await?;
    let mut outfit = payload.into_outfit(record_id(), now_millis());
    outfit.fallback_image_url = compute_fallback_image(&items);

    state.store.put_outfit(&outfit).await?;
    tracing::info!(id = %outfit.id, name = %outfit.name, season = %outfit.season, "搭配已创建");
    Ok(ok(outfit))
}

/// GET /api/outfits/:id - 获取单个搭配
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Outfit>>> {
    let outfit = state
        .store
        .get_outfit(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("搭配 {} 不存在", id)))?;
    Ok(ok(outfit))
}

/// PUT /api/outfits/:id - 合并更新
///
/// 引用列表变化时回退封面在存储适配器内重算；换合照时旧照
/// 在提交后入队清理。
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OutfitUpdate>,
) -> AppResult<Json<AppResponse<Outfit>>> {
    if let Some(season) = &payload.season {
        ensure_known_season(season)?;
    }

    let existing = state
        .store
        .get_outfit(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("搭配 {} 不存在", id)))?;

    let updated = state.store.update_outfit(&id, &payload).await?;

    if let Some(new_url) = &payload.outfit_image_url
        && let Some(old_url) = &existing.outfit_image_url
        && old_url != new_url
    {
        state.cleanup.enqueue_image(old_url.clone());
    }

    tracing::info!(id = %id, "搭配已更新");
    Ok(ok(updated))
}

/// DELETE /api/outfits/:id - 删除搭配
///
/// 只入队合照清理；回退封面指向的是衣物自己的图片。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let existing = state.store.get_outfit(&id).await?;
    let deleted = state.store.delete_outfit(&id).await?;

    if deleted {
        if let Some(url) = existing.and_then(|outfit| outfit.outfit_image_url) {
            state.cleanup.enqueue_image(url);
        }
        tracing::info!(id = %id, "搭配已删除");
    }

    Ok(ok(deleted))
}

/// POST /api/outfits/query - 分页浏览 (可按季节过滤)
pub async fn query(
    State(state): State<ServerState>,
    Json(query): Json<OutfitQuery>,
) -> AppResult<Json<AppResponse<Paged<Outfit>>>> {
    let page = state.store.query_outfits(&query).await?;
    Ok(ok(page))
}

/// GET /api/outfits/:id/detail - 详情视图
///
/// 引用的衣物批量取回后按分类分组，组内保持引用顺序；
/// 悬空 id 已在批量取回时跳过。
pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OutfitDetail>>> {
    let outfit = state
        .store
        .get_outfit(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("搭配 {} 不存在", id)))?;

    let items = state.store.get_clothes_batch(&outfit.clothes).await?;

    let mut tops = Vec::new();
    let mut bottoms = Vec::new();
    let mut accessories = Vec::new();
    for item in items {
        if item.category == CATEGORY_TOP {
            tops.push(item);
        } else if item.category == CATEGORY_BOTTOM {
            bottoms.push(item);
        } else if item.category == CATEGORY_ACCESSORY {
            accessories.push(item);
        } else {
            tracing::warn!(id = %item.id, category = %item.category, "衣物分类异常，详情视图忽略");
        }
    }

    Ok(ok(OutfitDetail {
        outfit,
        tops,
        bottoms,
        accessories,
    }))
}
