//! 嵌入式 SurrealDB 存储适配器 (RocksDB 引擎)
//!
//! # ID 约定
//!
//! 模型里的 `id` 是裸字符串；写入时从 CONTENT 中剥离，由
//! `type::thing(table, id)` 承载，读取时用 `record::id(id) AS id`
//! 投影还原，模型自身不感知 RecordId。
//!
//! # 查询
//!
//! 属性过滤的字段名直接出现在 WHERE 子句里 (值始终走参数绑定)，
//! 因此经过 [`super::ensure_safe_filter_field`] 的标识符校验。
//! 嵌入式引擎上 WHERE + ORDER BY + LIMIT 组合会丢记录，分页在
//! 内存里切片完成。

use std::path::Path;

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use async_trait::async_trait;
use shared::models::outfit::compute_fallback_image;
use shared::schema::{TagMutation, apply_mutation};
use shared::{
    ClothingItem, ClothingQuery, ClothingUpdate, Outfit, OutfitQuery, OutfitUpdate, Paged,
    TagDefinition,
};

use super::{
    CatalogDump, StoreError, StoreResult, WardrobeStore, ensure_safe_filter_field, paginate,
};

const TAG_TABLE: &str = "tag";
const CLOTHING_TABLE: &str = "clothing";
const OUTFIT_TABLE: &str = "outfit";

const NAMESPACE: &str = "luoyi";
const DATABASE: &str = "wardrobe";

/// SurrealDB-backed catalog store
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Db>,
}

/// Serialize a model for CONTENT, dropping the `id` field — the record key
/// carries it, and a duplicated field would fight the projection on reads.
fn content_of<T: Serialize>(value: &T) -> StoreResult<serde_json::Value> {
    let mut content = serde_json::to_value(value)?;
    if let Some(obj) = content.as_object_mut() {
        obj.remove("id");
    }
    Ok(content)
}

impl SurrealStore {
    /// Open (or create) the database under the given directory
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path.as_ref()).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self { db })
    }

    async fn select_one<T>(&self, table: &str, id: &str) -> StoreResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut res = self
            .db
            .query("SELECT *, record::id(id) AS id FROM type::thing($tb, $id)")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<T> = res.take(0)?;
        Ok(rows.into_iter().next())
    }

    async fn select_all<T>(&self, table: &str) -> StoreResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut res = self
            .db
            .query("SELECT *, record::id(id) AS id FROM type::table($tb)")
            .bind(("tb", table.to_string()))
            .await?;
        Ok(res.take(0)?)
    }

    async fn upsert<T: Serialize>(&self, table: &str, id: &str, value: &T) -> StoreResult<bool> {
        let existed = self.exists(table, id).await?;
        self.db
            .query("UPSERT type::thing($tb, $id) CONTENT $data RETURN NONE")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .bind(("data", content_of(value)?))
            .await?
            .check()?;
        Ok(!existed)
    }

    /// Full-record replace; the caller has already loaded and merged.
    async fn replace<T: Serialize>(&self, table: &str, id: &str, value: &T) -> StoreResult<()> {
        self.db
            .query("UPDATE type::thing($tb, $id) CONTENT $data RETURN NONE")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .bind(("data", content_of(value)?))
            .await?
            .check()?;
        Ok(())
    }

    async fn exists(&self, table: &str, id: &str) -> StoreResult<bool> {
        let mut res = self
            .db
            .query("SELECT record::id(id) AS id FROM type::thing($tb, $id)")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<serde_json::Value> = res.take(0)?;
        Ok(!rows.is_empty())
    }

    async fn remove(&self, table: &str, id: &str) -> StoreResult<bool> {
        let mut res = self
            .db
            .query("DELETE type::thing($tb, $id) RETURN BEFORE")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .await?;
        let removed: Vec<serde_json::Value> = res.take(0)?;
        Ok(!removed.is_empty())
    }
}

#[async_trait]
impl WardrobeStore for SurrealStore {
    async fn list_tags(&self) -> StoreResult<Vec<TagDefinition>> {
        let mut tags: Vec<TagDefinition> = self.select_all(TAG_TABLE).await?;
        // 存储序: 两个后端统一按 id 字典序返回
        tags.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tags)
    }

    async fn get_tag(&self, id: &str) -> StoreResult<Option<TagDefinition>> {
        self.select_one(TAG_TABLE, id).await
    }

    async fn put_tag(&self, tag: &TagDefinition) -> StoreResult<bool> {
        self.upsert(TAG_TABLE, &tag.id, tag).await
    }

    async fn mutate_tag(&self, id: &str, mutation: &TagMutation) -> StoreResult<TagDefinition> {
        let mut tag = self
            .get_tag(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("标签 {} 不存在", id)))?;
        apply_mutation(&mut tag, mutation)?;
        self.replace(TAG_TABLE, id, &tag).await?;
        Ok(tag)
    }

    async fn put_clothing(&self, item: &ClothingItem) -> StoreResult<bool> {
        self.upsert(CLOTHING_TABLE, &item.id, item).await
    }

    async fn get_clothing(&self, id: &str) -> StoreResult<Option<ClothingItem>> {
        self.select_one(CLOTHING_TABLE, id).await
    }

    async fn update_clothing(
        &self,
        id: &str,
        update: &ClothingUpdate,
    ) -> StoreResult<ClothingItem> {
        let mut item = self
            .get_clothing(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("衣物 {} 不存在", id)))?;
        update.apply_to(&mut item);
        self.replace(CLOTHING_TABLE, id, &item).await?;
        Ok(item)
    }

    async fn delete_clothing(&self, id: &str) -> StoreResult<bool> {
        self.remove(CLOTHING_TABLE, id).await
    }

    async fn query_clothes(&self, query: &ClothingQuery) -> StoreResult<Paged<ClothingItem>> {
        let mut sql = String::from("SELECT *, record::id(id) AS id FROM clothing");
        let mut clauses: Vec<String> = Vec::new();
        if query.category.is_some() {
            clauses.push("category = $category".to_string());
        }
        let mut value_binds: Vec<(String, Vec<String>)> = Vec::new();
        for (idx, (field, values)) in query.filters.iter().enumerate() {
            ensure_safe_filter_field(field)?;
            let param = format!("f{}", idx);
            clauses.push(format!("{} IN ${}", field, param));
            value_binds.push((param, values.clone()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut q = self.db.query(sql);
        if let Some(category) = &query.category {
            q = q.bind(("category", category.clone()));
        }
        for (param, values) in value_binds {
            q = q.bind((param, values));
        }
        let rows: Vec<ClothingItem> = q.await?.take(0)?;
        Ok(paginate(rows, query.page(), query.limit(), query.offset()))
    }

    async fn get_clothes_batch(&self, ids: &[String]) -> StoreResult<Vec<ClothingItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.get_clothing(id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    async fn put_outfit(&self, outfit: &Outfit) -> StoreResult<bool> {
        self.upsert(OUTFIT_TABLE, &outfit.id, outfit).await
    }

    async fn get_outfit(&self, id: &str) -> StoreResult<Option<Outfit>> {
        self.select_one(OUTFIT_TABLE, id).await
    }

    async fn update_outfit(&self, id: &str, update: &OutfitUpdate) -> StoreResult<Outfit> {
        let mut outfit = self
            .get_outfit(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("穿搭 {} 不存在", id)))?;
        update.apply_to(&mut outfit);
        if update.clothes.is_some() {
            let items = self.get_clothes_batch(&outfit.clothes).await?;
            outfit.fallback_image_url = compute_fallback_image(&items);
        }
        self.replace(OUTFIT_TABLE, id, &outfit).await?;
        Ok(outfit)
    }

    async fn delete_outfit(&self, id: &str) -> StoreResult<bool> {
        self.remove(OUTFIT_TABLE, id).await
    }

    async fn query_outfits(&self, query: &OutfitQuery) -> StoreResult<Paged<Outfit>> {
        let mut sql = String::from("SELECT *, record::id(id) AS id FROM outfit");
        if query.season.is_some() {
            sql.push_str(" WHERE season = $season");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut q = self.db.query(sql);
        if let Some(season) = &query.season {
            q = q.bind(("season", season.clone()));
        }
        let rows: Vec<Outfit> = q.await?.take(0)?;
        Ok(paginate(rows, query.page(), query.limit(), query.offset()))
    }

    async fn dump(&self) -> StoreResult<CatalogDump> {
        Ok(CatalogDump {
            tags: self.list_tags().await?,
            clothes: self.select_all(CLOTHING_TABLE).await?,
            outfits: self.select_all(OUTFIT_TABLE).await?,
        })
    }
}
