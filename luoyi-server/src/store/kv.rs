//! redb 存储适配器 — 纯 KV 方案
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `tags` | tag id | JSON-serialized `TagDefinition` |
//! | `clothes` | item id | JSON-serialized `ClothingItem` |
//! | `outfits` | outfit id | JSON-serialized `Outfit` |
//!
//! redb 没有查询语言：浏览查询把整表读出后在内存里过滤、排序、
//! 切片。衣橱是个人量级 (千条以内)，这比引入二级索引划算得多。
//!
//! # Durability
//!
//! redb 默认 `Durability::Immediate` — `commit()` 返回即落盘，
//! copy-on-write 保证文件始终处于一致状态，适合会被直接断电的
//! 家庭盒子。

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;

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

const TAGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("tags");
const CLOTHES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clothes");
const OUTFITS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("outfits");

/// redb-backed catalog store
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database file at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and throwaway runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        // Create all tables up front so readers never race a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TAGS_TABLE)?;
            let _ = write_txn.open_table(CLOTHES_TABLE)?;
            let _ = write_txn.open_table(OUTFITS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Read the whole table in key order (ids are the keys, so this is
    /// id-lexicographic — the same stored order the Surreal adapter returns).
    fn read_all<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
    ) -> StoreResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    fn read_one<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
    ) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Upsert; returns `true` when the key was absent before the write
    fn write_one<T: Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
        value: &T,
    ) -> StoreResult<bool> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        let created;
        {
            let mut table = write_txn.open_table(table)?;
            created = table.insert(id, bytes.as_slice())?.is_none();
        }
        write_txn.commit()?;
        Ok(created)
    }

    fn delete_one(&self, table: TableDefinition<&str, &[u8]>, id: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed;
        {
            let mut table = write_txn.open_table(table)?;
            removed = table.remove(id)?.is_some();
        }
        write_txn.commit()?;
        Ok(removed)
    }
}

fn matches_clothing(item: &ClothingItem, query: &ClothingQuery) -> bool {
    if let Some(category) = &query.category
        && item.category != *category
    {
        return false;
    }
    // OR within a field, AND across fields; absent field never matches
    query.filters.iter().all(|(field, values)| {
        item.attribute(field)
            .is_some_and(|value| values.iter().any(|v| v == value))
    })
}

#[async_trait]
impl WardrobeStore for RedbStore {
    async fn list_tags(&self) -> StoreResult<Vec<TagDefinition>> {
        self.read_all(TAGS_TABLE)
    }

    async fn get_tag(&self, id: &str) -> StoreResult<Option<TagDefinition>> {
        self.read_one(TAGS_TABLE, id)
    }

    async fn put_tag(&self, tag: &TagDefinition) -> StoreResult<bool> {
        self.write_one(TAGS_TABLE, &tag.id, tag)
    }

    async fn mutate_tag(&self, id: &str, mutation: &TagMutation) -> StoreResult<TagDefinition> {
        let mut tag: TagDefinition = self
            .read_one(TAGS_TABLE, id)?
            .ok_or_else(|| StoreError::NotFound(format!("标签 {} 不存在", id)))?;
        apply_mutation(&mut tag, mutation)?;
        self.write_one(TAGS_TABLE, id, &tag)?;
        Ok(tag)
    }

    async fn put_clothing(&self, item: &ClothingItem) -> StoreResult<bool> {
        self.write_one(CLOTHES_TABLE, &item.id, item)
    }

    async fn get_clothing(&self, id: &str) -> StoreResult<Option<ClothingItem>> {
        self.read_one(CLOTHES_TABLE, id)
    }

    async fn update_clothing(
        &self,
        id: &str,
        update: &ClothingUpdate,
    ) -> StoreResult<ClothingItem> {
        let mut item: ClothingItem = self
            .read_one(CLOTHES_TABLE, id)?
            .ok_or_else(|| StoreError::NotFound(format!("衣物 {} 不存在", id)))?;
        update.apply_to(&mut item);
        self.write_one(CLOTHES_TABLE, id, &item)?;
        Ok(item)
    }

    async fn delete_clothing(&self, id: &str) -> StoreResult<bool> {
        self.delete_one(CLOTHES_TABLE, id)
    }

    async fn query_clothes(&self, query: &ClothingQuery) -> StoreResult<Paged<ClothingItem>> {
        // 与 Surreal 适配器保持同一份契约: 过滤字段必须是普通标识符
        for field in query.filters.keys() {
            ensure_safe_filter_field(field)?;
        }
        let mut rows: Vec<ClothingItem> = self.read_all(CLOTHES_TABLE)?;
        rows.retain(|item| matches_clothing(item, query));
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, query.page(), query.limit(), query.offset()))
    }

    async fn get_clothes_batch(&self, ids: &[String]) -> StoreResult<Vec<ClothingItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.read_one(CLOTHES_TABLE, id)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    async fn put_outfit(&self, outfit: &Outfit) -> StoreResult<bool> {
        self.write_one(OUTFITS_TABLE, &outfit.id, outfit)
    }

    async fn get_outfit(&self, id: &str) -> StoreResult<Option<Outfit>> {
        self.read_one(OUTFITS_TABLE, id)
    }

    async fn update_outfit(&self, id: &str, update: &OutfitUpdate) -> StoreResult<Outfit> {
        let mut outfit: Outfit = self
            .read_one(OUTFITS_TABLE, id)?
            .ok_or_else(|| StoreError::NotFound(format!("穿搭 {} 不存在", id)))?;
        update.apply_to(&mut outfit);
        if update.clothes.is_some() {
            let items = self.get_clothes_batch(&outfit.clothes).await?;
            outfit.fallback_image_url = compute_fallback_image(&items);
        }
        self.write_one(OUTFITS_TABLE, id, &outfit)?;
        Ok(outfit)
    }

    async fn delete_outfit(&self, id: &str) -> StoreResult<bool> {
        self.delete_one(OUTFITS_TABLE, id)
    }

    async fn query_outfits(&self, query: &OutfitQuery) -> StoreResult<Paged<Outfit>> {
        let mut rows: Vec<Outfit> = self.read_all(OUTFITS_TABLE)?;
        if let Some(season) = &query.season {
            rows.retain(|outfit| outfit.season == *season);
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, query.page(), query.limit(), query.offset()))
    }

    async fn dump(&self) -> StoreResult<CatalogDump> {
        Ok(CatalogDump {
            tags: self.read_all(TAGS_TABLE)?,
            clothes: self.read_all(CLOTHES_TABLE)?,
            outfits: self.read_all(OUTFITS_TABLE)?,
        })
    }
}
