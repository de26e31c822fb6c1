//! Storage port for the wardrobe catalog.
//!
//! Handlers talk to [`WardrobeStore`] only; the concrete backend is picked
//! at startup from configuration:
//!
//! - [`SurrealStore`] — 嵌入式 SurrealDB (RocksDB 引擎)
//! - [`RedbStore`] — 纯 KV 存储 (redb)
//!
//! Both adapters apply schema mutations through the same pure
//! [`shared::apply_mutation`], so a mutation that fails validation never
//! leaves a partial write in either backend.

pub mod kv;
pub mod surreal;

pub use kv::RedbStore;
pub use surreal::SurrealStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::schema::TagMutation;
use shared::{
    ClothingItem, ClothingQuery, ClothingUpdate, Outfit, OutfitQuery, OutfitUpdate, Paged,
    SchemaError, TagDefinition,
};

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(err: redb::DatabaseError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Database(format!("serialization: {}", err))
    }
}

/// Schema errors surface through the store on the mutation path; keep the
/// three families apart so the API layer can map them to status codes.
impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        if err.is_conflict() {
            StoreError::Duplicate(err.to_string())
        } else if err.is_not_found() {
            StoreError::NotFound(err.to_string())
        } else {
            StoreError::Validation(err.to_string())
        }
    }
}

/// Full catalog snapshot, used by data transfer and the image cleanup
/// reference re-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDump {
    pub tags: Vec<TagDefinition>,
    pub clothes: Vec<ClothingItem>,
    pub outfits: Vec<Outfit>,
}

/// The storage port.
///
/// Upserts (`put_*`) return `true` when the write created the record and
/// `false` when it replaced an existing one; deletes return whether a
/// record was actually removed. Updates apply the partial DTO inside the
/// adapter and fail with [`StoreError::NotFound`] for unknown ids.
///
/// `update_outfit` re-derives `fallback_image_url` from the referenced
/// clothes whenever the reference list changes; the rule itself lives in
/// [`shared::models::outfit::compute_fallback_image`].
#[async_trait]
pub trait WardrobeStore: Send + Sync {
    // ========== 标签 ==========
    async fn list_tags(&self) -> StoreResult<Vec<TagDefinition>>;
    async fn get_tag(&self, id: &str) -> StoreResult<Option<TagDefinition>>;
    async fn put_tag(&self, tag: &TagDefinition) -> StoreResult<bool>;
    async fn mutate_tag(&self, id: &str, mutation: &TagMutation) -> StoreResult<TagDefinition>;

    // ========== 衣物 ==========
    async fn put_clothing(&self, item: &ClothingItem) -> StoreResult<bool>;
    async fn get_clothing(&self, id: &str) -> StoreResult<Option<ClothingItem>>;
    async fn update_clothing(&self, id: &str, update: &ClothingUpdate)
    -> StoreResult<ClothingItem>;
    async fn delete_clothing(&self, id: &str) -> StoreResult<bool>;
    async fn query_clothes(&self, query: &ClothingQuery) -> StoreResult<Paged<ClothingItem>>;
    /// Batch lookup preserving the input id order; unknown ids are skipped.
    async fn get_clothes_batch(&self, ids: &[String]) -> StoreResult<Vec<ClothingItem>>;

    // ========== 穿搭 ==========
    async fn put_outfit(&self, outfit: &Outfit) -> StoreResult<bool>;
    async fn get_outfit(&self, id: &str) -> StoreResult<Option<Outfit>>;
    async fn update_outfit(&self, id: &str, update: &OutfitUpdate) -> StoreResult<Outfit>;
    async fn delete_outfit(&self, id: &str) -> StoreResult<bool>;
    async fn query_outfits(&self, query: &OutfitQuery) -> StoreResult<Paged<Outfit>>;

    // ========== 全量 ==========
    async fn dump(&self) -> StoreResult<CatalogDump>;
}

/// Page an already-ordered result set in memory.
///
/// Catalog scale is a few thousand records at most, so both adapters slice
/// the ordered match set here instead of pushing LIMIT/START into the
/// backend; `limit + 1` rows feed [`Paged::from_overfetch`].
pub(crate) fn paginate<T>(rows: Vec<T>, page: u32, limit: u32, offset: u32) -> Paged<T> {
    let window: Vec<T> = rows
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize + 1)
        .collect();
    Paged::from_overfetch(window, page, limit)
}

/// 过滤字段名必须是普通标识符 — 它们会出现在后端查询表达式里。
/// 正常请求经过标签引擎校验后不会触发；这里兜底拦截直接打到存储层的值。
pub(crate) fn ensure_safe_filter_field(field: &str) -> StoreResult<()> {
    let mut chars = field.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic());
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "非法的过滤字段名: {}",
            field
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_families_map_to_store_families() {
        let dup: StoreError = SchemaError::OptionExists("半袖".to_string()).into();
        assert!(matches!(dup, StoreError::Duplicate(_)));

        let missing: StoreError = SchemaError::FieldNotFound("裙长".to_string()).into();
        assert!(matches!(missing, StoreError::NotFound(_)));

        let invalid: StoreError =
            SchemaError::BuiltinImmutable("season_definition".to_string()).into();
        assert!(matches!(invalid, StoreError::Validation(_)));
    }

    #[test]
    fn filter_field_guard_rejects_query_fragments() {
        assert!(ensure_safe_filter_field("sleeveType").is_ok());
        assert!(ensure_safe_filter_field("skirt_type2").is_ok());
        assert!(ensure_safe_filter_field("bad field").is_err());
        assert!(ensure_safe_filter_field("1field").is_err());
        assert!(ensure_safe_filter_field("a;DROP").is_err());
        assert!(ensure_safe_filter_field("").is_err());
    }

    #[test]
    fn paginate_windows_an_ordered_set() {
        let rows: Vec<u32> = (1..=7).collect();
        let first = paginate(rows.clone(), 1, 3, 0);
        assert_eq!(first.data, vec![1, 2, 3]);
        assert!(first.has_more);

        let last = paginate(rows, 3, 3, 6);
        assert_eq!(last.data, vec![7]);
        assert!(!last.has_more);
    }
}
