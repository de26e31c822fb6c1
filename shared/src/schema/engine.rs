//! Schema snapshot and category resolution.
//!
//! [`TagSchema::load`] validates the stored definition set once, injects the
//! built-in season definition, and builds a category → definition lookup
//! table; the per-request operations are plain map reads after that.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::SchemaError;
use crate::models::{CATEGORIES, ClothingItem, SizeField, TagDefinition, TagPayload};

/// 内置季节标签 — always present at read time, never admin-managed
pub const BUILTIN_SEASON_ID: &str = "season_definition";
pub const SEASON_FIELD: &str = "season";
pub const SEASONS: [&str; 3] = ["夏", "春秋", "冬"];

/// Record keys owned by the clothing document itself; tag fields must not
/// shadow them or the flattened record would produce duplicate keys.
const RESERVED_RECORD_KEYS: [&str; 7] = [
    "id",
    "name",
    "category",
    "remark",
    "image_url",
    "sizes",
    "created_at",
];

/// Admin display priority for attribute tags; unlisted tags keep their
/// stored relative order after the named ones.
const MANAGE_PRIORITY: [&str; 4] = ["袖型", "领型", "下裙类型", "配饰类型"];

pub const ATTRIBUTE_GROUP_LABEL: &str = "衣物属性";
pub const SIZE_GROUP_LABEL: &str = "尺寸";

/// The engine-level season constant, merged into every read result when the
/// store holds no copy of its own.
pub fn builtin_season() -> TagDefinition {
    let mut tag = TagDefinition::attribute(
        BUILTIN_SEASON_ID,
        "季节",
        SEASON_FIELD,
        CATEGORIES.iter().map(|c| c.to_string()).collect(),
        SEASONS.iter().map(|s| s.to_string()).collect(),
    );
    tag.builtin = true;
    tag
}

/// One attribute picker resolved for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePicker {
    pub tag_id: String,
    pub name: String,
    pub field: String,
    pub options: Vec<String>,
}

/// Resolved form fields for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFields {
    pub attributes: Vec<AttributePicker>,
    pub sizes: Vec<SizeField>,
}

impl CategoryFields {
    pub fn empty() -> Self {
        Self {
            attributes: Vec::new(),
            sizes: Vec::new(),
        }
    }
}

/// A record's current values viewed through the schema, for edit-form
/// prefill: attributes carry only present, non-empty values; sizes carry
/// every schema key, defaulted to "" when the record has no measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormValues {
    pub attributes: BTreeMap<String, String>,
    pub sizes: BTreeMap<String, String>,
}

/// Admin management listing group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagGroup {
    pub group: String,
    pub tags: Vec<TagDefinition>,
}

/// Validated schema snapshot
#[derive(Debug, Clone)]
pub struct TagSchema {
    tags: Vec<TagDefinition>,
    by_category: BTreeMap<String, Vec<usize>>,
}

impl TagSchema {
    /// Build a schema from the stored definition set.
    ///
    /// The stored `season_definition` is force-flagged builtin; when the
    /// store has none, the engine constant is injected at the front. The
    /// whole set is then validated — invalid definitions are rejected here,
    /// at write/load time, never papered over at read time.
    pub fn load(stored: Vec<TagDefinition>) -> Result<Self, SchemaError> {
        let mut tags = stored;
        match tags.iter_mut().find(|t| t.id == BUILTIN_SEASON_ID) {
            Some(season) => season.builtin = true,
            None => tags.insert(0, builtin_season()),
        }
        validate_definitions(&tags)?;

        let mut by_category: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, tag) in tags.iter().enumerate() {
            for category in &tag.category {
                by_category.entry(category.clone()).or_default().push(idx);
            }
        }
        Ok(Self { tags, by_category })
    }

    /// Degraded schema used when the backing store cannot be read: every
    /// resolution comes back empty instead of failing closed.
    pub fn empty() -> Self {
        Self {
            tags: Vec::new(),
            by_category: BTreeMap::new(),
        }
    }

    /// Full definition view, builtin included
    pub fn tags(&self) -> &[TagDefinition] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&TagDefinition> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// All attribute storage fields known to the schema (builtin included)
    pub fn attribute_fields(&self) -> BTreeSet<&str> {
        self.tags.iter().filter_map(|t| t.field()).collect()
    }

    /// Resolve the form fields for a category: attribute pickers applicable
    /// to it (builtin excluded — callers render the season picker from the
    /// fixed constant) and the size fields of its single size definition.
    /// Empty or unknown category resolves to empty lists.
    pub fn fields_for(&self, category: &str) -> CategoryFields {
        let mut resolved = CategoryFields::empty();
        let Some(indices) = self.by_category.get(category) else {
            return resolved;
        };
        for &idx in indices {
            let tag = &self.tags[idx];
            match &tag.payload {
                TagPayload::Attribute { field, options } => {
                    if !tag.builtin {
                        resolved.attributes.push(AttributePicker {
                            tag_id: tag.id.clone(),
                            name: tag.name.clone(),
                            field: field.clone(),
                            options: options.clone(),
                        });
                    }
                }
                // at most one per category, enforced by load()
                TagPayload::Size { fields } => resolved.sizes = fields.clone(),
            }
        }
        resolved
    }

    /// Extract a record's attribute values back into a flat map, using the
    /// schema as the field-name allowlist: present, non-empty values only.
    /// Size values are prefilled per the record's category, "" when unset.
    pub fn extract(&self, item: &ClothingItem) -> FormValues {
        let mut attributes = BTreeMap::new();
        for tag in &self.tags {
            if let TagPayload::Attribute { field, .. } = &tag.payload
                && let Some(value) = item.attribute(field)
                && !value.is_empty()
            {
                attributes.insert(field.clone(), value.to_string());
            }
        }

        let mut sizes = BTreeMap::new();
        for size_field in self.fields_for(&item.category).sizes {
            let value = item.sizes.get(&size_field.key).cloned().unwrap_or_default();
            sizes.insert(size_field.key, value);
        }
        FormValues { attributes, sizes }
    }

    /// Admin management listing: builtin excluded, grouped 衣物属性 / 尺寸,
    /// attribute tags ordered by the fixed priority list with unlisted tags
    /// keeping their stored order after the named ones (stable sort).
    pub fn managed_groups(&self) -> Vec<TagGroup> {
        let mut attribute_tags: Vec<TagDefinition> = self
            .tags
            .iter()
            .filter(|t| !t.builtin && t.is_attribute())
            .cloned()
            .collect();
        attribute_tags.sort_by_key(|t| {
            MANAGE_PRIORITY
                .iter()
                .position(|name| *name == t.name)
                .unwrap_or(MANAGE_PRIORITY.len())
        });

        let size_tags: Vec<TagDefinition> = self
            .tags
            .iter()
            .filter(|t| !t.builtin && t.is_size())
            .cloned()
            .collect();

        vec![
            TagGroup {
                group: ATTRIBUTE_GROUP_LABEL.to_string(),
                tags: attribute_tags,
            },
            TagGroup {
                group: SIZE_GROUP_LABEL.to_string(),
                tags: size_tags,
            },
        ]
    }

    /// Write-time allowlist check for clothing payloads: every provided
    /// attribute key must belong to an attribute tag applicable to the
    /// category (season included), every size key to its size definition.
    /// Values are deliberately not checked against `options` — removing an
    /// option later must not invalidate stored records.
    pub fn validate_item_keys(
        &self,
        category: &str,
        attributes: &BTreeMap<String, String>,
        sizes: &BTreeMap<String, String>,
    ) -> Result<(), SchemaError> {
        let mut allowed_fields: BTreeSet<&str> = BTreeSet::new();
        let mut allowed_sizes: BTreeSet<&str> = BTreeSet::new();
        if let Some(indices) = self.by_category.get(category) {
            for &idx in indices {
                match &self.tags[idx].payload {
                    TagPayload::Attribute { field, .. } => {
                        allowed_fields.insert(field);
                    }
                    TagPayload::Size { fields } => {
                        allowed_sizes.extend(fields.iter().map(|f| f.key.as_str()));
                    }
                }
            }
        }

        for key in attributes.keys() {
            if !allowed_fields.contains(key.as_str()) {
                return Err(SchemaError::UnknownField(key.clone()));
            }
        }
        for key in sizes.keys() {
            if !allowed_sizes.contains(key.as_str()) {
                return Err(SchemaError::UnknownField(key.clone()));
            }
        }
        Ok(())
    }
}

/// Attribute storage fields must be plain identifiers: they become top-level
/// document keys and appear verbatim in backend query expressions.
fn is_safe_field(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_definitions(tags: &[TagDefinition]) -> Result<(), SchemaError> {
    let mut seen_ids = BTreeSet::new();
    // category -> attribute fields / size-tag owner already seen
    let mut fields_per_category: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut size_tag_per_category: BTreeMap<&str, &str> = BTreeMap::new();

    for tag in tags {
        if tag.id.is_empty() {
            return Err(SchemaError::Invalid(format!("标签 {} 缺少 ID", tag.name)));
        }
        if !seen_ids.insert(tag.id.as_str()) {
            return Err(SchemaError::Invalid(format!("重复的标签 ID: {}", tag.id)));
        }
        if tag.category.is_empty() {
            return Err(SchemaError::Invalid(format!(
                "标签 {} 未指定适用分类",
                tag.id
            )));
        }

        match &tag.payload {
            TagPayload::Attribute { field, options } => {
                if !is_safe_field(field) {
                    return Err(SchemaError::Invalid(format!(
                        "标签 {} 的字段名不可用: {}",
                        tag.id, field
                    )));
                }
                if RESERVED_RECORD_KEYS.contains(&field.as_str()) {
                    return Err(SchemaError::Invalid(format!(
                        "标签 {} 的字段名与记录字段冲突: {}",
                        tag.id, field
                    )));
                }
                if field == SEASON_FIELD && tag.id != BUILTIN_SEASON_ID {
                    return Err(SchemaError::Invalid(format!(
                        "字段 season 由内置标签占用: {}",
                        tag.id
                    )));
                }
                let mut seen_options = BTreeSet::new();
                for option in options {
                    if !seen_options.insert(option.as_str()) {
                        return Err(SchemaError::Invalid(format!(
                            "标签 {} 存在重复选项: {}",
                            tag.id, option
                        )));
                    }
                }
                for category in &tag.category {
                    if !fields_per_category
                        .entry(category.as_str())
                        .or_default()
                        .insert(field.as_str())
                    {
                        return Err(SchemaError::Invalid(format!(
                            "分类 {} 的字段 {} 被多个标签使用",
                            category, field
                        )));
                    }
                }
            }
            TagPayload::Size { fields } => {
                let mut seen_keys = BTreeSet::new();
                for size_field in fields {
                    if size_field.key.is_empty() {
                        return Err(SchemaError::Invalid(format!(
                            "标签 {} 存在空的尺寸字段名",
                            tag.id
                        )));
                    }
                    if !seen_keys.insert(size_field.key.as_str()) {
                        return Err(SchemaError::Invalid(format!(
                            "标签 {} 存在重复尺寸字段: {}",
                            tag.id, size_field.key
                        )));
                    }
                }
                for category in &tag.category {
                    if size_tag_per_category
                        .insert(category.as_str(), tag.id.as_str())
                        .is_some()
                    {
                        return Err(SchemaError::DuplicateSizeTag(category.to_string()));
                    }
                }
            }
        }
    }
    Ok(())
}
