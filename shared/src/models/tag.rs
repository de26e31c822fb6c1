//! Tag Definition Model
//!
//! A tag definition is one schema unit of the dynamic wardrobe form system.
//! Options (attribute tags) and measurement fields (size tags) are embedded
//! directly in the definition record; clothing records reference tag fields
//! by name only (no foreign key).

use serde::{Deserialize, Serialize};

/// 尺寸子字段 (embedded in size tags)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeField {
    /// Measurement name, e.g. "裙长" — immutable once created
    pub key: String,
    /// Sample-value hint shown in the empty input, e.g. "例如: 100cm"
    #[serde(default)]
    pub placeholder: String,
}

impl SizeField {
    pub fn new(key: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            placeholder: placeholder.into(),
        }
    }
}

/// Tag payload, discriminated by the stored `type` field.
///
/// A definition document either carries `field` + `options` (attribute)
/// or `fields` (size) — never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TagPayload {
    /// Closed enumerated option list for a single storage field
    Attribute {
        /// Storage key on clothing records, e.g. "sleeveType"
        field: String,
        /// Allowed values; insertion order is display order
        options: Vec<String>,
    },
    /// Ordered group of named measurement inputs
    Size { fields: Vec<SizeField> },
}

/// Tag definition (with embedded options / fields)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Stable identifier, e.g. "sleeveType_definition" — immutable
    #[serde(default)]
    pub id: String,
    /// Human-readable label, e.g. "袖型"
    pub name: String,
    /// 适用分类 (never empty for a usable tag)
    pub category: Vec<String>,
    /// Engine-injected definitions are flagged so management surfaces can
    /// filter them by capability, not by magic name comparison
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub builtin: bool,
    #[serde(flatten)]
    pub payload: TagPayload,
}

impl TagDefinition {
    pub fn attribute(
        id: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
        category: Vec<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            builtin: false,
            payload: TagPayload::Attribute {
                field: field.into(),
                options,
            },
        }
    }

    pub fn size(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Vec<String>,
        fields: Vec<SizeField>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            builtin: false,
            payload: TagPayload::Size { fields },
        }
    }

    /// Whether this tag applies to the given category
    pub fn applies_to(&self, category: &str) -> bool {
        self.category.iter().any(|c| c == category)
    }

    /// Attribute storage field name, if this is an attribute tag
    pub fn field(&self) -> Option<&str> {
        match &self.payload {
            TagPayload::Attribute { field, .. } => Some(field),
            TagPayload::Size { .. } => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.payload, TagPayload::Attribute { .. })
    }

    pub fn is_size(&self) -> bool {
        matches!(self.payload, TagPayload::Size { .. })
    }
}
