//! Clothing Item Model
//!
//! Clothing records are stored denormalized: every attribute value selected
//! through the tag schema (season, sleeveType, collarType, ...) sits at the
//! top level of the record under its tag's `field` name, while size
//! measurements stay nested under `sizes`. The flatten below reproduces that
//! document shape exactly, so both storage backends persist the same JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 固定分类
pub const CATEGORY_TOP: &str = "上衣";
pub const CATEGORY_BOTTOM: &str = "下裙";
pub const CATEGORY_ACCESSORY: &str = "配饰";

pub const CATEGORIES: [&str; 3] = [CATEGORY_TOP, CATEGORY_BOTTOM, CATEGORY_ACCESSORY];

/// Clothing item (denormalized flat record)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// 上衣 / 下裙 / 配饰
    pub category: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 创建时间 (epoch millis)
    #[serde(default)]
    pub created_at: i64,
    /// 尺寸表 keyed by measurement name — kept nested, never flattened
    #[serde(default)]
    pub sizes: BTreeMap<String, String>,
    /// Attribute fields at the top level of the document (season 等)
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl ClothingItem {
    /// Attribute value stored under a tag field name
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(|v| v.as_str())
    }
}

/// Create payload — id 和 created_at 由服务端生成
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingCreate {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub sizes: BTreeMap<String, String>,
}

impl ClothingCreate {
    pub fn into_item(self, id: String, created_at: i64) -> ClothingItem {
        ClothingItem {
            id,
            name: self.name,
            category: self.category,
            remark: self.remark,
            image_url: self.image_url,
            created_at,
            sizes: self.sizes,
            attributes: self.attributes,
        }
    }
}

/// Update payload — merge semantics, matching how records evolve in place:
/// scalar fields replace when provided, `attributes` overwrites the provided
/// keys and leaves the rest untouched (a field removed from the schema stays
/// inert on old records), `sizes` replaces the whole nested map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClothingUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub remark: Option<String>,
    pub image_url: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub sizes: Option<BTreeMap<String, String>>,
}

impl ClothingUpdate {
    pub fn apply_to(&self, item: &mut ClothingItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(remark) = &self.remark {
            item.remark = remark.clone();
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = Some(image_url.clone());
        }
        if let Some(attributes) = &self.attributes {
            for (field, value) in attributes {
                item.attributes.insert(field.clone(), value.clone());
            }
        }
        if let Some(sizes) = &self.sizes {
            item.sizes = sizes.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ClothingItem {
        ClothingItem {
            id: "c1".to_string(),
            name: "妆花马面".to_string(),
            category: CATEGORY_BOTTOM.to_string(),
            remark: String::new(),
            image_url: Some("/api/image/abc.jpg".to_string()),
            created_at: 1_700_000_000_000,
            sizes: BTreeMap::from([("裙长".to_string(), "98cm".to_string())]),
            attributes: BTreeMap::from([
                ("season".to_string(), "冬".to_string()),
                ("skirtType".to_string(), "马面".to_string()),
            ]),
        }
    }

    #[test]
    fn attributes_flatten_to_top_level() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["skirtType"], "马面");
        assert_eq!(json["season"], "冬");
        assert_eq!(json["sizes"]["裙长"], "98cm");
        // no nested "attributes" key in the stored document
        assert!(json.get("attributes").is_none());
    }

    #[test]
    fn flat_document_deserializes_back() {
        let json = r#"{
            "id": "c2",
            "name": "交领上袄",
            "category": "上衣",
            "created_at": 1,
            "season": "冬",
            "sleeveType": "弓袋袖",
            "sizes": {"衣长": "70cm"}
        }"#;
        let item: ClothingItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.attribute("sleeveType"), Some("弓袋袖"));
        assert_eq!(item.attributes.len(), 2);
        assert_eq!(item.sizes["衣长"], "70cm");
        assert_eq!(item.remark, "");
    }

    #[test]
    fn update_overwrites_provided_attribute_keys_only() {
        let mut item = sample_item();
        let update = ClothingUpdate {
            attributes: Some(BTreeMap::from([(
                "skirtType".to_string(),
                "百迭".to_string(),
            )])),
            ..Default::default()
        };
        update.apply_to(&mut item);
        assert_eq!(item.attribute("skirtType"), Some("百迭"));
        // untouched keys survive the merge
        assert_eq!(item.attribute("season"), Some("冬"));
    }

    #[test]
    fn update_replaces_sizes_wholesale() {
        let mut item = sample_item();
        let update = ClothingUpdate {
            sizes: Some(BTreeMap::from([("腰围".to_string(), "66cm".to_string())])),
            ..Default::default()
        };
        update.apply_to(&mut item);
        assert_eq!(item.sizes.len(), 1);
        assert!(!item.sizes.contains_key("裙长"));
    }

    #[test]
    fn update_keeps_unset_scalars() {
        let mut item = sample_item();
        let update = ClothingUpdate {
            name: Some("改名".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut item);
        assert_eq!(item.name, "改名");
        assert_eq!(item.category, CATEGORY_BOTTOM);
        assert_eq!(item.image_url.as_deref(), Some("/api/image/abc.jpg"));
    }
}
