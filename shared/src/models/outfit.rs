//! Outfit Model
//!
//! An outfit is an ordered set of clothing item references plus an optional
//! combined photo. When no photo is uploaded the cover falls back to the
//! first referenced 下裙 image, else the first 上衣 image.

use serde::{Deserialize, Serialize};

use super::clothing::{CATEGORY_BOTTOM, CATEGORY_TOP, ClothingItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// 夏 / 春秋 / 冬
    pub season: String,
    /// Referenced clothing item ids, in composition order.
    /// References are not enforced after the fact: deleting an item leaves
    /// a dangling id here, skipped when the detail view resolves items.
    #[serde(default)]
    pub clothes: Vec<String>,
    /// User-uploaded combined photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outfit_image_url: Option<String>,
    /// Derived cover, recomputed whenever `clothes` changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_image_url: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitCreate {
    pub name: String,
    pub season: String,
    #[serde(default)]
    pub clothes: Vec<String>,
    #[serde(default)]
    pub outfit_image_url: Option<String>,
}

impl OutfitCreate {
    pub fn into_outfit(self, id: String, created_at: i64) -> Outfit {
        Outfit {
            id,
            name: self.name,
            season: self.season,
            clothes: self.clothes,
            outfit_image_url: self.outfit_image_url,
            fallback_image_url: None,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutfitUpdate {
    pub name: Option<String>,
    pub season: Option<String>,
    pub clothes: Option<Vec<String>>,
    pub outfit_image_url: Option<String>,
}

impl OutfitUpdate {
    pub fn apply_to(&self, outfit: &mut Outfit) {
        if let Some(name) = &self.name {
            outfit.name = name.clone();
        }
        if let Some(season) = &self.season {
            outfit.season = season.clone();
        }
        if let Some(clothes) = &self.clothes {
            outfit.clothes = clothes.clone();
        }
        if let Some(outfit_image_url) = &self.outfit_image_url {
            outfit.outfit_image_url = Some(outfit_image_url.clone());
        }
    }
}

/// Detail view: referenced items resolved and grouped by category,
/// preserving the outfit's reference order within each group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitDetail {
    pub outfit: Outfit,
    pub tops: Vec<ClothingItem>,
    pub bottoms: Vec<ClothingItem>,
    pub accessories: Vec<ClothingItem>,
}

/// Cover image fallback: first 下裙 image, else first 上衣 image.
/// `items` must be in the outfit's reference order.
pub fn compute_fallback_image(items: &[ClothingItem]) -> Option<String> {
    let first_with_image = |category: &str| {
        items
            .iter()
            .find(|item| item.category == category && item.image_url.is_some())
            .and_then(|item| item.image_url.clone())
    };
    first_with_image(CATEGORY_BOTTOM).or_else(|| first_with_image(CATEGORY_TOP))
}
