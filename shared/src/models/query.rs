//! List Query Types
//!
//! Shared pagination and filter contracts for the browse endpoints.
//! Lists page by over-fetching one row (`limit + 1`) instead of counting,
//! so `has_more` costs nothing extra on either storage backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 默认/上限页大小
pub const CLOTHES_PAGE_SIZE: u32 = 15;
pub const OUTFITS_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    /// 页码 (从 1 开始)
    pub page: u32,
    /// 每页数量
    pub limit: u32,
    pub has_more: bool,
}

impl<T> Paged<T> {
    /// Build a page from an over-fetched result (`limit + 1` rows requested)
    pub fn from_overfetch(mut data: Vec<T>, page: u32, limit: u32) -> Self {
        let has_more = data.len() > limit as usize;
        if has_more {
            data.truncate(limit as usize);
        }
        Self {
            data,
            page,
            limit,
            has_more,
        }
    }
}

/// Clothing browse query.
///
/// `filters` maps an attribute field name to the accepted values: a record
/// matches when, for every filtered field, its stored value is one of the
/// listed values (OR within a field, AND across fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_clothes_limit")]
    pub page_size: u32,
}

// Default must agree with the serde field defaults, or an empty JSON body
// and a Rust-side `..Default::default()` would paginate differently.
impl Default for ClothingQuery {
    fn default() -> Self {
        Self {
            category: None,
            filters: BTreeMap::new(),
            page: default_page(),
            page_size: default_clothes_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitQuery {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_outfits_limit")]
    pub page_size: u32,
}

impl Default for OutfitQuery {
    fn default() -> Self {
        Self {
            season: None,
            page: default_page(),
            page_size: default_outfits_limit(),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_clothes_limit() -> u32 {
    CLOTHES_PAGE_SIZE
}

fn default_outfits_limit() -> u32 {
    OUTFITS_PAGE_SIZE
}

impl ClothingQuery {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.limit()
    }
}

impl OutfitQuery {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.limit()
    }
}
