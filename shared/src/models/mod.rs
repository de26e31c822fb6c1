//! Catalog Models

pub mod clothing;
pub mod outfit;
pub mod query;
pub mod tag;

// Re-exports
pub use clothing::{
    CATEGORIES, CATEGORY_ACCESSORY, CATEGORY_BOTTOM, CATEGORY_TOP, ClothingCreate, ClothingItem,
    ClothingUpdate,
};
pub use outfit::{Outfit, OutfitCreate, OutfitDetail, OutfitUpdate, compute_fallback_image};
pub use query::{
    CLOTHES_PAGE_SIZE, ClothingQuery, MAX_PAGE_SIZE, OUTFITS_PAGE_SIZE, OutfitQuery, Paged,
};
pub use tag::{SizeField, TagDefinition, TagPayload};
