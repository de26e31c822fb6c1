//! Shared types for the wardrobe catalog.
//!
//! Catalog models, the tag schema engine, and small utilities used by the
//! server crate. Everything here is storage-agnostic: the engine consumes
//! and produces plain models, and the server's storage adapters decide how
//! those are persisted.

pub mod models;
pub mod schema;
pub mod util;

// Re-exports
pub use models::{
    ClothingCreate, ClothingItem, ClothingQuery, ClothingUpdate, Outfit, OutfitCreate,
    OutfitDetail, OutfitQuery, OutfitUpdate, Paged, SizeField, TagDefinition, TagPayload,
};
pub use schema::{SchemaError, TagMutation, TagSchema, apply_mutation, seed_definitions};
pub use util::{now_millis, record_id};
