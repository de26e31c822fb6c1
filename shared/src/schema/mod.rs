//! Tag Schema Engine
//!
//! Owns the set of tag definitions and everything derived from it:
//!
//! - [`TagSchema`] — validated schema snapshot with a category lookup table,
//!   resolving which attribute pickers and size fields apply to a category
//!   and mapping records back into edit-form values
//! - [`TagMutation`] / [`apply_mutation`] — the admin mutation protocol,
//!   applied identically by every storage backend
//! - [`seed_definitions`] — the fixed built-in definition set
//!
//! The engine is pure logic: loading definitions from a store and persisting
//! mutated ones stays with the caller.

pub mod engine;
pub mod mutation;
pub mod seed;

pub use engine::{
    AttributePicker, BUILTIN_SEASON_ID, CategoryFields, FormValues, SEASON_FIELD, SEASONS,
    TagGroup, TagSchema, builtin_season,
};
pub use mutation::{TagMutation, apply_mutation};
pub use seed::seed_definitions;

/// Schema-level errors.
///
/// The three families matter to callers: "already exists" (conflict),
/// "not found" (missing option/field), and everything else (validation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("选项已存在: {0}")]
    OptionExists(String),

    #[error("选项不存在: {0}")]
    OptionNotFound(String),

    #[error("尺寸字段已存在: {0}")]
    FieldExists(String),

    #[error("尺寸字段不存在: {0}")]
    FieldNotFound(String),

    #[error("内置标签不可修改: {0}")]
    BuiltinImmutable(String),

    #[error("操作与标签类型不符: {0}")]
    KindMismatch(String),

    #[error("分类 {0} 已有尺寸标签定义")]
    DuplicateSizeTag(String),

    #[error("未知字段: {0}")]
    UnknownField(String),

    #[error("标签定义无效: {0}")]
    Invalid(String),
}

impl SchemaError {
    /// Conflict family ("already exists")
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::OptionExists(_) | Self::FieldExists(_))
    }

    /// Missing-target family
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OptionNotFound(_) | Self::FieldNotFound(_))
    }
}
