//! Built-in definition set.
//!
//! Initialization upserts these by id: re-running against an existing store
//! updates the stored copies instead of duplicating them.

use crate::models::{
    CATEGORY_ACCESSORY, CATEGORY_BOTTOM, CATEGORY_TOP, SizeField, TagDefinition,
};
use crate::schema::{BUILTIN_SEASON_ID, builtin_season};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The fixed definitions every fresh catalog starts from.
///
/// The season entry is the engine constant itself, builtin flag included,
/// so a seeded store rejects mutations against it without any help from
/// the load-time re-flagging.
pub fn seed_definitions() -> Vec<TagDefinition> {
    vec![
        builtin_season(),
        TagDefinition::attribute(
            "sleeveType_definition",
            "袖型",
            "sleeveType",
            strings(&[CATEGORY_TOP]),
            strings(&["弓袋袖", "飞机袖", "半袖", "比甲", "吊带"]),
        ),
        TagDefinition::attribute(
            "collarType_definition",
            "领型",
            "collarType",
            strings(&[CATEGORY_TOP]),
            strings(&["方领", "圆领", "直领", "交领"]),
        ),
        TagDefinition::attribute(
            "skirtType_definition",
            "下裙类型",
            "skirtType",
            strings(&[CATEGORY_BOTTOM]),
            strings(&["马面", "百迭", "旋裙", "破裙", "其他"]),
        ),
        TagDefinition::attribute(
            "accessoryType_definition",
            "配饰类型",
            "accessoryType",
            strings(&[CATEGORY_ACCESSORY]),
            strings(&["发簪", "禁步", "璎珞", "手链", "耳饰", "胸针"]),
        ),
        TagDefinition::size(
            "top_size_definition",
            "上衣尺寸",
            strings(&[CATEGORY_TOP]),
            vec![
                SizeField::new("尺码", "例如: M / L / 均码"),
                SizeField::new("衣长", "例如: 70cm"),
                SizeField::new("胸围", "例如: 120cm"),
                SizeField::new("通袖", "例如: 180cm"),
                SizeField::new("领围", "例如: 40cm"),
                SizeField::new("袖口", "例如: 30cm"),
                SizeField::new("袖根", "例如: 50cm"),
            ],
        ),
        TagDefinition::size(
            "bottom_size_definition",
            "下裙尺寸",
            strings(&[CATEGORY_BOTTOM]),
            vec![
                SizeField::new("尺码", "例如: M / L / 均码"),
                SizeField::new("裙长", "例如: 100cm"),
                SizeField::new("腰围", "例如: 70cm"),
                SizeField::new("裙门", "例如: 20cm"),
                SizeField::new("裙腰长", "例如: 100cm"),
                SizeField::new("摆围", "例如: 3m"),
            ],
        ),
    ]
}
