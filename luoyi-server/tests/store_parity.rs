//! Cross-backend storage contract tests.
//!
//! Every scenario runs against both adapters with identical assertions,
//! so behavioral drift between the SurrealDB and redb backends shows up
//! here instead of in production. Timestamps in fixtures are distinct on
//! purpose — list order is created_at descending and ties are unspecified.

use std::collections::BTreeMap;

use luoyi_server::store::{RedbStore, StoreError, SurrealStore, WardrobeStore};
use shared::schema::TagMutation;
use shared::{
    ClothingItem, ClothingQuery, ClothingUpdate, Outfit, OutfitQuery, OutfitUpdate, TagPayload,
    seed_definitions,
};

async fn surreal_store() -> (SurrealStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SurrealStore::open(dir.path().join("wardrobe.db"))
        .await
        .expect("open surreal store");
    (store, dir)
}

fn redb_store() -> RedbStore {
    RedbStore::open_in_memory().expect("open redb store")
}

/// 为每个场景生成两个后端的测试
macro_rules! parity {
    ($($scenario:ident),+ $(,)?) => {
        $(
            mod $scenario {
                use super::*;

                #[tokio::test]
                async fn surreal() {
                    let (store, _dir) = surreal_store().await;
                    super::$scenario(&store).await;
                }

                #[tokio::test]
                async fn redb() {
                    let store = redb_store();
                    super::$scenario(&store).await;
                }
            }
        )+
    };
}

parity!(
    tag_upsert_counts_and_order,
    mutations_persist_without_partial_writes,
    clothing_crud_round_trip,
    clothing_filters_follow_or_and_semantics,
    clothing_pagination_overfetches,
    batch_lookup_preserves_reference_order,
    outfit_fallback_recomputes_on_reference_change,
    outfit_season_browse,
    dump_covers_all_entities,
);

fn item(
    id: &str,
    name: &str,
    category: &str,
    created_at: i64,
    attrs: &[(&str, &str)],
    image: Option<&str>,
) -> ClothingItem {
    ClothingItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        remark: String::new(),
        image_url: image.map(|s| s.to_string()),
        created_at,
        sizes: BTreeMap::new(),
        attributes: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn ids(items: &[ClothingItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

fn options_of(tag: &shared::TagDefinition) -> Vec<String> {
    match &tag.payload {
        TagPayload::Attribute { options, .. } => options.clone(),
        TagPayload::Size { .. } => panic!("expected attribute tag"),
    }
}

async fn seed(store: &dyn WardrobeStore) {
    for tag in seed_definitions() {
        store.put_tag(&tag).await.expect("seed tag");
    }
}

async fn tag_upsert_counts_and_order(store: &dyn WardrobeStore) {
    for tag in seed_definitions() {
        assert!(
            store.put_tag(&tag).await.unwrap(),
            "first write must create {}",
            tag.id
        );
    }
    for tag in seed_definitions() {
        assert!(
            !store.put_tag(&tag).await.unwrap(),
            "second write must replace {}",
            tag.id
        );
    }

    let tags = store.list_tags().await.unwrap();
    assert_eq!(tags.len(), 7);

    // 两后端统一按 id 字典序返回
    let listed: Vec<&str> = tags.iter().map(|t| t.id.as_str()).collect();
    let mut sorted = listed.clone();
    sorted.sort_unstable();
    assert_eq!(listed, sorted);
}

async fn mutations_persist_without_partial_writes(store: &dyn WardrobeStore) {
    seed(store).await;

    let push = TagMutation::PushOption {
        value: "琵琶袖".to_string(),
    };
    let updated = store
        .mutate_tag("sleeveType_definition", &push)
        .await
        .unwrap();
    assert!(options_of(&updated).contains(&"琵琶袖".to_string()));

    // 变更必须已落库
    let reread = store
        .get_tag("sleeveType_definition")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread, updated);

    // 重复 push → Duplicate，存储保持不变
    let err = store
        .mutate_tag("sleeveType_definition", &push)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)), "got {:?}", err);
    let after = store
        .get_tag("sleeveType_definition")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, reread);

    // 不存在的标签 → NotFound
    let err = store
        .mutate_tag("ghost_definition", &push)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    // 内置季节 → Validation
    let err = store
        .mutate_tag("season_definition", &push)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    let season = store.get_tag("season_definition").await.unwrap().unwrap();
    assert_eq!(options_of(&season), ["夏", "春秋", "冬"]);
}

async fn clothing_crud_round_trip(store: &dyn WardrobeStore) {
    let mut original = item(
        "c1",
        "妆花织金马面",
        "下裙",
        1_000,
        &[("season", "冬"), ("skirtType", "马面")],
        Some("/api/image/aa.jpg"),
    );
    original.sizes.insert("裙长".to_string(), "98cm".to_string());
    original.remark = "织金缠枝莲".to_string();

    assert!(store.put_clothing(&original).await.unwrap());
    let loaded = store.get_clothing("c1").await.unwrap().unwrap();
    assert_eq!(loaded, original);

    // 合并更新: 属性逐键覆盖，尺寸整表替换
    let update = ClothingUpdate {
        name: Some("妆花织金马面裙".to_string()),
        attributes: Some(BTreeMap::from([(
            "skirtType".to_string(),
            "百迭".to_string(),
        )])),
        sizes: Some(BTreeMap::from([("腰围".to_string(), "70cm".to_string())])),
        ..Default::default()
    };
    let updated = store.update_clothing("c1", &update).await.unwrap();
    assert_eq!(updated.name, "妆花织金马面裙");
    assert_eq!(updated.attribute("skirtType"), Some("百迭"));
    assert_eq!(updated.attribute("season"), Some("冬"));
    assert_eq!(updated.sizes.len(), 1);
    assert_eq!(updated.sizes.get("腰围").map(String::as_str), Some("70cm"));

    let reread = store.get_clothing("c1").await.unwrap().unwrap();
    assert_eq!(reread, updated);

    let err = store.update_clothing("ghost", &update).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    assert!(store.delete_clothing("c1").await.unwrap());
    assert!(store.get_clothing("c1").await.unwrap().is_none());
    assert!(!store.delete_clothing("c1").await.unwrap());
}

async fn sample_wardrobe(store: &dyn WardrobeStore) {
    let rows = [
        item(
            "c1",
            "绣罗上袄",
            "上衣",
            1_000,
            &[("season", "冬"), ("sleeveType", "弓袋袖")],
            None,
        ),
        item(
            "c2",
            "素纱中单",
            "上衣",
            2_000,
            &[("season", "夏"), ("sleeveType", "半袖")],
            None,
        ),
        item(
            "c3",
            "马面裙",
            "下裙",
            3_000,
            &[("season", "冬"), ("skirtType", "马面")],
            None,
        ),
        item(
            "c4",
            "百迭裙",
            "下裙",
            4_000,
            &[("season", "夏"), ("skirtType", "百迭")],
            None,
        ),
        item("c5", "云肩", "配饰", 5_000, &[("season", "冬")], None),
    ];
    for row in &rows {
        store.put_clothing(row).await.expect("insert sample row");
    }
}

async fn clothing_filters_follow_or_and_semantics(store: &dyn WardrobeStore) {
    sample_wardrobe(store).await;

    // 分类过滤 + created_at 降序
    let q = ClothingQuery {
        category: Some("上衣".to_string()),
        ..Default::default()
    };
    let page = store.query_clothes(&q).await.unwrap();
    assert_eq!(ids(&page.data), ["c2", "c1"]);
    assert!(!page.has_more);

    // 同字段多值 OR
    let q = ClothingQuery {
        filters: BTreeMap::from([(
            "season".to_string(),
            vec!["夏".to_string(), "冬".to_string()],
        )]),
        ..Default::default()
    };
    assert_eq!(store.query_clothes(&q).await.unwrap().data.len(), 5);

    // 跨字段 AND
    let q = ClothingQuery {
        filters: BTreeMap::from([
            ("season".to_string(), vec!["冬".to_string()]),
            ("skirtType".to_string(), vec!["马面".to_string()]),
        ]),
        ..Default::default()
    };
    let page = store.query_clothes(&q).await.unwrap();
    assert_eq!(ids(&page.data), ["c3"]);

    // 记录没有该字段 → 永不匹配 (配饰和下裙都没有 sleeveType)
    let q = ClothingQuery {
        filters: BTreeMap::from([("sleeveType".to_string(), vec!["弓袋袖".to_string()])]),
        ..Default::default()
    };
    let page = store.query_clothes(&q).await.unwrap();
    assert_eq!(ids(&page.data), ["c1"]);

    // 合法但无人使用的字段名 → 空结果而非报错
    let q = ClothingQuery {
        filters: BTreeMap::from([("collarType".to_string(), vec!["方领".to_string()])]),
        ..Default::default()
    };
    assert!(store.query_clothes(&q).await.unwrap().data.is_empty());

    // 非法字段名 → Validation，不触达后端查询
    let q = ClothingQuery {
        filters: BTreeMap::from([(
            "season; DROP TABLE clothing".to_string(),
            vec!["夏".to_string()],
        )]),
        ..Default::default()
    };
    let err = store.query_clothes(&q).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

async fn clothing_pagination_overfetches(store: &dyn WardrobeStore) {
    sample_wardrobe(store).await;

    let q = ClothingQuery {
        page: 1,
        page_size: 2,
        ..Default::default()
    };
    let page1 = store.query_clothes(&q).await.unwrap();
    assert_eq!(ids(&page1.data), ["c5", "c4"]);
    assert!(page1.has_more);

    let q = ClothingQuery {
        page: 2,
        page_size: 2,
        ..Default::default()
    };
    let page2 = store.query_clothes(&q).await.unwrap();
    assert_eq!(ids(&page2.data), ["c3", "c2"]);
    assert!(page2.has_more);

    let q = ClothingQuery {
        page: 3,
        page_size: 2,
        ..Default::default()
    };
    let page3 = store.query_clothes(&q).await.unwrap();
    assert_eq!(ids(&page3.data), ["c1"]);
    assert!(!page3.has_more);

    // 超出末页 → 空页
    let q = ClothingQuery {
        page: 9,
        page_size: 2,
        ..Default::default()
    };
    let page9 = store.query_clothes(&q).await.unwrap();
    assert!(page9.data.is_empty());
    assert!(!page9.has_more);
}

async fn batch_lookup_preserves_reference_order(store: &dyn WardrobeStore) {
    sample_wardrobe(store).await;

    let requested = vec![
        "c3".to_string(),
        "missing".to_string(),
        "c1".to_string(),
        "c5".to_string(),
    ];
    let got = store.get_clothes_batch(&requested).await.unwrap();
    assert_eq!(ids(&got), ["c3", "c1", "c5"]);

    let none = store.get_clothes_batch(&[]).await.unwrap();
    assert!(none.is_empty());
}

async fn outfit_fallback_recomputes_on_reference_change(store: &dyn WardrobeStore) {
    store
        .put_clothing(&item(
            "t1",
            "上袄",
            "上衣",
            1_000,
            &[],
            Some("/api/image/top.jpg"),
        ))
        .await
        .unwrap();
    store
        .put_clothing(&item(
            "s1",
            "马面裙",
            "下裙",
            2_000,
            &[],
            Some("/api/image/skirt.jpg"),
        ))
        .await
        .unwrap();

    let outfit = Outfit {
        id: "o1".to_string(),
        name: "冬日出行".to_string(),
        season: "冬".to_string(),
        clothes: vec!["t1".to_string()],
        outfit_image_url: None,
        fallback_image_url: Some("/api/image/top.jpg".to_string()),
        created_at: 100,
    };
    assert!(store.put_outfit(&outfit).await.unwrap());

    // 引用列表变化 → 回退封面重算，下裙优先
    let update = OutfitUpdate {
        clothes: Some(vec!["t1".to_string(), "s1".to_string()]),
        ..Default::default()
    };
    let updated = store.update_outfit("o1", &update).await.unwrap();
    assert_eq!(
        updated.fallback_image_url.as_deref(),
        Some("/api/image/skirt.jpg")
    );
    let reread = store.get_outfit("o1").await.unwrap().unwrap();
    assert_eq!(reread, updated);

    // 与引用无关的更新不触碰回退封面
    let rename = OutfitUpdate {
        name: Some("初雪出行".to_string()),
        ..Default::default()
    };
    let renamed = store.update_outfit("o1", &rename).await.unwrap();
    assert_eq!(
        renamed.fallback_image_url.as_deref(),
        Some("/api/image/skirt.jpg")
    );

    // 引用全部清空 → 回退封面清空
    let clear = OutfitUpdate {
        clothes: Some(Vec::new()),
        ..Default::default()
    };
    let cleared = store.update_outfit("o1", &clear).await.unwrap();
    assert_eq!(cleared.fallback_image_url, None);

    let err = store.update_outfit("ghost", &rename).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    assert!(store.delete_outfit("o1").await.unwrap());
    assert!(!store.delete_outfit("o1").await.unwrap());
}

async fn outfit_season_browse(store: &dyn WardrobeStore) {
    let mk = |id: &str, name: &str, season: &str, created_at: i64| Outfit {
        id: id.to_string(),
        name: name.to_string(),
        season: season.to_string(),
        clothes: Vec::new(),
        outfit_image_url: None,
        fallback_image_url: None,
        created_at,
    };
    store.put_outfit(&mk("o1", "踏雪", "冬", 100)).await.unwrap();
    store.put_outfit(&mk("o2", "纳凉", "夏", 200)).await.unwrap();
    store.put_outfit(&mk("o3", "赏梅", "冬", 300)).await.unwrap();

    let q = OutfitQuery {
        season: Some("冬".to_string()),
        ..Default::default()
    };
    let page = store.query_outfits(&q).await.unwrap();
    let listed: Vec<&str> = page.data.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(listed, ["o3", "o1"]);

    let all = store.query_outfits(&OutfitQuery::default()).await.unwrap();
    assert_eq!(all.data.len(), 3);
}

async fn dump_covers_all_entities(store: &dyn WardrobeStore) {
    seed(store).await;
    sample_wardrobe(store).await;
    store
        .put_outfit(&Outfit {
            id: "o1".to_string(),
            name: "冬日出行".to_string(),
            season: "冬".to_string(),
            clothes: vec!["c1".to_string(), "c3".to_string()],
            outfit_image_url: None,
            fallback_image_url: None,
            created_at: 100,
        })
        .await
        .unwrap();

    let dump = store.dump().await.unwrap();
    assert_eq!(dump.tags.len(), 7);
    assert_eq!(dump.clothes.len(), 5);
    assert_eq!(dump.outfits.len(), 1);
}
