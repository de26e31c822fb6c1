//! HTTP API integration tests
//!
//! Drives the full router through `tower::ServiceExt::oneshot` — auth
//! middleware, admin gate, handlers and the redb backend together, no
//! port binding. Tokens are minted straight from the state's JwtService
//! so the login delay only applies to the login tests themselves.

use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use luoyi_server::core::StorageBackend;
use luoyi_server::{Config, ServerState, build_app};

async fn test_state() -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::with_overrides(
        dir.path().to_string_lossy().to_string(),
        0,
        StorageBackend::Redb,
    );
    // 固定凭据，隔离宿主机环境变量
    config.admin_username = "admin".to_string();
    config.admin_password = "luoyi-admin".to_string();
    config.member_username = Some("member".to_string());
    config.member_password = Some("member-pass".to_string());

    let state = ServerState::initialize(&config).await.expect("state init");
    (state, dir)
}

fn admin_token(state: &ServerState) -> String {
    state
        .jwt_service
        .generate_token("admin", "admin", "admin")
        .expect("admin token")
}

fn member_token(state: &ServerState) -> String {
    state
        .jwt_service
        .generate_token("member", "member", "member")
        .expect("member token")
}

async fn send(
    state: &ServerState,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = build_app(state.clone())
        .oneshot(request)
        .await
        .expect("oneshot");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

// "/api/tags/form/上衣" percent-encoded; http::Uri rejects raw non-ASCII
const FORM_TOP_URI: &str = "/api/tags/form/%E4%B8%8A%E8%A1%A3";

#[tokio::test]
async fn health_is_public() {
    let (state, _dir) = test_state().await;
    let (status, body) = send(&state, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "redb");
}

#[tokio::test]
async fn login_issues_role_tokens() {
    let (state, _dir) = test_state().await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "admin", "password": "luoyi-admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["role"], "admin");

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "member", "password": "member-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "member");
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
    let (state, _dir) = test_state().await;

    // 密码错误和用户不存在必须是同一个错误
    let (status1, body1) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "admin", "password": "wrong"})),
    )
    .await;
    let (status2, body2) = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "nobody", "password": "wrong"})),
    )
    .await;
    assert_eq!(status1, StatusCode::BAD_REQUEST);
    assert_eq!(status1, status2);
    assert_eq!(body1["code"], "E0006");
    assert_eq!(body1["message"], body2["message"]);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (state, _dir) = test_state().await;

    let (status, body) = send(&state, "GET", "/api/tags", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, _) = send(&state, "GET", "/api/tags", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn member_cannot_manage_tags() {
    let (state, _dir) = test_state().await;
    let token = member_token(&state);

    let (status, body) = send(
        &state,
        "POST",
        "/api/tags/top_size_definition/mutations",
        Some(&token),
        Some(json!({"action": "PULL_FIELD", "key": "衣长"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    // 被拒的变更不产生任何写入
    let tag = state
        .store
        .get_tag("top_size_definition")
        .await
        .unwrap()
        .unwrap();
    let fields = match &tag.payload {
        shared::TagPayload::Size { fields } => fields.clone(),
        _ => panic!("expected size tag"),
    };
    assert!(fields.iter().any(|f| f.key == "衣长"));

    let (status, _) = send(&state, "GET", "/api/tags/manage", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_mutation_round_trip() {
    let (state, _dir) = test_state().await;
    let token = admin_token(&state);
    let push = json!({"action": "PUSH_OPTION", "value": "琵琶袖"});

    let (status, body) = send(
        &state,
        "POST",
        "/api/tags/sleeveType_definition/mutations",
        Some(&token),
        Some(push.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    let options = body["data"]["options"].as_array().unwrap();
    assert_eq!(options.last().unwrap(), "琵琶袖");

    // 第二次同样的 push → 409 冲突
    let (status, body) = send(
        &state,
        "POST",
        "/api/tags/sleeveType_definition/mutations",
        Some(&token),
        Some(push),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");
}

#[tokio::test]
async fn seed_resets_builtin_definitions() {
    let (state, _dir) = test_state().await;
    let token = admin_token(&state);

    // 启动播种已写入全部 7 个定义，seed 接口重置而不是新建
    let (status, body) = send(&state, "POST", "/api/tags/seed", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 0);
    assert_eq!(body["data"]["updated"], 7);

    // 管理员加的选项被恢复出厂冲掉
    let (status, _) = send(
        &state,
        "POST",
        "/api/tags/sleeveType_definition/mutations",
        Some(&token),
        Some(json!({"action": "PUSH_OPTION", "value": "琵琶袖"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _) = send(&state, "POST", "/api/tags/seed", Some(&token), None).await;
    let tag = state
        .store
        .get_tag("sleeveType_definition")
        .await
        .unwrap()
        .unwrap();
    let options = match &tag.payload {
        shared::TagPayload::Attribute { options, .. } => options.clone(),
        _ => panic!("expected attribute tag"),
    };
    assert!(!options.contains(&"琵琶袖".to_string()));
}

#[tokio::test]
async fn builtin_season_is_immutable_over_http() {
    let (state, _dir) = test_state().await;
    let token = admin_token(&state);

    let (status, body) = send(
        &state,
        "POST",
        "/api/tags/season_definition/mutations",
        Some(&token),
        Some(json!({"action": "PUSH_OPTION", "value": "梅雨"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn form_resolution_for_a_category() {
    let (state, _dir) = test_state().await;
    let token = member_token(&state);

    let (status, body) = send(&state, "GET", FORM_TOP_URI, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let attributes = body["data"]["attributes"].as_array().unwrap();
    let fields: Vec<&str> = attributes
        .iter()
        .map(|a| a["field"].as_str().unwrap())
        .collect();
    // 内置季节不在列表里，由前端用固定常量渲染
    assert!(fields.contains(&"sleeveType"));
    assert!(fields.contains(&"collarType"));
    assert!(!fields.contains(&"season"));

    let sizes = body["data"]["sizes"].as_array().unwrap();
    let keys: Vec<&str> = sizes.iter().map(|s| s["key"].as_str().unwrap()).collect();
    assert!(keys.contains(&"衣长"));
}

#[tokio::test]
async fn clothing_create_validates_schema_keys() {
    let (state, _dir) = test_state().await;
    let token = member_token(&state);

    // 不在模式里的属性键被拒绝
    let (status, body) = send(
        &state,
        "POST",
        "/api/clothes",
        Some(&token),
        Some(json!({
            "name": "试验上衣",
            "category": "上衣",
            "attributes": {"fabricType": "妆花缎"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // 未知分类也被拒绝
    let (status, _) = send(
        &state,
        "POST",
        "/api/clothes",
        Some(&token),
        Some(json!({"name": "鞋", "category": "鞋靴"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 合法记录创建后可读回，属性平铺在顶层
    let (status, body) = send(
        &state,
        "POST",
        "/api/clothes",
        Some(&token),
        Some(json!({
            "name": "月白上襦",
            "category": "上衣",
            "attributes": {"season": "夏", "sleeveType": "半袖"},
            "sizes": {"衣长": "65cm"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["sleeveType"], "半袖");

    let (status, body) = send(
        &state,
        "GET",
        &format!("/api/clothes/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "月白上襦");
    assert_eq!(body["data"]["sizes"]["衣长"], "65cm");
}

#[tokio::test]
async fn clothing_query_rejects_unknown_filter_field() {
    let (state, _dir) = test_state().await;
    let token = member_token(&state);

    let (status, body) = send(
        &state,
        "POST",
        "/api/clothes/query",
        Some(&token),
        Some(json!({"filters": {"fabricType": ["妆花缎"]}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn outfit_detail_groups_references() {
    let (state, _dir) = test_state().await;
    let token = member_token(&state);

    let mut clothing_ids = Vec::new();
    for (name, category) in [("上袄", "上衣"), ("马面裙", "下裙"), ("云肩", "配饰")] {
        let (status, body) = send(
            &state,
            "POST",
            "/api/clothes",
            Some(&token),
            Some(json!({"name": name, "category": category})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        clothing_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(
        &state,
        "POST",
        "/api/outfits",
        Some(&token),
        Some(json!({
            "name": "冬日出行",
            "season": "冬",
            "clothes": clothing_ids,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "outfit create failed: {}", body);
    let outfit_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &state,
        "GET",
        &format!("/api/outfits/{}/detail", outfit_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tops"][0]["name"], "上袄");
    assert_eq!(body["data"]["bottoms"][0]["name"], "马面裙");
    assert_eq!(body["data"]["accessories"][0]["name"], "云肩");

    // 未知季节在创建时被拒
    let (status, _) = send(
        &state,
        "POST",
        "/api/outfits",
        Some(&token),
        Some(json!({"name": "x", "season": "梅雨"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transfer_endpoints_are_admin_only() {
    let (state, _dir) = test_state().await;

    let member = member_token(&state);
    let (status, _) = send(&state, "GET", "/api/transfer/export", Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = admin_token(&state);
    let (status, body) = send(&state, "GET", "/api/transfer/export", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 1);
    // 种子定义随导出走
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 7);

    // 导入同一份快照: 全部是覆盖，created 为 0
    let export = body["data"].clone();
    let (status, body) = send(
        &state,
        "POST",
        "/api/transfer/import",
        Some(&admin),
        Some(export),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "import failed: {}", body);
    assert_eq!(body["data"]["tags"]["created"], 0);
    assert_eq!(body["data"]["tags"]["updated"], 7);
}
