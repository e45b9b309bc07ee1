//! Integration tests for the REST API, driven through the router with `oneshot`

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use matcher::{FoundReport, LostReport, Matcher};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState, StaticTokenVerifier};
use store::{InMemoryStore, ReportFilter, ReportStore, StoreError, Stored, UpdateOutcome};
use tower::ServiceExt;

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";
const CAROL: &str = "carol-token";

fn app_on(config: ServerConfig, store: Arc<dyn ReportStore>) -> Router {
    let verifier = StaticTokenVerifier::default()
        .with_token(ALICE, "alice")
        .with_token(BOB, "bob")
        .with_token(CAROL, "carol");
    let state = ServerState::with_parts(
        config,
        store,
        Arc::new(Matcher::default()),
        Arc::new(verifier),
    );
    build_router(Arc::new(state))
}

fn test_app_with(config: ServerConfig) -> Router {
    app_on(config, Arc::new(InMemoryStore::new()))
}

fn test_app() -> Router {
    test_app_with(ServerConfig {
        rate_limit_per_minute: 1000,
        ..ServerConfig::default()
    })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn keys_body(date: &str) -> Value {
    json!({
        "category": "Keys",
        "title": "Silver Keys",
        "description": "set of house keys with red keychain",
        "location": "Main Library",
        "lostOn": date,
        "foundOn": date,
    })
}

async fn create(app: &Router, kind: &str, token: &str, body: Value) -> String {
    let (status, doc) = send(app, "POST", &format!("/api/v1/{kind}"), Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create {kind} failed: {doc}");
    doc["id"].as_str().unwrap().to_string()
}

/// Hands control back to the runtime before every store call, so
/// concurrent requests interleave between their reads and writes.
struct YieldingStore(InMemoryStore);

#[async_trait]
impl ReportStore for YieldingStore {
    async fn insert_lost(
        &self,
        owner_id: &str,
        report: LostReport,
    ) -> Result<Stored<LostReport>, StoreError> {
        tokio::task::yield_now().await;
        self.0.insert_lost(owner_id, report).await
    }

    async fn insert_found(
        &self,
        owner_id: &str,
        report: FoundReport,
    ) -> Result<Stored<FoundReport>, StoreError> {
        tokio::task::yield_now().await;
        self.0.insert_found(owner_id, report).await
    }

    async fn get_lost(&self, id: &str) -> Result<Option<Stored<LostReport>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.get_lost(id).await
    }

    async fn get_found(&self, id: &str) -> Result<Option<Stored<FoundReport>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.get_found(id).await
    }

    async fn find_lost(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<Stored<LostReport>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.find_lost(filter).await
    }

    async fn find_found(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<Stored<FoundReport>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.find_found(filter).await
    }

    async fn update_lost(
        &self,
        id: &str,
        report: LostReport,
    ) -> Result<Option<Stored<LostReport>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.update_lost(id, report).await
    }

    async fn update_found(
        &self,
        id: &str,
        report: FoundReport,
    ) -> Result<Option<Stored<FoundReport>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.update_found(id, report).await
    }

    async fn update_lost_if(
        &self,
        id: &str,
        transition: &(dyn for<'a> Fn(&'a Stored<LostReport>) -> Option<LostReport> + Send + Sync),
    ) -> Result<UpdateOutcome<LostReport>, StoreError> {
        tokio::task::yield_now().await;
        self.0.update_lost_if(id, transition).await
    }

    async fn update_found_if(
        &self,
        id: &str,
        transition: &(dyn for<'a> Fn(&'a Stored<FoundReport>) -> Option<FoundReport> + Send + Sync),
    ) -> Result<UpdateOutcome<FoundReport>, StoreError> {
        tokio::task::yield_now().await;
        self.0.update_found_if(id, transition).await
    }

    async fn delete_lost(&self, id: &str) -> Result<bool, StoreError> {
        tokio::task::yield_now().await;
        self.0.delete_lost(id).await
    }

    async fn delete_found(&self, id: &str) -> Result<bool, StoreError> {
        tokio::task::yield_now().await;
        self.0.delete_found(id).await
    }
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["store"], "ready");

    let (status, _) = send(&app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_a_valid_bearer_token() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/v1/lost", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_FAILED");

    let (status, _) = send(&app, "GET", "/api/v1/lost", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/v1/lost", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn create_forces_active_status_and_records_owner() {
    let app = test_app();
    let mut body = keys_body("2024-03-10");
    body["status"] = json!("resolved");

    let (status, doc) = send(&app, "POST", "/api/v1/lost", Some(ALICE), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doc["status"], "open");
    assert_eq!(doc["ownerId"], "alice");
    assert_eq!(doc["category"], "Keys");
    assert!(doc["lostOn"].as_str().unwrap().starts_with("2024-03-10T00:00:00"));

    let mut body = keys_body("2024-03-10");
    body["status"] = json!("claimed");
    body["returned"] = json!(true);
    let (status, doc) = send(&app, "POST", "/api/v1/found", Some(BOB), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doc["status"], "available");
    assert_eq!(doc["returned"], false);
}

#[tokio::test]
async fn create_rejects_missing_category_and_empty_title() {
    let app = test_app();

    let body = json!({ "title": "no category" });
    let (status, body) = send(&app, "POST", "/api/v1/lost", Some(ALICE), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let body = json!({ "category": "Keys", "title": "   " });
    let (status, _) = send(&app, "POST", "/api/v1/found", Some(ALICE), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lost_report_matches_rank_found_reports() {
    let app = test_app();
    let lost_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;
    let found_id = create(&app, "found", BOB, keys_body("2024-03-10")).await;

    let mut other = keys_body("2024-03-10");
    other["category"] = json!("Wallet");
    create(&app, "found", BOB, other).await;

    let uri = format!("/api/v1/matches/lost/{lost_id}");
    let (status, body) = send(&app, "GET", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lostItem"]["id"], lost_id.as_str());
    assert_eq!(body["totalMatches"], 1);

    let first = &body["matches"][0];
    assert_eq!(first["foundItem"]["id"], found_id.as_str());
    assert_eq!(first["score"], 99);
    assert_eq!(first["breakdown"]["category"], 30);
    assert_eq!(first["breakdown"]["description"], 9);

    let uri = format!("/api/v1/matches/found/{found_id}?minScore=100");
    let (status, body) = send(&app, "GET", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foundItem"]["id"], found_id.as_str());
    assert_eq!(body["totalMatches"], 0);
}

#[tokio::test]
async fn missing_subject_reports_use_stable_messages() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/v1/matches/lost/missing", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Lost item not found");

    let (status, body) = send(&app, "GET", "/api/v1/found/missing", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Found item not found");
}

#[tokio::test]
async fn resolved_lost_report_cannot_be_matched() {
    let app = test_app();
    let lost_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;

    let uri = format!("/api/v1/lost/{lost_id}/resolve");
    let (status, body) = send(&app, "POST", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let (status, body) = send(&app, "POST", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resolved");

    let (status, body) = send(&app, "POST", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "This lost item has already been resolved");

    let uri = format!("/api/v1/matches/lost/{lost_id}");
    let (status, body) = send(&app, "GET", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_STATE");
    assert_eq!(error_message(&body), "This lost item has already been resolved");
}

#[tokio::test]
async fn claim_flow_enforces_ownership_and_availability() {
    let app = test_app();
    let found_id = create(&app, "found", BOB, keys_body("2024-03-10")).await;
    let claim = format!("/api/v1/found/{found_id}/claim");

    let (status, _) = send(&app, "POST", &claim, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", &claim, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "claimed");

    let (status, body) = send(&app, "POST", &claim, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "This found item has already been claimed");

    let uri = format!("/api/v1/matches/found/{found_id}");
    let (status, body) = send(&app, "GET", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "This found item has already been claimed");
}

#[tokio::test]
async fn concurrent_claims_admit_exactly_one_claimant() {
    let app = app_on(
        ServerConfig {
            rate_limit_per_minute: 1000,
            ..ServerConfig::default()
        },
        Arc::new(YieldingStore(InMemoryStore::new())),
    );
    let found_id = create(&app, "found", BOB, keys_body("2024-03-10")).await;
    let claim = format!("/api/v1/found/{found_id}/claim");

    let ((first, first_body), (second, second_body)) = tokio::join!(
        send(&app, "POST", &claim, Some(ALICE), None),
        send(&app, "POST", &claim, Some(CAROL), None),
    );

    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let rejected = if first == StatusCode::OK { &second_body } else { &first_body };
    assert_eq!(error_code(rejected), "INVALID_STATE");
    assert_eq!(error_message(rejected), "This found item has already been claimed");
}

#[tokio::test]
async fn concurrent_resolves_apply_once() {
    let app = app_on(
        ServerConfig {
            rate_limit_per_minute: 1000,
            ..ServerConfig::default()
        },
        Arc::new(YieldingStore(InMemoryStore::new())),
    );
    let lost_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;
    let resolve = format!("/api/v1/lost/{lost_id}/resolve");

    let ((first, _), (second, _)) = tokio::join!(
        send(&app, "POST", &resolve, Some(ALICE), None),
        send(&app, "POST", &resolve, Some(ALICE), None),
    );

    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let (status, body) = send(&app, "POST", &resolve, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn returned_found_report_leaves_the_pool() {
    let app = test_app();
    let lost_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;
    let found_id = create(&app, "found", BOB, keys_body("2024-03-10")).await;

    let uri = format!("/api/v1/found/{found_id}/return");
    let (status, body) = send(&app, "POST", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["returned"], true);

    let (status, _) = send(&app, "POST", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/matches/lost/{lost_id}");
    let (_, body) = send(&app, "GET", &uri, Some(ALICE), None).await;
    assert_eq!(body["totalMatches"], 0);
}

#[tokio::test]
async fn global_listing_counts_before_limit() {
    let app = test_app();
    for token in [ALICE, BOB] {
        create(&app, "lost", token, keys_body("2024-03-10")).await;
        create(&app, "found", token, keys_body("2024-03-12")).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/matches?limit=1", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"].as_array().unwrap().len(), 1);
    assert_eq!(body["totalMatches"], 4);
    assert_eq!(body["totalLostItems"], 2);
    assert_eq!(body["totalFoundItems"], 2);

    let pair = &body["matches"][0];
    assert!(pair["lostItem"]["id"].is_string());
    assert!(pair["foundItem"]["id"].is_string());
}

#[tokio::test]
async fn caller_grouped_matches_skip_reports_without_hits() {
    let app = test_app();
    let keys_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;

    let mut pet = keys_body("2024-03-10");
    pet["category"] = json!("Pets");
    create(&app, "lost", ALICE, pet).await;

    create(&app, "found", BOB, keys_body("2024-03-10")).await;
    create(&app, "found", BOB, keys_body("2024-03-11")).await;

    let (status, body) = send(&app, "GET", "/api/v1/matches/my/lost", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = body["matches"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["lostItem"]["id"], keys_id.as_str());
    assert_eq!(body["totalMatches"], 2);

    let (status, body) = send(&app, "GET", "/api/v1/matches/my/found", Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalMatches"], 2);

    let (_, body) = send(&app, "GET", "/api/v1/matches/my/found", Some(ALICE), None).await;
    assert_eq!(body["matches"], json!([]));
    assert_eq!(body["totalMatches"], 0);
}

#[tokio::test]
async fn out_of_range_min_score_is_rejected() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/v1/matches?minScore=101", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_query_strings_use_the_error_envelope() {
    let app = test_app();
    let lost_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;

    let uris = [
        "/api/v1/matches?minScore=abc".to_string(),
        "/api/v1/matches?minScore=256".to_string(),
        "/api/v1/matches?limit=-1".to_string(),
        format!("/api/v1/matches/lost/{lost_id}?minScore=abc"),
        "/api/v1/matches/my/lost?minScore=-5".to_string(),
        "/api/v1/lost?status=misplaced".to_string(),
        "/api/v1/found?category=Spaceship".to_string(),
        "/api/v1/found?mine=sometimes".to_string(),
    ];
    for uri in &uris {
        let (status, body) = send(&app, "GET", uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_code(&body), "BAD_REQUEST", "{uri}");
        assert!(!error_message(&body).is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn list_filters_by_owner_category_and_status() {
    let app = test_app();
    create(&app, "lost", ALICE, keys_body("2024-03-10")).await;
    let mut wallet = keys_body("2024-03-10");
    wallet["category"] = json!("Wallet");
    create(&app, "lost", BOB, wallet).await;

    let (_, body) = send(&app, "GET", "/api/v1/lost?mine=true", Some(BOB), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["category"], "Wallet");

    let (_, body) = send(&app, "GET", "/api/v1/lost?category=Keys", Some(BOB), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["ownerId"], "alice");

    let (_, body) = send(&app, "GET", "/api/v1/lost?status=resolved", Some(BOB), None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn only_the_owner_can_delete() {
    let app = test_app();
    let lost_id = create(&app, "lost", ALICE, keys_body("2024-03-10")).await;
    let uri = format!("/api/v1/lost/{lost_id}");

    let (status, _) = send(&app, "DELETE", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limit_applies_per_caller() {
    let app = test_app_with(ServerConfig {
        rate_limit_per_minute: 2,
        ..ServerConfig::default()
    });

    for _ in 0..2 {
        let (status, _) = send(&app, "GET", "/api/v1/found", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, "GET", "/api/v1/found", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(&body), "RATE_LIMIT_EXCEEDED");

    let (status, _) = send(&app, "GET", "/api/v1/found", Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
}
