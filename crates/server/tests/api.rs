//! API integration tests over an in-process router with mocked match
//! functions.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rallypoint_core::testing::fixtures::{scored_match, skill_ticket};
use rallypoint_core::testing::{MockFunctionClient, MockFunctionDispatch};
use rallypoint_core::{
    BarrierConfig, Config, MatchOrchestrator, MemoryTicketStore, OrchestratorConfig,
    ScoreEvaluator, SyncBarrier, TicketStore,
};
use rallypoint_server::api::create_router;
use rallypoint_server::state::AppState;

/// In-process server with a controllable match function.
struct TestFixture {
    router: Router,
    store: Arc<dyn TicketStore>,
    mmf: Arc<MockFunctionClient>,
}

impl TestFixture {
    fn new() -> Self {
        let store: Arc<dyn TicketStore> = Arc::new(MemoryTicketStore::new());

        let barrier = Arc::new(SyncBarrier::new(
            BarrierConfig {
                min_window_ms: 50,
                max_window_ms: 300,
                driver_tick_ms: 10,
                exclusion_cooldown_ms: 60_000,
            },
            Arc::clone(&store),
            Arc::new(ScoreEvaluator::new()),
        ));
        barrier.start();

        let dispatch = Arc::new(MockFunctionDispatch::new());
        let mmf = Arc::new(MockFunctionClient::new("mmf-test"));
        dispatch.register("mmf-test", Arc::clone(&mmf) as _);

        let orchestrator = Arc::new(MatchOrchestrator::new(
            OrchestratorConfig {
                proposal_deadline_ms: 250,
            },
            barrier,
            dispatch as _,
        ));

        let state = Arc::new(AppState::new(
            Config::default(),
            Arc::clone(&store),
            orchestrator,
        ));

        Self {
            router: create_router(state),
            store,
            mmf,
        }
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let (status, body) = fixture.get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_ticket() {
    let fixture = TestFixture::new();

    let (status, created) = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "attributes": {"skill": 7.5},
                "properties": {"name": "player one"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["attributes"]["skill"], 7.5);
    assert!(created["created"].as_i64().unwrap() > 0);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = fixture.get(&format!("/api/v1/tickets/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["properties"]["name"], "player one");
}

#[tokio::test]
async fn test_create_ticket_without_attributes_is_rejected() {
    let fixture = TestFixture::new();
    let (status, body) = fixture
        .post("/api/v1/tickets", json!({"attributes": {}}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("attribute"));
}

#[tokio::test]
async fn test_get_unknown_ticket_is_404() {
    let fixture = TestFixture::new();
    let (status, _) = fixture
        .get("/api/v1/tickets/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_ticket() {
    let fixture = TestFixture::new();
    let (_, created) = fixture
        .post("/api/v1/tickets", json!({"attributes": {"skill": 1.0}}))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = fixture
        .request(Method::DELETE, &format!("/api/v1/tickets/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = fixture.get(&format!("/api/v1/tickets/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_create() {
    let fixture = TestFixture::new();
    let (status, created) = fixture
        .post(
            "/api/v1/tickets/bulk",
            json!({"tickets": [
                {"attributes": {"skill": 1.0}},
                {"attributes": {"skill": 2.0}}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_query_tickets() {
    let fixture = TestFixture::new();
    for skill in [3.0, 8.0, 30.0] {
        fixture
            .post("/api/v1/tickets", json!({"attributes": {"skill": skill}}))
            .await;
    }

    let (status, body) = fixture
        .post(
            "/api/v1/tickets/query",
            json!({"filters": [{"attribute": "skill", "min": 0.0, "max": 10.0}]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);

    let (status, _) = fixture
        .post("/api/v1/tickets/query", json!({"filters": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assign_tickets_hides_them_from_queries() {
    let fixture = TestFixture::new();
    let (_, created) = fixture
        .post("/api/v1/tickets", json!({"attributes": {"skill": 5.0}}))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = fixture
        .post(
            "/api/v1/tickets/assign",
            json!({"ticket_ids": [id], "assignment": "server-1:7777"}),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = fixture
        .post(
            "/api/v1/tickets/query",
            json!({"filters": [{"attribute": "skill", "min": 0.0, "max": 10.0}]}),
        )
        .await;
    assert!(body["tickets"].as_array().unwrap().is_empty());

    let (_, fetched) = fixture.get(&format!("/api/v1/tickets/{id}")).await;
    assert_eq!(fetched["assignment"], "server-1:7777");
}

#[tokio::test]
async fn test_fetch_matches_round_trip() {
    let fixture = TestFixture::new();

    let ticket = fixture.store.create(skill_ticket(5.0)).await.unwrap();
    let proposal = scored_match(9.0, vec![ticket]);
    fixture.mmf.set_matches(vec![proposal.clone()]).await;

    let (status, body) = fixture
        .post(
            "/api/v1/matches",
            json!({"profiles": [{
                "target": {"name": "mmf-test", "kind": "rest"},
                "pools": {"everyone": [{"attribute": "skill", "min": 0.0, "max": 10.0}]}
            }]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], proposal.id.to_string());
    assert_eq!(matches[0]["properties"]["score"], 9.0);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let fixture = TestFixture::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/metrics")
        .body(Body::empty())
        .unwrap();
    let response = fixture.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("rallypoint_barrier_cycles_total"));
}
