use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use edutrack_server::middleware::TokenSigner;
use edutrack_server::models::{NewSchedule, Schedule, SchedulePatch};
use edutrack_server::routes::{create_routes, HttpOptions};
use edutrack_server::state::AppState;
use edutrack_server::store::{MemoryScheduleStore, OwnerScope, ScheduleStore};

const SECRET: &str = "integration-secret";

struct TestApp {
    app: Router,
    tokens: TokenSigner,
}

struct TestResponse {
    status: StatusCode,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryScheduleStore::new()))
    }

    fn with_store(store: Arc<dyn ScheduleStore>) -> Self {
        let tokens = TokenSigner::new(SECRET).unwrap();
        let state = AppState::new(store, tokens.clone());
        Self {
            app: create_routes(state, &HttpOptions::default()),
            tokens,
        }
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", self.tokens.issue(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse { status, body }
    }

    async fn list(&self, user: Uuid) -> TestResponse {
        self.call(Method::GET, "/api/schedule", Some(user), None).await
    }

    async fn create(&self, user: Uuid, body: Value) -> TestResponse {
        self.call(Method::POST, "/api/schedule", Some(user), Some(body))
            .await
    }

    async fn update(&self, user: Uuid, id: &str, body: Value) -> TestResponse {
        let uri = format!("/api/schedule/{id}");
        self.call(Method::PUT, &uri, Some(user), Some(body)).await
    }

    async fn delete(&self, user: Uuid, id: &str) -> TestResponse {
        let uri = format!("/api/schedule/{id}");
        self.call(Method::DELETE, &uri, Some(user), None).await
    }
}

fn math() -> Value {
    json!({
        "subject": "Math",
        "day": "Monday",
        "startTime": "09:00",
        "endTime": "10:00"
    })
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn created_schedule_is_listed_only_for_its_owner() {
    let app = TestApp::new();
    let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());

    let created = app.create(owner, math()).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["ownerId"], json!(owner));
    assert_eq!(created.body["color"], "#3B82F6");
    assert_eq!(created.body["recurring"], true);
    assert_eq!(created.body["subject"], "Math");
    let id = created.body["id"].as_str().unwrap().to_string();

    let mine = app.list(owner).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(ids(&mine.body), vec![id]);

    let theirs = app.list(other).await;
    assert_eq!(theirs.status, StatusCode::OK);
    assert_eq!(theirs.body, json!([]));
}

#[tokio::test]
async fn create_overrides_client_supplied_owner() {
    let app = TestApp::new();
    let (caller, victim) = (Uuid::new_v4(), Uuid::new_v4());

    let mut body = math();
    body["ownerId"] = json!(victim);
    body["userId"] = json!(victim);
    let created = app.create(caller, body).await;

    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["ownerId"], json!(caller));
    assert_eq!(app.list(victim).await.body, json!([]));
}

#[tokio::test]
async fn create_keeps_optional_fields() {
    let app = TestApp::new();
    let user = Uuid::new_v4();

    let mut body = math();
    body["location"] = json!("Room 12");
    body["teacher"] = json!("Mr. Okafor");
    body["color"] = json!("#10B981");
    body["recurring"] = json!(false);
    let created = app.create(user, body).await;

    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["location"], "Room 12");
    assert_eq!(created.body["teacher"], "Mr. Okafor");
    assert_eq!(created.body["color"], "#10B981");
    assert_eq!(created.body["recurring"], false);
}

#[tokio::test]
async fn create_with_missing_fields_is_rejected_and_not_persisted() {
    let app = TestApp::new();
    let user = Uuid::new_v4();

    let response = app.create(user, json!({ "subject": "Math" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.body["message"].as_str().unwrap();
    assert!(message.contains("day"));
    assert!(message.contains("startTime"));

    assert_eq!(app.list(user).await.body, json!([]));
}

#[tokio::test]
async fn create_with_invalid_day_is_rejected() {
    let app = TestApp::new();
    let mut body = math();
    body["day"] = json!("Someday");

    let response = app.create(Uuid::new_v4(), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("`Someday` is not a valid day"));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/schedule")
        .header(
            AUTHORIZATION,
            format!("Bearer {}", app.tokens.issue(Uuid::new_v4())),
        )
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"subject\": "))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn owner_can_partially_update() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let created = app.create(user, math()).await;
    let id = created.body["id"].as_str().unwrap();

    let updated = app
        .update(user, id, json!({ "subject": "Algebra", "location": "Lab 2" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["subject"], "Algebra");
    assert_eq!(updated.body["location"], "Lab 2");
    assert_eq!(updated.body["day"], "Monday");
    assert_eq!(updated.body["color"], "#3B82F6");

    let listed = app.list(user).await;
    assert_eq!(listed.body[0]["subject"], "Algebra");
}

#[tokio::test]
async fn update_does_not_enforce_time_order() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let created = app.create(user, math()).await;
    let id = created.body["id"].as_str().unwrap();

    let updated = app.update(user, id, json!({ "startTime": "23:00" })).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["startTime"], "23:00");
    assert_eq!(updated.body["endTime"], "10:00");
}

#[tokio::test]
async fn invalid_update_from_owner_is_a_bad_request() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let created = app.create(user, math()).await;
    let id = created.body["id"].as_str().unwrap();

    let response = app.update(user, id, json!({ "day": "Holiday" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.update(user, id, json!({ "subject": null })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.list(user).await.body[0]["day"], "Monday");
}

#[tokio::test]
async fn non_owner_update_and_delete_are_not_found() {
    let app = TestApp::new();
    let (owner, intruder) = (Uuid::new_v4(), Uuid::new_v4());
    let created = app.create(owner, math()).await;
    let id = created.body["id"].as_str().unwrap();

    let valid = app.update(intruder, id, json!({ "subject": "Hijacked" })).await;
    assert_eq!(valid.status, StatusCode::NOT_FOUND);
    assert_eq!(valid.body, json!({ "message": "Schedule not found" }));

    let invalid = app.update(intruder, id, json!({ "day": "Holiday" })).await;
    assert_eq!(invalid.status, StatusCode::NOT_FOUND);

    let deleted = app.delete(intruder, id).await;
    assert_eq!(deleted.status, StatusCode::NOT_FOUND);
    assert_eq!(deleted.body, json!({ "message": "Schedule not found" }));

    let listed = app.list(owner).await;
    assert_eq!(listed.body[0]["subject"], "Math");
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_not_found() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let missing = Uuid::new_v4().to_string();

    assert_eq!(
        app.update(user, &missing, json!({ "subject": "X" })).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.update(user, "not-an-id", json!({ "subject": "X" })).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(user, &missing).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(user, "42").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_can_delete_once() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let created = app.create(user, math()).await;
    let id = created.body["id"].as_str().unwrap();

    let deleted = app.delete(user, id).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(
        deleted.body,
        json!({ "message": "Schedule deleted successfully" })
    );

    assert_eq!(app.list(user).await.body, json!([]));
    assert_eq!(app.delete(user, id).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn schedule_routes_require_a_valid_token() {
    let app = TestApp::new();

    let anonymous = app.call(Method::GET, "/api/schedule", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["message"], "Missing Authorization header");

    let forged = TokenSigner::new("someone-elses-secret")
        .unwrap()
        .issue(Uuid::new_v4());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/schedule")
        .header(AUTHORIZATION, format!("Bearer {forged}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(math().to_string()))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let delete = app
        .call(Method::DELETE, &format!("/api/schedule/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(delete.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn service_routes_are_mounted() {
    let app = TestApp::new();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"EduTrack server running!");

    let health = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.send(request).await;

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

/// Store whose backend is unreachable.
struct UnreachableStore;

#[async_trait]
impl ScheduleStore for UnreachableStore {
    async fn list(&self, _scope: OwnerScope) -> Result<Vec<Schedule>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn get(&self, _scope: OwnerScope, _id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn insert(
        &self,
        _scope: OwnerScope,
        _entry: NewSchedule,
    ) -> Result<Schedule, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn update(
        &self,
        _scope: OwnerScope,
        _id: Uuid,
        _patch: SchedulePatch,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn delete(&self, _scope: OwnerScope, _id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

#[tokio::test]
async fn store_failures_are_server_errors_with_the_raw_message() {
    let app = TestApp::with_store(Arc::new(UnreachableStore));
    let user = Uuid::new_v4();
    let expected = sqlx::Error::PoolTimedOut.to_string();

    let listed = app.list(user).await;
    assert_eq!(listed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(listed.body["message"], expected.as_str());

    let deleted = app.delete(user, &Uuid::new_v4().to_string()).await;
    assert_eq!(deleted.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(deleted.body["message"], expected.as_str());

    let created = app.create(user, math()).await;
    assert_eq!(created.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(created.body["message"], expected.as_str());

    // A valid body reaches the store through the update itself.
    let updated = app
        .update(user, &Uuid::new_v4().to_string(), json!({ "subject": "X" }))
        .await;
    assert_eq!(updated.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(updated.body["message"], expected.as_str());

    // An invalid body reaches it through the ownership lookup.
    let rejected = app
        .update(user, &Uuid::new_v4().to_string(), json!({ "day": "Holiday" }))
        .await;
    assert_eq!(rejected.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rejected.body["message"], expected.as_str());
}
