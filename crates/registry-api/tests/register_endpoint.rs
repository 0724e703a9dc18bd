//! Drives the router end to end: raw HTTP request in, status + JSON body out,
//! against a throwaway SQLite file.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use registry_api::json::encode_flat_object;
use registry_api::register::MAX_BODY_BYTES;
use registry_api::lookup::Handbook;
use registry_api::{AppState, AppStateInner, router};
use registry_crypto::{CredentialHasher, MigrationFlag, hash};
use registry_db::Database;

struct TestApp {
    _dir: tempfile::TempDir,
    state: AppState,
    flag: MigrationFlag,
}

impl TestApp {
    fn new(bcrypt: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("accounts.db")).unwrap();
        let flag = MigrationFlag::new(bcrypt);
        let state = Arc::new(AppStateInner {
            db,
            hasher: CredentialHasher::new(flag.clone()),
            handbook: Handbook::new(dir.path().join("Map.json")),
        });
        Self { _dir: dir, state, flag }
    }

    fn router(&self) -> Router {
        router(self.state.clone())
    }

    async fn send(&self, method: Method, body: impl Into<Body>) -> (StatusCode, String, String) {
        let request = Request::builder()
            .method(method)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();
        let response = self.router().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn register(&self, username: &str, password: &str) -> (StatusCode, String) {
        let body = encode_flat_object([("username", username), ("password", password)]);
        let (status, _, body) = self.send(Method::POST, body).await;
        (status, body)
    }
}

#[tokio::test]
async fn creates_account() {
    let app = TestApp::new(false);
    let (status, content_type, body) = app
        .send(Method::POST, r#"{"username": "alice", "password": "pw1"}"#)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(content_type, "application/json; charset=utf-8");

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert!(json["id"].as_i64().unwrap() > 0);

    assert!(app.state.db.account_exists("alice").unwrap());
}

#[tokio::test]
async fn stores_legacy_hash_not_plaintext() {
    let app = TestApp::new(false);
    let (status, _) = app.register("legacy", "hunter2").await;
    assert_eq!(status, StatusCode::CREATED);

    let record = app.state.db.get_account_by_name("legacy").unwrap().unwrap();
    assert_ne!(record.password_hash, "hunter2");
    assert_eq!(record.password_hash, hash::sha512_hex("hunter2"));
}

#[tokio::test]
async fn stores_bcrypt_hash_when_migrated() {
    let app = TestApp::new(true);
    let (status, _) = app.register("modern", "hunter2").await;
    assert_eq!(status, StatusCode::CREATED);

    let record = app.state.db.get_account_by_name("modern").unwrap().unwrap();
    assert!(record.password_hash.starts_with("$2"));
    assert!(hash::verify("hunter2", &record.password_hash));
}

#[tokio::test]
async fn flag_change_applies_to_next_request() {
    let app = TestApp::new(false);
    app.register("before", "pw").await;
    app.flag.set(true);
    app.register("after", "pw").await;

    let before = app.state.db.get_account_by_name("before").unwrap().unwrap();
    let after = app.state.db.get_account_by_name("after").unwrap().unwrap();
    assert_eq!(hash::detect(&before.password_hash), Some(hash::HashAlgorithm::Sha512));
    assert_eq!(hash::detect(&after.password_hash), Some(hash::HashAlgorithm::Bcrypt));
}

#[tokio::test]
async fn password_is_trimmed_before_hashing() {
    let app = TestApp::new(false);
    app.register("trim", "  pw  ").await;

    let record = app.state.db.get_account_by_name("trim").unwrap().unwrap();
    assert_eq!(record.password_hash, hash::sha512_hex("pw"));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::new(false);
    let (first, _) = app.register("bob", "pw").await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = app.register("bob", "other").await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body, "\"username_exists\"");
    assert_eq!(app.state.db.count_accounts_named("bob").unwrap(), 1);
}

#[tokio::test]
async fn username_comparison_is_case_sensitive() {
    let app = TestApp::new(false);
    assert_eq!(app.register("Carol", "pw").await.0, StatusCode::CREATED);
    assert_eq!(app.register("carol", "pw").await.0, StatusCode::CREATED);
}

#[tokio::test]
async fn username_length_boundary() {
    let app = TestApp::new(false);

    let (status, body) = app.register("abcdefghijklmn", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "\"username_too_long\"");

    let (status, _) = app.register("abcdefghijklm", "pw").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn missing_fields() {
    let app = TestApp::new(false);
    for body in [
        r#"{}"#,
        r#"{"username":"dave"}"#,
        r#"{"password":"pw"}"#,
        r#"{"username":"  ","password":"pw"}"#,
    ] {
        let (status, _, reply) = app.send(Method::POST, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(reply, "\"missing_username_or_password\"");
    }
}

#[tokio::test]
async fn malformed_body() {
    let app = TestApp::new(false);
    for body in ["", "not json", "[1,2]", r#"{"username" "x"}"#, r#"{"a":"b""#] {
        let (status, content_type, reply) = app.send(Method::POST, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(content_type, "application/json; charset=utf-8");
        assert_eq!(reply, "\"invalid_json\"");
    }
}

#[tokio::test]
async fn other_methods_are_rejected() {
    let app = TestApp::new(false);
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let (status, _, reply) = app
            .send(method.clone(), r#"{"username":"eve","password":"pw"}"#)
            .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {}", method);
        assert_eq!(reply, "\"method_not_allowed\"");
    }
    assert!(!app.state.db.account_exists("eve").unwrap());
}

#[tokio::test]
async fn oversized_get_is_still_method_not_allowed() {
    let app = TestApp::new(false);
    let (status, content_type, reply) = app.send(Method::GET, vec![b'a'; 3 * 1024 * 1024]).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(content_type, "application/json; charset=utf-8");
    assert_eq!(reply, "\"method_not_allowed\"");
}

#[tokio::test]
async fn oversized_post_gets_json_413() {
    let app = TestApp::new(false);
    let (status, content_type, reply) = app.send(Method::POST, vec![b'a'; 3 * 1024 * 1024]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(content_type, "application/json; charset=utf-8");
    assert_eq!(reply, "\"payload_too_large\"");
}

#[tokio::test]
async fn body_at_limit_is_parsed() {
    let app = TestApp::new(false);
    let mut body = encode_flat_object([("username", "padded"), ("password", "pw")]);
    let padding = MAX_BODY_BYTES - body.len();
    body.insert_str(0, &" ".repeat(padding));
    assert_eq!(body.len(), MAX_BODY_BYTES);

    let (status, _, _) = app.send(Method::POST, body).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn storage_failure_is_sql_error() {
    let app = TestApp::new(false);
    app.state
        .db
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE accounts;")?;
            Ok(())
        })
        .unwrap();

    let (status, body) = app.register("frank", "pw").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "\"sql_error\"");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_username_creates_at_most_one() {
    let app = Arc::new(TestApp::new(false));
    let attempts = 16;

    let tasks: Vec<_> = (0..attempts)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { app.register("racer", "pw").await.0 })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        let status = task.await.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT | StatusCode::INTERNAL_SERVER_ERROR => {}
            other => panic!("unexpected status {}", other),
        }
    }

    assert!(created <= 1);
    assert_eq!(
        app.state.db.count_accounts_named("racer").unwrap(),
        created as i64
    );
}

#[tokio::test]
async fn health_probe() {
    let app = TestApp::new(false);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
