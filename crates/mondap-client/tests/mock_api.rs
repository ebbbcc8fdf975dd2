//! Mock API tests for the mondap client.
//!
//! These tests use wiremock to simulate the backend and exercise the
//! request pipeline's renewal behavior without network access or real
//! credentials.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mondap_client::Session;
use mondap_core::store::CredentialStore;
use mondap_core::{
    AccessToken, ApiUrl, AuthError, Error, MemoryStore, RefreshToken, StoreError, TokenPair,
};

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair::new(AccessToken::new(access), RefreshToken::new(refresh))
}

fn refresh_body(access: &str) -> serde_json::Value {
    json!({ "data": { "access": { "token": access } } })
}

// ============================================================================
// Success and Passthrough
// ============================================================================

#[tokio::test]
async fn test_success_returns_response_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "title": "first question" }]
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store);

    let questions = session.questions(1, 30).await.unwrap();
    assert_eq!(questions[0]["title"], "first question");
}

#[tokio::test]
async fn test_http_500_passes_through_without_renewal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "INTERNAL",
            "message": "something broke"
        })))
        .mount(&server)
        .await;

    // The renewal endpoint must never be called for a non-401 failure.
    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("token2")))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    let err = session.questions(1, 30).await.unwrap_err();
    match err {
        Error::Api(api) => {
            assert_eq!(api.status, 500);
            assert_eq!(api.message.as_deref(), Some("something broke"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Credentials untouched.
    let current = store.get().await.unwrap().unwrap();
    assert_eq!(current.access.as_str(), "token1");
}

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leaderboard/v1/detail"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string("Service Unavailable")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store);

    let err = session.ranking().await.unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_image_upload_sends_multipart_with_bearer() {
    let server = MockServer::start().await;

    // The multipart body carries the form field, the file name, and the
    // raw file bytes.
    Mock::given(method("POST"))
        .and(path("/post/v1/image"))
        .and(header("authorization", "Bearer token1"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"photo.png\""))
        .and(body_string_contains("fake png bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "https://cdn.mondap.example/img/42.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store);

    let url = session
        .upload_image("photo.png", "image/png", b"fake png bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.mondap.example/img/42.png");
}

// ============================================================================
// Renewal
// ============================================================================

#[tokio::test]
async fn test_expired_credential_renewed_and_call_replayed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "EXPIRED_TOKEN"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .and(body_json(json!({ "token": "refresh1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("token2")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    session.questions(1, 30).await.unwrap();

    // The renewal response carried no rotated refresh token, so the
    // existing one is reused.
    let current = store.get().await.unwrap().unwrap();
    assert_eq!(current.access.as_str(), "token2");
    assert_eq!(current.refresh.as_str(), "refresh1");
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "access": { "token": "token2" },
                "refresh": { "token": "refresh2" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    session.questions(1, 30).await.unwrap();

    let current = store.get().await.unwrap().unwrap();
    assert_eq!(current.access.as_str(), "token2");
    assert_eq!(current.refresh.as_str(), "refresh2");
}

#[tokio::test]
async fn test_concurrent_expirations_share_one_renewal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    // The renewal call is slow enough that all three 401s land while the
    // episode is still in flight; exactly one renewal call is allowed.
    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .and(body_json(json!({ "token": "refresh1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_body("token2"))
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    let (a, b, c) = tokio::join!(
        session.questions(1, 30),
        session.questions(2, 30),
        session.questions(3, 30),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let current = store.get().await.unwrap().unwrap();
    assert_eq!(current.access.as_str(), "token2");
}

#[tokio::test]
async fn test_renewal_after_idle_is_a_fresh_episode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    // Two episodes separated by a return to idle invoke the endpoint
    // twice; outcomes are never cached across episodes.
    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("token2")))
        .expect(2)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("stale", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    session.questions(1, 30).await.unwrap();
    assert_eq!(
        store.get().await.unwrap().unwrap().access.as_str(),
        "token2"
    );

    // Simulate the access token going stale again.
    store.set(pair("stale", "refresh1")).await.unwrap();

    session.questions(2, 30).await.unwrap();
    assert_eq!(
        store.get().await.unwrap().unwrap().access.as_str(),
        "token2"
    );
}

#[tokio::test]
async fn test_abandoned_waiter_does_not_cancel_renewal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .and(header("authorization", "Bearer token2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_body("token2"))
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    // The middle call is dropped while the renewal is still in flight;
    // the surviving waiters and the renewal itself must be unaffected.
    let (a, abandoned, c) = tokio::join!(
        session.questions(1, 30),
        tokio::time::timeout(Duration::from_millis(50), session.questions(2, 30)),
        session.questions(3, 30),
    );
    a.unwrap();
    assert!(abandoned.is_err(), "expected the waiter to time out");
    c.unwrap();

    let current = store.get().await.unwrap().unwrap();
    assert_eq!(current.access.as_str(), "token2");
}

// ============================================================================
// Terminal Outcomes
// ============================================================================

#[tokio::test]
async fn test_second_rejection_after_renewal_is_terminal() {
    let server = MockServer::start().await;

    // Both the original and the renewed credential are rejected.
    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // One episode only; the second 401 must not trigger another renewal.
    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("token2")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());
    let mut terminated = session.on_session_terminated();

    let err = session.questions(1, 30).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));

    // The renewal itself succeeded, so the session was not torn down.
    assert!(store.get().await.unwrap().is_some());
    assert!(terminated.try_recv().is_err());
}

#[tokio::test]
async fn test_rejected_renewal_clears_store_and_signals_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "INVALID_REFRESH_TOKEN"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());
    let mut terminated = session.on_session_terminated();

    let err = session.questions(1, 30).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));

    // Store emptied, signal fired exactly once.
    assert!(store.get().await.unwrap().is_none());
    tokio::time::timeout(Duration::from_secs(1), terminated.recv())
        .await
        .expect("terminated signal not received")
        .unwrap();
    assert!(terminated.try_recv().is_err());
}

#[tokio::test]
async fn test_rejected_renewal_resolves_every_waiter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "error": "INVALID_REFRESH_TOKEN" }))
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());

    let (a, b, c) = tokio::join!(
        session.questions(1, 30),
        session.questions(2, 30),
        session.questions(3, 30),
    );
    for result in [a, b, c] {
        assert!(matches!(
            result.unwrap_err(),
            Error::Auth(AuthError::SessionExpired)
        ));
    }
    assert!(store.get().await.unwrap().is_none());
}

/// A store whose reads start failing after the first one, as if the
/// backing medium vanished mid-session.
struct FlakyStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    cleared: AtomicBool,
}

impl FlakyStore {
    fn with_pair(pair: TokenPair) -> Self {
        Self {
            inner: MemoryStore::with_pair(pair),
            reads: AtomicUsize::new(0),
            cleared: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.get().await
        } else {
            Err(StoreError::Io {
                message: "backing store unavailable".to_string(),
            })
        }
    }

    async fn set(&self, pair: TokenPair) -> Result<(), StoreError> {
        self.inner.set(pair).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.cleared.store(true, Ordering::SeqCst);
        self.inner.clear().await
    }
}

#[tokio::test]
async fn test_store_read_failure_during_renewal_tears_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post/v1/auth/questions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // With no refresh token readable, the renewal call is never issued.
    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("token2")))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(FlakyStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());
    let mut terminated = session.on_session_terminated();

    let err = session.questions(1, 30).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));

    // The failed episode cleared the store and signaled teardown.
    assert!(store.cleared.load(Ordering::SeqCst));
    tokio::time::timeout(Duration::from_secs(1), terminated.recv())
        .await
        .expect("terminated signal not received")
        .unwrap();
}

#[tokio::test]
async fn test_empty_store_fails_fast_without_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_body("token2")))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let session = Session::new(mock_api_url(&server), store);

    let err = session.questions(1, 30).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
}

#[tokio::test]
async fn test_logout_clears_store_without_signal() {
    let server = MockServer::start().await;

    let store = Arc::new(MemoryStore::with_pair(pair("token1", "refresh1")));
    let session = Session::new(mock_api_url(&server), store.clone());
    let mut terminated = session.on_session_terminated();

    session.logout().await.unwrap();

    assert!(store.get().await.unwrap().is_none());
    assert!(terminated.try_recv().is_err());
}
