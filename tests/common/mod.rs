#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;

use classconnect::modules::auth::sender::ResetLinkSender;
use classconnect::router::init_router;
use classconnect::state::{AppConfig, AppState};
use classconnect_auth::{Account, InMemoryCredentialStore};
use classconnect_config::{CorsConfig, HasherConfig, JwtConfig, RateLimitConfig};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-characters";
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Reset links handed out during a test, as `(email, token)` pairs.
#[derive(Default)]
pub struct CapturingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingSender {
    pub fn last_token(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, token)| token.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ResetLinkSender for CapturingSender {
    async fn send_reset_link(
        &self,
        email: &str,
        token: &str,
        _validity: Duration,
    ) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryCredentialStore>,
    pub sender: Arc<CapturingSender>,
}

/// Cheap hashing, a fixed secret and a generous rate limit. Requests
/// without an `Origin` header are let through.
pub fn test_config() -> AppConfig {
    AppConfig {
        cors: CorsConfig {
            allow_missing_origin: true,
            ..CorsConfig::default()
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            token_expiry: Duration::from_secs(15 * 60),
        },
        hasher: HasherConfig {
            memory_kib: 4096,
            iterations: 1,
            parallelism: 1,
            output_len: 32,
        },
        rate_limit: RateLimitConfig {
            max_requests: 1000,
            window: Duration::from_secs(60),
        },
        ..AppConfig::default()
    }
}

pub fn build_state(config: &AppConfig) -> (AppState, Arc<InMemoryCredentialStore>, Arc<CapturingSender>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let sender = Arc::new(CapturingSender::default());
    let state = AppState::new(config, store.clone(), sender.clone()).unwrap();
    (state, store, sender)
}

pub fn setup_test_app(config: AppConfig) -> TestApp {
    let (state, store, sender) = build_state(&config);
    TestApp {
        router: init_router(state.clone()),
        state,
        store,
        sender,
    }
}

pub async fn create_test_account(
    app: &TestApp,
    id: &str,
    username: &str,
    password: &str,
    role: &str,
) -> Account {
    let account = Account {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{username}@school.test"),
        role: role.to_string(),
        password_hash: app.state.hasher.hash(password).unwrap(),
        inactive: false,
        password_changed_at: None,
    };
    app.store.create_account(account.clone()).await;
    account
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn with_session(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::COOKIE,
        format!("Bearer={token}").parse().unwrap(),
    );
    request
}

/// Value of the `Bearer` cookie set by a response, if any.
pub fn session_cookie_value(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("Bearer="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
