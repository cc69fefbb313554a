// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: a recording mock backend and a recording notifier.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use fitpulse_client::config::Config;
use fitpulse_client::services::{
    ApiClient, AuthContext, MemoryStorage, Notification, Notifier, SessionStore,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

struct MockState {
    responses: HashMap<(Method, String), (u16, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Duration,
}

/// Mock FitPulse backend answering canned responses per method and path.
/// Unknown routes answer 404 with a JSON message.
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockBackend {
    pub async fn start(responses: &[(Method, &str, u16, &str)]) -> Self {
        Self::start_delayed(responses, Duration::ZERO).await
    }

    /// Like [`start`](Self::start), but every answer waits `delay` after the
    /// request is recorded.
    pub async fn start_delayed(responses: &[(Method, &str, u16, &str)], delay: Duration) -> Self {
        let responses = responses
            .iter()
            .map(|(m, p, s, b)| ((m.clone(), p.to_string()), (*s, b.to_string())))
            .collect();
        let state = Arc::new(MockState {
            responses,
            requests: Mutex::new(Vec::new()),
            delay,
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> Config {
        Config::test_default().with_api_base_url(&self.base_url)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests to `path`, in arrival order.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match state.responses.get(&(method, uri.path().to_string())) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            r#"{"message":"Rota não encontrada"}"#.to_string(),
        ),
    }
}

/// Notifier that keeps everything it is told.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Auth context wired to `backend`, in-memory storage and a recording
/// notifier.
#[allow(dead_code)]
pub fn create_test_context(
    backend: &MockBackend,
) -> (AuthContext, MemoryStorage, Arc<RecordingNotifier>) {
    let storage = MemoryStorage::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = AuthContext::new(
        backend.client(),
        SessionStore::new(Arc::new(storage.clone())),
        notifier.clone(),
    );
    (ctx, storage, notifier)
}

/// A backend user record as `GET /user/list` returns it.
#[allow(dead_code)]
pub const STUDENT_PROFILE: &str = r#"{
    "id": 7,
    "name": "Ana Souza",
    "email": "ana@b.com",
    "role": "student",
    "phone": "(11) 98765-4321",
    "weight": 70.0,
    "height": 1.75,
    "created_at": "2025-03-01T12:00:00Z"
}"#;
