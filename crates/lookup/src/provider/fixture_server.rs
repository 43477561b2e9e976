//! Local HTTP server standing in for a catalogue in provider tests.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Router,
};

struct Fixture {
    status: StatusCode,
    body: String,
    queries: Mutex<Vec<String>>,
    user_agents: Mutex<Vec<String>>,
}

pub(crate) struct FixtureServer {
    pub base_url: String,
    fixture: Arc<Fixture>,
}

impl FixtureServer {
    /// Serve `body` with `status` at `path` on an ephemeral port.
    pub async fn start(path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        let fixture = Arc::new(Fixture {
            status,
            body: body.into(),
            queries: Mutex::new(Vec::new()),
            user_agents: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(path, get(respond))
            .with_state(fixture.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            fixture,
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.fixture.queries.lock().unwrap().clone()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.fixture.user_agents.lock().unwrap().clone()
    }
}

async fn respond(
    State(fixture): State<Arc<Fixture>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    fixture
        .queries
        .lock()
        .unwrap()
        .push(query.unwrap_or_default());
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        fixture.user_agents.lock().unwrap().push(agent.to_string());
    }
    (
        fixture.status,
        [(header::CONTENT_TYPE, "application/json")],
        fixture.body.clone(),
    )
}
