use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    routing::put,
    Router,
};
use tokio::net::TcpListener;

/// A PUT received by [`FakeUpstream`]
#[derive(Debug, Clone)]
pub struct ReceivedPut {
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

struct UpstreamState {
    status: AtomicU16,
    puts: Mutex<Vec<ReceivedPut>>,
}

/// In-process HTTP server standing in for the object store's PUT endpoint
pub struct FakeUpstream {
    addr: SocketAddr,
    state: Arc<UpstreamState>,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(UpstreamState {
            status: AtomicU16::new(200),
            puts: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/{*path}", put(record_put))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Status returned for subsequent PUTs
    pub fn respond_with(&self, status: StatusCode) {
        self.state.status.store(status.as_u16(), Ordering::SeqCst);
    }

    pub fn puts(&self) -> Vec<ReceivedPut> {
        self.state.puts.lock().unwrap().clone()
    }
}

async fn record_put(
    State(state): State<Arc<UpstreamState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    state.puts.lock().unwrap().push(ReceivedPut {
        path: uri.path().to_string(),
        query: uri.query().map(ToString::to_string),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string),
        body,
    });

    let status = StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap();
    if status.is_success() {
        (status, String::new())
    } else {
        (
            status,
            "<Error><Code>InternalError</Code></Error>".to_string(),
        )
    }
}

/// Base URL of a port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
