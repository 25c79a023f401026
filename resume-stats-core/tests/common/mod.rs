#![allow(dead_code)]

//! Shared test fixtures: a canned HTTP server and a tracing event collector.
//! Also compiled into the CLI crate's tests.

use std::sync::{Arc, Mutex, Once};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::Context, Layer};

/// A canned response for every request whose path starts with `prefix`.
#[derive(Clone)]
pub struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn new(prefix: &'static str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix,
            status,
            body: body.into(),
        }
    }
}

/// A request seen by the canned server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub body: String,
}

#[derive(Clone)]
struct Canned {
    routes: Arc<Vec<Route>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct CannedServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    handle: JoinHandle<()>,
}

impl CannedServer {
    /// Serve `routes` on an ephemeral localhost port until dropped. Unknown paths get 404.
    pub async fn start(routes: Vec<Route>) -> Self {
        bypass_proxy_for_localhost();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(respond).with_state(Canned {
            routes: Arc::new(routes),
            requests: requests.clone(),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle,
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(
    State(canned): State<Canned>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned());
    canned.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        target: target.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    canned
        .routes
        .iter()
        .find(|r| target.starts_with(r.prefix))
        .map(|r| (StatusCode::from_u16(r.status).unwrap(), r.body.clone()))
        .unwrap_or((StatusCode::NOT_FOUND, b"not found".to_vec()))
}

/// A base URL nothing listens on: connections are refused immediately.
pub async fn refused_base_url() -> String {
    bypass_proxy_for_localhost();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Keep loopback requests off any proxy configured in the environment.
/// The variables are written once per test binary, before the first server starts.
fn bypass_proxy_for_localhost() {
    static NO_PROXY: Once = Once::new();
    NO_PROXY.call_once(|| {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        std::env::set_var("no_proxy", "127.0.0.1,localhost");
    });
}

/// Custom Layer to collect emitted events with their level.
pub struct EventCollector {
    pub events: Arc<Mutex<Vec<(tracing::Level, String)>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), msg));
    }
}

pub fn warnings(events: &Arc<Mutex<Vec<(tracing::Level, String)>>>) -> Vec<String> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == tracing::Level::WARN)
        .map(|(_, msg)| msg.clone())
        .collect()
}
