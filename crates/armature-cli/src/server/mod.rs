// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development HTTP server.
//!
//! Serves the compiled output, the public assets and any extra static
//! directories; proxies `/api` to the local backend; and falls back to the
//! rendered HTML entry document for unmatched routes so client-side
//! routing works on deep links. The entry document is served with the
//! live-reload client injected, which also renders the error overlay.

use armature::{Options, ResolvedPaths};
use axum::body::Body;
use axum::extract::{Request, State, WebSocketUpgrade};
use axum::http::{Method, Request as HttpRequest, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

/// WebSocket handling for reload and overlay notifications.
pub mod livereload;
/// `/api` request forwarding.
pub mod proxy;

/// One notification to connected browsers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReloadMessage {
    /// A pass completed without errors; reload when instrumented.
    Reload,
    /// A pass completed with errors; overlay them.
    Errors {
        /// The compiler-reported error messages.
        errors: Vec<String>,
    },
}

/// Shared state for the development server.
pub struct AppState {
    /// Channel for reload/overlay notifications.
    pub reload_tx: Arc<broadcast::Sender<ReloadMessage>>,
    /// The most recent notification, replayed to late-connecting clients.
    pub latest: Arc<RwLock<Option<ReloadMessage>>>,
    /// Static directories, probed in order.
    pub static_dirs: Vec<PathBuf>,
    /// The rendered entry document inside the output directory.
    pub index_html: PathBuf,
    /// Whether completed passes reload the page.
    pub live_reload: bool,
    /// The `/api` forwarder.
    pub proxy: proxy::ApiProxy,
}

/// Creates and runs the development server until terminated.
pub async fn serve(
    addr: SocketAddr,
    paths: &ResolvedPaths,
    options: &Options,
    live_reload: bool,
    reload_tx: Arc<broadcast::Sender<ReloadMessage>>,
    latest: Arc<RwLock<Option<ReloadMessage>>>,
) -> anyhow::Result<()> {
    let mut static_dirs = vec![paths.dist.clone(), paths.public.clone()];
    for dir in &options.serve.extra_static_dirs {
        static_dirs.push(if dir.is_absolute() {
            dir.clone()
        } else {
            paths.root.join(dir)
        });
    }

    let state = Arc::new(AppState {
        reload_tx,
        latest,
        static_dirs,
        index_html: paths.dist.join("index.html"),
        live_reload,
        proxy: proxy::ApiProxy::new(),
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .route("/api", any(proxy_handler))
        .route("/api/*rest", any(proxy_handler))
        .fallback(fallback_handler)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.reload_tx.subscribe();
    let latest = state.latest.read().ok().and_then(|slot| slot.clone());
    ws.on_upgrade(move |socket| livereload::handle_websocket(socket, rx, latest))
}

async fn proxy_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    state.proxy.forward(request).await
}

/// Routes everything the explicit routes did not take.
///
/// Requests that look like files are probed against the static
/// directories in order; everything else (and any miss) gets the entry
/// document, which is what makes deep links into the client app work.
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    if method == Method::GET || method == Method::HEAD {
        let file_like = uri
            .path()
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'));

        if file_like {
            for dir in &state.static_dirs {
                if !dir.exists() {
                    continue;
                }
                let probe = HttpRequest::builder()
                    .method(method.clone())
                    .uri(uri.clone())
                    .body(Body::empty());
                let Ok(probe) = probe else { continue };
                match ServeDir::new(dir)
                    .append_index_html_on_directories(false)
                    .oneshot(probe)
                    .await
                {
                    Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                        return response.into_response();
                    }
                    _ => {}
                }
            }
            return (StatusCode::NOT_FOUND, "not found").into_response();
        }
    }

    entry_document(&state).await
}

/// Serves the rendered entry document with the reload client injected.
async fn entry_document(state: &AppState) -> Response {
    match tokio::fs::read_to_string(&state.index_html).await {
        Ok(document) => {
            let script = livereload::client_script(state.live_reload);
            let document = if document.contains("</body>") {
                document.replacen("</body>", &format!("{}</body>", script), 1)
            } else {
                format!("{}{}", document, script)
            };
            Html(document).into_response()
        }
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "entry document not compiled yet",
        )
            .into_response(),
    }
}
