// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! `/api` request forwarding.
//!
//! Every request under `/api` is forwarded verbatim to a fixed local
//! backend, bodies streamed in both directions. Connection-upgrade
//! requests (WebSockets and friends) are passed through by completing the
//! handshake on both sides and copying bytes until either end hangs up.
//! The backend address is not configurable in the current design.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, Response as HttpResponse, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

/// The fixed development backend.
pub const API_BACKEND: &str = "http://localhost";

/// Hop-by-hop headers never forwarded in either direction.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
    )
}

/// Forwards requests to the local API backend.
pub struct ApiProxy {
    client: reqwest::Client,
}

impl ApiProxy {
    /// Creates the forwarder with its own connection pool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Forwards one request, upgrade-aware.
    pub async fn forward(&self, request: Request) -> Response {
        if wants_upgrade(request.headers()) {
            return self.forward_upgrade(request).await;
        }
        match self.forward_http(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("api proxy error: {}", err);
                (StatusCode::BAD_GATEWAY, format!("api proxy error: {}", err)).into_response()
            }
        }
    }

    async fn forward_http(&self, request: Request) -> Result<Response, reqwest::Error> {
        let (parts, body) = request.into_parts();

        let mut outgoing = self
            .client
            .request(parts.method, target_url(&parts.uri))
            .body(reqwest::Body::wrap_stream(body.into_data_stream()));
        for (name, value) in parts.headers.iter() {
            if name == header::HOST || is_hop_by_hop(name) {
                continue;
            }
            outgoing = outgoing.header(name, value);
        }

        let backend = outgoing.send().await?;

        let mut response = HttpResponse::builder().status(backend.status());
        for (name, value) in backend.headers().iter() {
            if is_hop_by_hop(name) {
                continue;
            }
            response = response.header(name, value);
        }
        Ok(response
            .body(Body::from_stream(backend.bytes_stream()))
            .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response()))
    }

    /// Completes an upgrade handshake on both sides, then splices bytes.
    async fn forward_upgrade(&self, request: Request) -> Response {
        let (mut parts, _body) = request.into_parts();

        let Some(client_upgrade) = parts.extensions.remove::<OnUpgrade>() else {
            return (StatusCode::BAD_GATEWAY, "connection cannot be upgraded").into_response();
        };

        // The handshake forwards verbatim, upgrade headers included.
        let mut outgoing = self.client.request(parts.method, target_url(&parts.uri));
        for (name, value) in parts.headers.iter() {
            if name == header::HOST {
                continue;
            }
            outgoing = outgoing.header(name, value);
        }

        let backend = match outgoing.send().await {
            Ok(backend) => backend,
            Err(err) => {
                tracing::debug!("api upgrade error: {}", err);
                return (StatusCode::BAD_GATEWAY, format!("api proxy error: {}", err))
                    .into_response();
            }
        };

        if backend.status() != StatusCode::SWITCHING_PROTOCOLS {
            let status = backend.status();
            let body = backend.bytes().await.unwrap_or_default();
            return (status, body).into_response();
        }

        let mut response = HttpResponse::builder().status(StatusCode::SWITCHING_PROTOCOLS);
        for (name, value) in backend.headers().iter() {
            response = response.header(name, value);
        }

        tokio::spawn(async move {
            let backend_io = match backend.upgrade().await {
                Ok(io) => io,
                Err(err) => {
                    tracing::debug!("backend upgrade failed: {}", err);
                    return;
                }
            };
            let client_io = match client_upgrade.await {
                Ok(io) => io,
                Err(err) => {
                    tracing::debug!("client upgrade failed: {}", err);
                    return;
                }
            };
            let mut client_io = TokioIo::new(client_io);
            let mut backend_io = backend_io;
            let _ = tokio::io::copy_bidirectional(&mut client_io, &mut backend_io).await;
        });

        response
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
    }
}

impl Default for ApiProxy {
    fn default() -> Self {
        Self::new()
    }
}

fn target_url(uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/api");
    format!("{}{}", API_BACKEND, path_and_query)
}

fn wants_upgrade(headers: &HeaderMap) -> bool {
    let connection_upgrade = headers
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("upgrade"))
        .unwrap_or(false);
    connection_upgrade && headers.contains_key(header::UPGRADE)
}
