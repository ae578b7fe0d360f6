// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! WebSocket handler for reload and error-overlay notifications.

use super::ReloadMessage;
use axum::extract::ws::{Message, WebSocket};
use tokio::sync::broadcast;

/// The browser-side client, injected into the served entry document.
///
/// Reconnects are left to a page reload; the socket lives as long as the
/// page does. Only errors overlay; warnings never interrupt the page.
const CLIENT_SCRIPT: &str = r#"(() => {
    const LIVE_RELOAD = __LIVE_RELOAD__;
    const OVERLAY_ID = "armature-error-overlay";
    const socket = new WebSocket("ws://" + location.host + "/__livereload");
    const clearOverlay = () => {
        const overlay = document.getElementById(OVERLAY_ID);
        if (overlay) overlay.remove();
    };
    const showOverlay = (errors) => {
        clearOverlay();
        const overlay = document.createElement("div");
        overlay.id = OVERLAY_ID;
        overlay.style.cssText =
            "position:fixed;inset:0;z-index:2147483647;background:rgba(12,12,12,.92);" +
            "color:#ff6b6b;font:14px/1.6 monospace;padding:24px;overflow:auto;white-space:pre-wrap;";
        overlay.textContent = errors.join("\n\n");
        document.body.appendChild(overlay);
    };
    socket.addEventListener("message", (event) => {
        const message = JSON.parse(event.data);
        if (message.type === "errors") {
            showOverlay(message.errors);
        } else if (LIVE_RELOAD) {
            location.reload();
        } else {
            clearOverlay();
        }
    });
})();"#;

/// Renders the client script tag for injection.
pub fn client_script(live_reload: bool) -> String {
    format!(
        "<script>{}</script>",
        CLIENT_SCRIPT.replace("__LIVE_RELOAD__", if live_reload { "true" } else { "false" })
    )
}

/// Handles one live-reload WebSocket connection.
///
/// `latest` replays the most recent error state so a browser connecting
/// after a failed pass still shows the overlay.
pub async fn handle_websocket(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<ReloadMessage>,
    latest: Option<ReloadMessage>,
) {
    if let Some(message @ ReloadMessage::Errors { .. }) = latest {
        if send(&mut socket, &message).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            // Wait for the next completed compilation pass
            result = rx.recv() => {
                match result {
                    Ok(message) => {
                        if send(&mut socket, &message).await.is_err() {
                            // Client disconnected
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // Channel closed
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // We lagged behind, just continue
                        continue;
                    }
                }
            }
            // Handle incoming messages from client (keep-alive, etc.)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        // Respond to ping with pong
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Ignore other messages
                    }
                    Some(Err(_)) => {
                        // Error receiving
                        break;
                    }
                }
            }
        }
    }
}

async fn send(socket: &mut WebSocket, message: &ReloadMessage) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string());
    socket.send(Message::Text(payload)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_a_type_tag() {
        let reload = serde_json::to_string(&ReloadMessage::Reload).unwrap();
        assert_eq!(reload, r#"{"type":"reload"}"#);

        let errors = serde_json::to_string(&ReloadMessage::Errors {
            errors: vec!["broken".to_string()],
        })
        .unwrap();
        assert_eq!(errors, r#"{"type":"errors","errors":["broken"]}"#);
    }

    #[test]
    fn client_script_pins_the_reload_flag() {
        assert!(client_script(true).contains("LIVE_RELOAD = true"));
        assert!(client_script(false).contains("LIVE_RELOAD = false"));
        assert!(client_script(false).starts_with("<script>"));
    }
}
