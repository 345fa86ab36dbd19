// src/server/http.rs

use std::future::{Future, IntoFuture};
use std::path::PathBuf;

use axum::body::{self, Body};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::config::ServerSection;
use crate::errors::Result;
use crate::server::bridge::{ReloadBridge, ReloadMessage};

/// Websocket endpoint browsers subscribe to.
pub const WS_PATH: &str = "/__sitedag/ws";
/// Reload client injected into served HTML.
pub const CLIENT_PATH: &str = "/__sitedag/client.js";

const CLIENT_JS: &str = include_str!("client.js");

/// Router serving `dist` plus the live-reload endpoints.
pub fn router(dist: PathBuf, bridge: ReloadBridge, live_reload: bool) -> Router {
    let router = Router::new()
        .route(WS_PATH, get(ws_handler))
        .route(CLIENT_PATH, get(client_script))
        // path to the dist directory with the generated website
        .fallback_service(ServeDir::new(dist))
        .with_state(bridge);

    if live_reload {
        router.layer(middleware::from_fn(inject_client))
    } else {
        router
    }
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(
    cfg: &ServerSection,
    dist: PathBuf,
    bridge: ReloadBridge,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let address = cfg.address();
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot bind {address}: {e}"))
    })?;

    info!(url = %format!("http://{address}/"), dist = ?dist, "starting a HTTP server");

    let server = axum::serve(listener, router(dist, bridge, cfg.live_reload));

    // Websocket sessions never finish on their own, so stop the server
    // outright instead of draining connections.
    tokio::select! {
        result = server.into_future() => result?,
        () = shutdown => info!("HTTP server stopped"),
    }

    Ok(())
}

/// Insert the reload client right before `</body>`, or append it when the
/// document has no closing body tag.
pub fn inject_script(html: &str) -> String {
    let tag = format!(r#"<script src="{CLIENT_PATH}"></script>"#);
    match html.rfind("</body>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..at]);
            out.push_str(&tag);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}

async fn inject_client(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer HTML response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

async fn client_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], CLIENT_JS)
}

async fn ws_handler(ws: WebSocketUpgrade, State(bridge): State<ReloadBridge>) -> Response {
    let rx = bridge.subscribe();
    ws.on_upgrade(move |socket| client_session(socket, rx))
}

async fn client_session(
    mut socket: WebSocket,
    mut rx: tokio::sync::broadcast::Receiver<ReloadMessage>,
) {
    debug!("reload client connected");

    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Ok(message) => {
                    let text = match serde_json::to_string(&message) {
                        Ok(text) => text,
                        Err(err) => {
                            warn!(error = %err, "failed to encode reload message");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "reload client lagged behind");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("reload client disconnected");
}
