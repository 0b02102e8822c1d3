//! Local preview server
//!
//! Serves the generated site from `public_dir`. With watching enabled every
//! rebuild is announced over a WebSocket so open pages refresh themselves.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::commands::generate;
use crate::Folio;

const LIVE_RELOAD_PATH: &str = "/__livereload";

/// Sent to every connected page after a successful rebuild
const RELOAD_MESSAGE: &str = "reload";

/// Added to served HTML when watching
const LIVE_RELOAD_SNIPPET: &str = r#"<script>
(function () {
  var socket = new WebSocket("ws://" + location.host + "/__livereload");
  socket.addEventListener("message", function (event) {
    if (event.data === "reload") location.reload();
  });
  socket.addEventListener("close", function () {
    setTimeout(function () { location.reload(); }, 1000);
  });
})();
</script>
"#;

#[derive(Clone)]
struct Preview {
    site_root: Arc<PathBuf>,
    rebuilds: broadcast::Sender<()>,
    watching: bool,
}

/// Serve the public directory on `ip:port`
///
/// With `watch` set, content changes trigger a rebuild followed by a reload
/// of every open page.
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let (rebuilds, _) = broadcast::channel(16);
    let preview = Preview {
        site_root: Arc::new(folio.public_dir.clone()),
        rebuilds: rebuilds.clone(),
        watching: watch,
    };

    let addr = SocketAddr::new(bind_address(ip)?, port);
    let app = Router::new()
        .route(LIVE_RELOAD_PATH, get(reload_socket))
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(preview);

    if watch {
        let folio = folio.clone();
        tokio::task::spawn_blocking(move || {
            // No receivers just means no page is open
            let reload_pages = || {
                let _ = rebuilds.send(());
            };
            if let Err(e) = generate::watch_blocking(&folio, reload_pages) {
                tracing::error!("Watching {:?} stopped: {:#}", folio.base_dir, e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot listen on {}", addr))?;
    tracing::info!(
        "Serving {:?} at http://{}:{}/{}",
        folio.public_dir,
        ip,
        port,
        if watch { " (live reload)" } else { "" }
    );
    axum::serve(listener, app).await?;

    Ok(())
}

fn bind_address(ip: &str) -> Result<IpAddr> {
    if ip == "localhost" {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    ip.parse()
        .with_context(|| format!("Invalid address to bind: {}", ip))
}

async fn reload_socket(ws: WebSocketUpgrade, State(preview): State<Preview>) -> impl IntoResponse {
    let rebuilt = preview.rebuilds.subscribe();
    ws.on_upgrade(move |socket| forward_rebuilds(socket, rebuilt))
}

async fn forward_rebuilds(mut socket: WebSocket, mut rebuilt: broadcast::Receiver<()>) {
    tracing::debug!("Preview page connected");

    loop {
        let outgoing = tokio::select! {
            event = rebuilt.recv() => match event {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    Message::Text(RELOAD_MESSAGE.to_string())
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Ping(payload))) => Message::Pong(payload),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
        };
        if socket.send(outgoing).await.is_err() {
            break;
        }
    }

    tracing::debug!("Preview page disconnected");
}

async fn serve_file(State(preview): State<Preview>, request: Request<Body>) -> Response {
    if preview.watching {
        let path = resolve_path(&preview.site_root, request.uri().path());
        if is_html(&path) {
            return match tokio::fs::read_to_string(&path).await {
                Ok(html) => Html(inject_live_reload(&html)).into_response(),
                Err(_) => StatusCode::NOT_FOUND.into_response(),
            };
        }
    }

    let mut files = ServeDir::new(preview.site_root.as_path()).append_index_html_on_directories(true);
    match files.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Serving a file failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn is_html(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("html") | Some("htm")
    )
}

/// Map a request path to a file under `site_root`
fn resolve_path(site_root: &Path, path: &str) -> PathBuf {
    let relative = path.trim_start_matches('/');
    if relative.split('/').any(|part| part == "..") {
        return site_root.join("index.html");
    }

    let candidate = site_root.join(relative);
    if candidate.is_dir() {
        candidate.join("index.html")
    } else {
        candidate
    }
}

fn inject_live_reload(html: &str) -> String {
    let at = html.rfind("</body>").unwrap_or(html.len());
    let mut out = String::with_capacity(html.len() + LIVE_RELOAD_SNIPPET.len());
    out.push_str(&html[..at]);
    out.push_str(LIVE_RELOAD_SNIPPET);
    out.push_str(&html[at..]);
    out
}
