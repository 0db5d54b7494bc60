//! Local HTTP dashboard server.
//!
//! ## Architecture
//!
//! Views are computed and rendered once into a [`Dashboard`], shared with a
//! server thread through `Arc`. The thread polls a `tiny_http` server and
//! answers from the prebuilt content:
//! - `/` the tabbed HTML page
//! - `/views/<slug>.svg` one chart
//! - `/api/views` and `/api/views/<slug>` JSON view results
//! - `/healthz` liveness
//!
//! Dropping the [`DashboardServer`] stops the thread and joins it.

use crate::constants::{SERVER_POLL_MS, SERVER_STARTUP_TIMEOUT_SECS};
use crate::data::{compute_all, ViewSet};
use crate::render::{dashboard_page, render_all, ChartArtifact, ChartSize};
use crate::types::{IncidentTable, ViewKind};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, error, info};

/// Errors starting the dashboard server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("server startup timed out")]
    StartupTimeout,
}

/// Helper to create HTTP headers, returning None if the bytes are invalid
fn create_header(name: &[u8], value: &[u8]) -> Option<Header> {
    Header::from_bytes(name, value).ok()
}

/// Entry of the `/api/views` listing
#[derive(Serialize)]
struct ViewListing<'a> {
    slug: &'a str,
    title: &'a str,
    chart: &'a str,
    empty: bool,
}

/// Response produced by routing, independent of the transport
#[derive(Clone, Debug, PartialEq)]
pub struct RouteResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl RouteResponse {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    fn status(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message.as_bytes().to_vec(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec_pretty(value) {
            Ok(body) => Self::ok("application/json", body),
            Err(e) => {
                error!("Failed to encode JSON response: {}", e);
                Self::status(500, "internal error")
            }
        }
    }

    /// Strong ETag over the body
    pub fn etag(&self) -> String {
        format!("\"{:x}\"", Sha256::digest(&self.body))
    }

    /// Whether an `If-None-Match` header value lets this response become a 304.
    ///
    /// Only successful responses qualify. The value may be `*` or a
    /// comma-separated list of tags, compared weakly (`W/` is ignored).
    pub fn not_modified_for(&self, if_none_match: &str) -> bool {
        if self.status != 200 {
            return false;
        }
        let etag = self.etag();
        if_none_match.split(',').map(str::trim).any(|tag| {
            tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == etag
        })
    }
}

/// Prebuilt dashboard content
pub struct Dashboard {
    page: String,
    artifacts: Vec<ChartArtifact>,
    views: ViewSet,
}

impl Dashboard {
    /// Compute and render all views of a table
    pub fn build(table: &IncidentTable, size: ChartSize) -> Self {
        let views = compute_all(table);
        let artifacts = render_all(&views, size);
        let subtitle = format!(
            "Synthetic demo dataset ({} incidents from {}). Use this to explore KPI trends and drilldowns.",
            table.len(),
            table.name()
        );
        let page = dashboard_page("Incident Operations Dashboard", &subtitle, &artifacts);
        Self {
            page,
            artifacts,
            views,
        }
    }

    /// Resolve a request to a response
    pub fn route(&self, method: &Method, url: &str) -> RouteResponse {
        if *method != Method::Get && *method != Method::Head {
            return RouteResponse::status(405, "method not allowed");
        }

        let path = url.split(['?', '#']).next().unwrap_or("/");
        let path = match urlencoding::decode(path) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => return RouteResponse::status(400, "bad request"),
        };

        match path.as_str() {
            "/" | "/index.html" => RouteResponse::ok("text/html; charset=utf-8", self.page.clone()),
            "/healthz" => RouteResponse::ok("text/plain; charset=utf-8", "ok"),
            "/api/views" => {
                let listing: Vec<ViewListing> = self
                    .artifacts
                    .iter()
                    .map(|a| ViewListing {
                        slug: a.view.slug(),
                        title: &a.title,
                        chart: a.chart.label(),
                        empty: a.empty,
                    })
                    .collect();
                RouteResponse::json(&listing)
            }
            other => {
                if let Some(slug) = other.strip_prefix("/api/views/") {
                    return match ViewKind::from_slug(slug).and_then(|k| self.views.get(k)) {
                        Some(report) => RouteResponse::json(report),
                        None => RouteResponse::status(404, "unknown view"),
                    };
                }
                if let Some(slug) = other
                    .strip_prefix("/views/")
                    .and_then(|rest| rest.strip_suffix(".svg"))
                {
                    return match self.artifacts.iter().find(|a| a.view.slug() == slug) {
                        Some(artifact) => RouteResponse::ok("image/svg+xml", artifact.svg.clone()),
                        None => RouteResponse::status(404, "unknown view"),
                    };
                }
                RouteResponse::status(404, "not found")
            }
        }
    }
}

/// Running dashboard server on its own thread
pub struct DashboardServer {
    addr: SocketAddr,
    shutdown_flag: Arc<AtomicBool>,
    server_thread: Option<JoinHandle<()>>,
}

impl DashboardServer {
    /// Bind `addr` and start serving. Port 0 picks a free port.
    pub fn start(addr: &str, dashboard: Arc<Dashboard>) -> Result<Self, ServerError> {
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let shutdown_flag_clone = shutdown_flag.clone();
        let bind_addr = addr.to_string();

        // Channel for server startup synchronization
        let (tx, rx) = mpsc::channel();

        let server_thread = thread::spawn(move || {
            let server = match Server::http(&bind_addr) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to start dashboard server on {}: {}", bind_addr, e);
                    let _ = tx.send(Err(e.to_string()));
                    return;
                }
            };
            match server.server_addr().to_ip() {
                Some(local) => {
                    let _ = tx.send(Ok(local));
                }
                None => {
                    let _ = tx.send(Err("not an IP listener".to_string()));
                    return;
                }
            }

            loop {
                if shutdown_flag_clone.load(Ordering::Relaxed) {
                    break;
                }

                match server.recv_timeout(Duration::from_millis(SERVER_POLL_MS)) {
                    Ok(Some(request)) => Self::respond(&dashboard, request),
                    Ok(None) => {}
                    Err(e) => {
                        error!("Dashboard server stopped: {}", e);
                        break;
                    }
                }
            }
        });

        // Wait for server to start with timeout
        let addr = match rx.recv_timeout(Duration::from_secs(SERVER_STARTUP_TIMEOUT_SECS)) {
            Ok(Ok(local)) => local,
            Ok(Err(reason)) => {
                let _ = server_thread.join();
                return Err(ServerError::Bind {
                    addr: addr.to_string(),
                    reason,
                });
            }
            Err(_) => {
                shutdown_flag.store(true, Ordering::SeqCst);
                return Err(ServerError::StartupTimeout);
            }
        };

        info!("Dashboard listening on http://{}/", addr);
        Ok(Self {
            addr,
            shutdown_flag,
            server_thread: Some(server_thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Block until the server thread exits
    pub fn wait(mut self) {
        if let Some(handle) = self.server_thread.take() {
            let _ = handle.join();
        }
    }

    fn respond(dashboard: &Dashboard, request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        let routed = dashboard.route(&method, &url);
        let etag = routed.etag();
        debug!("{} {} -> {}", method, url, routed.status);

        let not_modified = request
            .headers()
            .iter()
            .any(|h| h.field.equiv("If-None-Match") && routed.not_modified_for(h.value.as_str()));

        let body = if not_modified || method == Method::Head {
            Vec::new()
        } else {
            routed.body
        };
        let status = if not_modified { 304 } else { routed.status };

        let mut response = Response::from_data(body).with_status_code(StatusCode(status));
        if let Some(h) = create_header(&b"Content-Type"[..], routed.content_type.as_bytes()) {
            response = response.with_header(h);
        }
        if let Some(h) = create_header(&b"ETag"[..], etag.as_bytes()) {
            response = response.with_header(h);
        }
        if let Some(h) = create_header(&b"Cache-Control"[..], &b"no-cache"[..]) {
            response = response.with_header(h);
        }
        let _ = request.respond(response);
    }
}

impl Drop for DashboardServer {
    fn drop(&mut self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.server_thread.take() {
            let _ = handle.join();
        }
    }
}
