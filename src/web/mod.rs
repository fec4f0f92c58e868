//! Embedded web dashboard for binwatch.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page bin status dashboard
//! - JSON API endpoints for bins, pages, evaluation and health
//!
//! Launched via `binwatch web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::Result;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::analytics::logger::ActivityLog;
use crate::config::BinwatchConfig;
use crate::session::SessionStore;

pub use api::ApiReply;

/// Everything a request handler needs. Built once per server.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub config: BinwatchConfig,
    pub store: SessionStore,
    pub log: ActivityLog,
}

impl DashboardState {
    pub fn load() -> Result<Self> {
        let config = crate::config::load();
        let log = ActivityLog::from_config(&config.logging);
        Ok(Self {
            config,
            store: SessionStore::default_location()?,
            log,
        })
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread and handles requests sequentially. Errors are
/// answered per request without stopping the server.
pub fn serve(addr: &str, state: &DashboardState) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("binwatch dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let _ = request.respond(dispatch(state, &method, &url));

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(state: &DashboardState, method: &Method, url: &str) -> Response<Cursor<Vec<u8>>> {
    let path = url.split('?').next().unwrap_or(url);

    let reply = match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => return serve_frontend(),

        (&Method::Get, "/api/bins") => api::get_bins(state),
        (&Method::Get, "/api/pages") => api::get_pages(),
        (&Method::Get, "/api/evaluate") => api::get_evaluate(state, url),
        (&Method::Get, "/api/health") => api::get_health(state),

        _ => ApiReply::error(404, "not found"),
    };

    reply.into_response()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header must parse")
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8")
        .expect("static header must parse")
}
