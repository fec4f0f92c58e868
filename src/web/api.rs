//! JSON API handlers for the dashboard.
//!
//! Handlers return an [`ApiReply`] (status + JSON body); the router turns it
//! into a `tiny_http` response.

use std::io::Cursor;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::analytics::logger::{ActivityEntry, ActivityKind};
use crate::api::ApiClient;
use crate::evaluator;
use crate::pages;
use crate::status;

use super::{DashboardState, content_type_json};

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiReply {
    fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, &format!("failed to serialize JSON response: {e}")),
        }
    }

    pub(crate) fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }),
        }
    }

    pub(crate) fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        Response::from_data(self.body.to_string().into_bytes())
            .with_header(content_type_json())
            .with_status_code(StatusCode(self.status))
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EvaluateResponse {
    usage_count: i64,
    capacity: i64,
    percentage: f64,
    status: evaluator::StatusTier,
    style: &'static str,
    color: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    api_url: String,
    api_reachable: bool,
    signed_in: bool,
    display_name: Option<String>,
    capacity: i64,
    capacity_valid: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a query-string parameter and percent-decode its value.
fn query_param(url: &str, key: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key { percent_decode(v) } else { None }
    })
}

/// Decode `%XX` escapes and `+`. Malformed escapes are kept as-is; a result
/// that is not valid UTF-8 yields `None`.
fn percent_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes[i] {
            b'%' => bytes
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok()),
            _ => None,
        };
        match (escaped, bytes[i]) {
            (Some(b), _) => {
                out.push(b);
                i += 3;
            }
            (None, b'+') => {
                out.push(b' ');
                i += 1;
            }
            (None, b) => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /api/bins` — fetch and evaluate bins with the stored session.
pub fn get_bins(state: &DashboardState) -> ApiReply {
    let Ok(session) = state.store.require_active(Utc::now()) else {
        return ApiReply::error(401, "not logged in. Run `binwatch login <email>` first.");
    };

    let client = ApiClient::from_config(&state.config.api);
    let start = Instant::now();
    let readings = match client.fetch_bins(&session) {
        Ok(readings) => readings,
        Err(e) => {
            state.log.record(
                &ActivityEntry::new(ActivityKind::FetchBins, false)
                    .with_latency(start.elapsed().as_millis() as u64)
                    .with_detail(format!("{e:#}")),
            );
            return ApiReply::error(502, &format!("Failed to load bin status: {e:#}"));
        }
    };
    let latency = start.elapsed().as_millis() as u64;

    match status::build_report(&readings, state.config.evaluator.capacity) {
        Ok(report) => {
            state.log.record(
                &ActivityEntry::new(ActivityKind::FetchBins, true)
                    .with_latency(latency)
                    .with_bins(report.bins.len(), report.alerts()),
            );
            ApiReply::ok(&report)
        }
        Err(e) => ApiReply::error(500, &e.to_string()),
    }
}

/// `GET /api/pages` — the page table.
pub fn get_pages() -> ApiReply {
    ApiReply::ok(&pages::all_pages())
}

/// `GET /api/evaluate?usage=N[&capacity=M]` — evaluate one reading.
pub fn get_evaluate(state: &DashboardState, url: &str) -> ApiReply {
    let Some(usage_count) = query_param(url, "usage").and_then(|v| v.parse::<i64>().ok()) else {
        return ApiReply::error(400, "missing or invalid 'usage' parameter");
    };

    let capacity = match query_param(url, "capacity") {
        Some(raw) => match raw.parse::<i64>() {
            Ok(capacity) => capacity,
            Err(_) => return ApiReply::error(400, "invalid 'capacity' parameter"),
        },
        None => state.config.evaluator.capacity,
    };

    let level = match evaluator::evaluate(&evaluator::BinReading::new("query", usage_count), capacity) {
        Ok(level) => level,
        Err(e) => return ApiReply::error(400, &e.to_string()),
    };

    ApiReply::ok(&EvaluateResponse {
        usage_count,
        capacity,
        percentage: level.percentage,
        status: level.status,
        style: level.status.style(),
        color: level.status.color_hex(),
    })
}

/// `GET /api/health` — API reachability and session state.
pub fn get_health(state: &DashboardState) -> ApiReply {
    let client = ApiClient::from_config(&state.config.api);
    let session = state.store.require_active(Utc::now()).ok();

    ApiReply::ok(&HealthResponse {
        api_url: client.base_url().to_string(),
        api_reachable: client.is_reachable(),
        signed_in: session.is_some(),
        display_name: session.map(|s| s.display_name),
        capacity: state.config.evaluator.capacity,
        capacity_valid: state.config.evaluator.capacity > 0,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::logger::ActivityLog;
    use crate::config::BinwatchConfig;
    use crate::session::SessionStore;

    fn state() -> DashboardState {
        DashboardState {
            config: BinwatchConfig::default(),
            store: SessionStore::at(std::env::temp_dir().join("binwatch-web-no-session.json")),
            log: ActivityLog::disabled(),
        }
    }

    #[test]
    fn query_param_extraction() {
        assert_eq!(query_param("/api/evaluate?usage=14", "usage").as_deref(), Some("14"));
        assert_eq!(
            query_param("/api/evaluate?usage=1&capacity=40", "capacity").as_deref(),
            Some("40")
        );
        assert_eq!(query_param("/api/evaluate", "usage"), None);
        assert_eq!(query_param("/api/evaluate?other=1", "usage"), None);
    }

    #[test]
    fn query_values_are_percent_decoded() {
        assert_eq!(query_param("/x?usage=%2D5", "usage").as_deref(), Some("-5"));
        assert_eq!(query_param("/x?name=a+b%20c", "name").as_deref(), Some("a b c"));
        assert_eq!(query_param("/x?v=%E2%9C%93", "v").as_deref(), Some("✓"));
        assert_eq!(query_param("/x?v=100%", "v").as_deref(), Some("100%"));
        assert_eq!(query_param("/x?v=%zz", "v").as_deref(), Some("%zz"));
        assert_eq!(query_param("/x?v=%+5", "v").as_deref(), Some("% 5"));
        assert_eq!(query_param("/x?v=%FF", "v"), None);
    }

    #[test]
    fn evaluate_accepts_encoded_negative_usage() {
        let reply = get_evaluate(&state(), "/api/evaluate?usage=%2D5");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["usage_count"], -5);
        assert_eq!(reply.body["percentage"], 100.0);
        assert_eq!(reply.body["status"], "high");
    }

    #[test]
    fn evaluate_uses_configured_capacity() {
        let reply = get_evaluate(&state(), "/api/evaluate?usage=14");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["percentage"], 50.0);
        assert_eq!(reply.body["status"], "medium");
        assert_eq!(reply.body["color"], "#FFC107");
    }

    #[test]
    fn evaluate_rejects_bad_input() {
        assert_eq!(get_evaluate(&state(), "/api/evaluate").status, 400);
        assert_eq!(get_evaluate(&state(), "/api/evaluate?usage=x").status, 400);
        assert_eq!(
            get_evaluate(&state(), "/api/evaluate?usage=3&capacity=-1").status,
            400
        );
    }

    #[test]
    fn bins_require_a_session() {
        assert_eq!(get_bins(&state()).status, 401);
    }

    #[test]
    fn pages_lists_all_routes() {
        let reply = get_pages();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.as_array().map(Vec::len), Some(8));
        assert_eq!(reply.body[1]["title"], "Shortest Route");
    }
}
