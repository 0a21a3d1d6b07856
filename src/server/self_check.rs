//! Post-start health check of the service's own endpoints.
//!
//! Advisory only: results are logged, nothing else depends on them.

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::api::{TABLES_PATH, TEST_CONNECTION_PATH};

/// Endpoints probed after startup, as (label, path).
pub const CHECKED_ENDPOINTS: [(&str, &str); 2] = [
    ("DB Connection", TEST_CONNECTION_PATH),
    ("Table List", TABLES_PATH),
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of probing one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointStatus {
    Ok,
    Unreachable(String),
    BadHttp(StatusCode),
    NotSuccess,
}

impl EndpointStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, EndpointStatus::Ok)
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointStatus::Ok => write!(f, "OK"),
            EndpointStatus::Unreachable(e) => write!(f, "UNREACHABLE ({})", e),
            EndpointStatus::BadHttp(status) => write!(f, "BAD HTTP {}", status),
            EndpointStatus::NotSuccess => write!(f, "BAD (Status not success)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub name: &'static str,
    pub url: String,
    pub status: EndpointStatus,
}

/// True when `body` is a JSON object whose `status` field is `"success"`.
/// Extra fields are ignored.
pub fn is_json_status_success(body: &[u8]) -> bool {
    #[derive(Deserialize)]
    struct StatusResponse {
        status: String,
    }

    serde_json::from_slice::<StatusResponse>(body)
        .map(|resp| resp.status == "success")
        .unwrap_or(false)
}

async fn probe(client: &reqwest::Client, url: Url) -> EndpointStatus {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return EndpointStatus::Unreachable(e.to_string()),
    };

    let status = response.status();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return EndpointStatus::Unreachable(e.to_string()),
    };

    if status != StatusCode::OK {
        EndpointStatus::BadHttp(status)
    } else if !is_json_status_success(&body) {
        EndpointStatus::NotSuccess
    } else {
        EndpointStatus::Ok
    }
}

/// Probe every endpoint in [`CHECKED_ENDPOINTS`] under `base`.
pub async fn check_endpoints(client: &reqwest::Client, base: &Url) -> Vec<EndpointReport> {
    let mut reports = Vec::with_capacity(CHECKED_ENDPOINTS.len());

    for (name, path) in CHECKED_ENDPOINTS {
        let (url, status) = match base.join(path) {
            Ok(url) => (url.to_string(), probe(client, url).await),
            Err(e) => (
                format!("{}{}", base, path),
                EndpointStatus::Unreachable(e.to_string()),
            ),
        };
        reports.push(EndpointReport { name, url, status });
    }

    reports
}

/// Probe the endpoints, log one line each plus a summary, and return whether
/// all of them are healthy.
pub async fn perform_endpoint_health_checks(base: &Url) -> bool {
    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Endpoint health checks skipped: {}", e);
            return false;
        }
    };

    tracing::info!("Performing endpoint health checks:");
    let reports = check_endpoints(&client, base).await;

    for report in &reports {
        if report.status.is_ok() {
            tracing::info!("  [{}] {} ... {}", report.name, report.url, report.status);
        } else {
            tracing::warn!("  [{}] {} ... {}", report.name, report.url, report.status);
        }
    }

    let all_healthy = reports.iter().all(|r| r.status.is_ok());
    if all_healthy {
        tracing::info!("Endpoint health summary: ALL SYSTEMS OPERATIONAL");
    } else {
        tracing::warn!("Endpoint health summary: ISSUES DETECTED");
    }
    all_healthy
}
