//! Request dispatch - turning an endpoint test into an HTTP call

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RunnerConfig;
use crate::error::{DispatchError, RunnerResult};
use crate::fixture::EndpointTest;

/// Longest body excerpt quoted in a failure message
const BODY_EXCERPT_CHARS: usize = 100;

/// Methods the runner knows how to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for HttpMethod {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(DispatchError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request ready to send: method resolved, path parameters filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Method token as written in the fixture
    pub method: String,
    pub url: String,
}

/// Status and raw body of a completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Body pretty-printed as JSON when it parses, otherwise as-is
    pub fn pretty_body(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
            .unwrap_or_else(|| self.body.clone())
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}

/// Result of the readiness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy(_))
    }

    pub fn message(&self) -> &str {
        match self {
            HealthStatus::Healthy(msg) | HealthStatus::Unhealthy(msg) => msg,
        }
    }
}

/// Split `"METHOD /path"` on the first space
pub fn parse_endpoint(endpoint: &str) -> Result<(&str, &str), DispatchError> {
    endpoint
        .split_once(' ')
        .ok_or_else(|| DispatchError::InvalidEndpointFormat(endpoint.to_string()))
}

/// String form used for path and query parameters
pub fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace each `{key}` with its payload value. Single pass; unknown
/// placeholders are left in place.
pub fn substitute_path(path: &str, payload: &IndexMap<String, Value>) -> String {
    let mut url = path.to_string();
    for (key, value) in payload {
        let placeholder = format!("{{{}}}", key);
        if url.contains(&placeholder) {
            url = url.replace(&placeholder, &param_string(value));
        }
    }
    url
}

/// Payload flattened into query pairs. Arrays repeat the key, nulls are dropped.
pub fn query_pairs(payload: &IndexMap<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(payload.len());
    for (key, value) in payload {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    pairs.push((key.clone(), param_string(item)));
                }
            }
            other => pairs.push((key.clone(), param_string(other))),
        }
    }
    pairs
}

/// Map a response to pass or to an `UnexpectedStatus` failure
pub fn classify(response: &HttpResponse) -> Result<(), DispatchError> {
    if response.is_pass() {
        return Ok(());
    }

    Err(DispatchError::UnexpectedStatus {
        status: response.status,
        detail: failure_detail(&response.body),
    })
}

/// `detail` from a JSON object body, else the start of the raw body
fn failure_detail(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = map.get("detail") {
            return param_string(detail);
        }
    }
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Issues endpoint and health-check requests against one base URL
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    base_url: String,
    health_path: String,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(config: &RunnerConfig) -> RunnerResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_path: config.health_path.clone(),
            health_timeout: config.health_timeout(),
            request_timeout: config.request_timeout(),
        })
    }

    /// Resolve the URL for a test without touching the network
    pub fn prepare(&self, test: &EndpointTest) -> Result<PreparedRequest, DispatchError> {
        let (method, path) = parse_endpoint(&test.endpoint)?;
        let path = substitute_path(path, &test.request);
        Ok(PreparedRequest {
            method: method.to_string(),
            url: format!("{}{}", self.base_url, path),
        })
    }

    /// Send a prepared request. Any status comes back as `Ok`; use
    /// [`classify`] to judge it.
    pub async fn send(
        &self,
        prepared: &PreparedRequest,
        payload: &IndexMap<String, Value>,
    ) -> Result<HttpResponse, DispatchError> {
        let method: HttpMethod = prepared.method.parse()?;
        debug!(%method, url = %prepared.url, "dispatching request");

        let request = match method {
            HttpMethod::Get => self.client.get(&prepared.url).query(&query_pairs(payload)),
            HttpMethod::Post => self.client.post(&prepared.url).json(payload),
            HttpMethod::Put => self.client.put(&prepared.url).json(payload),
            HttpMethod::Delete => self.client.delete(&prepared.url),
        };

        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %prepared.url, "request failed: {}", e);
                DispatchError::from(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(DispatchError::from)?;
        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }

    /// Probe the health endpoint once
    pub async fn health_check(&self) -> HealthStatus {
        let url = format!("{}{}", self.base_url, self.health_path);
        debug!(url = %url, "checking server health");

        match self.client.get(&url).timeout(self.health_timeout).send().await {
            Ok(resp) if resp.status().as_u16() == 200 => {
                HealthStatus::Healthy(format!("Server is running at {}", self.base_url))
            }
            Ok(resp) => HealthStatus::Unhealthy(format!(
                "Unexpected status code: {}",
                resp.status().as_u16()
            )),
            Err(e) if e.is_connect() => {
                HealthStatus::Unhealthy(format!("Cannot connect to {}", self.base_url))
            }
            Err(e) => {
                warn!("health check error: {}", e);
                HealthStatus::Unhealthy(format!("Error: {}", e))
            }
        }
    }
}
