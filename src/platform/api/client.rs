//! Dynatrace API gateway
//!
//! Provides authenticated, blocking access to the Dynatrace Environment API.
//! All calls are single attempts with a fixed timeout.

use super::error::{ApiError, Result};
use super::types::{DashboardCreated, EntitiesResponse, EntityTypesResponse, MetricQueryResponse};
use crate::config::types::DynatraceConfig;
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// User agent for API requests
const USER_AGENT: &str = concat!("dtk-ctl/", env!("CARGO_PKG_VERSION"));

/// Entity search endpoint
pub const ENTITIES_PATH: &str = "/api/v2/entities";
/// Entity type listing endpoint
pub const ENTITY_TYPES_PATH: &str = "/api/v2/entityTypes";
/// Metric query endpoint
pub const METRICS_QUERY_PATH: &str = "/api/v2/metrics/query";
/// Dashboard creation endpoint
pub const DASHBOARDS_PATH: &str = "/api/config/v1/dashboards";

/// Query parameters as sent on the wire
pub type QueryParams<'a> = [(&'a str, String)];

/// The seam between the resolver/aggregator and the network.
///
/// Implementations return decoded JSON for 2xx answers and an [`ApiError`]
/// otherwise. The typed helpers decode the common endpoints on top of the two
/// raw verbs.
pub trait MonitoringApi {
    /// Make an authenticated GET request
    fn get(&self, path: &str, query: &QueryParams<'_>) -> Result<Value>;

    /// Make an authenticated POST request with a JSON body
    fn post(&self, path: &str, body: &Value) -> Result<Value>;

    /// Search entities by selector
    ///
    /// Endpoint: GET /api/v2/entities
    fn list_entities(
        &self,
        selector: &str,
        fields: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<EntitiesResponse> {
        let mut query = vec![("entitySelector", selector.to_string())];
        if let Some(fields) = fields {
            query.push(("fields", fields.to_string()));
        }
        if let Some(page_size) = page_size {
            query.push(("pageSize", page_size.to_string()));
        }
        decode(self.get(ENTITIES_PATH, &query)?)
    }

    /// List the entity types known to the environment
    ///
    /// Endpoint: GET /api/v2/entityTypes
    fn entity_types(&self) -> Result<EntityTypesResponse> {
        decode(self.get(ENTITY_TYPES_PATH, &[])?)
    }

    /// Query a metric selector for the entities matched by `entity_selector`
    ///
    /// Endpoint: GET /api/v2/metrics/query
    fn query_metrics(
        &self,
        metric_selector: &str,
        entity_selector: &str,
        from: &str,
        to: &str,
        resolution: &str,
    ) -> Result<MetricQueryResponse> {
        let query = [
            ("metricSelector", metric_selector.to_string()),
            ("entitySelector", entity_selector.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("resolution", resolution.to_string()),
        ];
        decode(self.get(METRICS_QUERY_PATH, &query)?)
    }

    /// Create a dashboard and return its generated identifier
    ///
    /// Endpoint: POST /api/config/v1/dashboards
    fn create_dashboard(&self, payload: &Value) -> Result<String> {
        let created: DashboardCreated = decode(self.post(DASHBOARDS_PATH, payload)?)?;
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::Parse("dashboard response carried no id".to_string()))
    }
}

/// Decode a JSON value into a wire type
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Blocking client for a single Dynatrace environment
pub struct DynatraceClient {
    /// HTTP client with configured timeout and default headers
    http_client: Client,
    /// Environment URL without trailing slash
    base_url: String,
}

impl DynatraceClient {
    /// Create a client from validated configuration
    pub fn new(config: &DynatraceConfig) -> Result<Self> {
        Self::with_credentials(
            &config.url,
            &config.api_token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a client for an explicit environment URL and API token
    pub fn with_credentials(base_url: &str, api_token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Api-Token {}", api_token))
            .map_err(|e| ApiError::Parse(format!("invalid API token: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the configured environment URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browser URL of a created dashboard
    pub fn dashboard_url(&self, dashboard_id: &str) -> String {
        format!("{}/#dashboard;id={}", self.base_url, dashboard_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert the HTTP response into decoded JSON or an [`ApiError`]
    fn handle_response(response: Response) -> Result<Value> {
        let status = response.status();
        debug!("Response status code: {}", status.as_u16());

        let body = response.text()?;
        if !status.is_success() {
            debug!("Response body: {}", body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

impl MonitoringApi for DynatraceClient {
    fn get(&self, path: &str, query: &QueryParams<'_>) -> Result<Value> {
        let url = Url::parse_with_params(&self.url(path), query)
            .map_err(|e| ApiError::Parse(format!("invalid request URL: {}", e)))?;
        debug!("GET {}", self.url(path));
        if !query.is_empty() {
            debug!("Parameters: {:?}", query);
        }

        let response = self.http_client.get(url).send()?;
        Self::handle_response(response)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self.http_client.post(&url).json(body).send()?;
        Self::handle_response(response)
    }
}
