use crate::error::SyncError;
use crate::utils::constants::{EXPIRES_HEADER, PAGES_HEADER};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Query parameters and credentials for one upstream resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpstreamParams {
    pub query: Vec<(String, String)>,
    /// Sent as `Authorization: Bearer ...`. Obtaining it is the caller's job.
    pub bearer_token: Option<String>,
}

impl UpstreamParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// Key identifying the cached resource: the path plus its query, so that
    /// e.g. the buy and sell listings of one region are tracked separately.
    /// The token is not part of the key.
    pub fn resource_key(&self, path: &str) -> String {
        if self.query.is_empty() {
            return path.to_string();
        }
        let query: Vec<String> = self.query.iter().map(|(key, value)| format!("{key}={value}")).collect();
        format!("{}?{}", path, query.join("&"))
    }
}

/// One page of an upstream response.
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamPage {
    pub body: Value,
    /// Authoritative expiry of this resource.
    pub expires: Option<DateTime<Utc>>,
    /// Total page count declared by the upstream, if any.
    pub pages: Option<u32>,
}

impl UpstreamPage {
    pub fn new(body: Value) -> Self {
        Self { body, expires: None, pages: None }
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = Some(pages);
        self
    }
}

#[async_trait]
pub trait UpstreamApi: Send + Sync {
    async fn fetch(&self, path: &str, params: &UpstreamParams, page: u32) -> Result<UpstreamPage, SyncError>;
}

/// reqwest-backed client for the read-only upstream REST API.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: String,
    datasource: String,
    user_agent: String,
}

impl HttpUpstream {
    /// `timeout == None` leaves requests unbounded; a hung request then keeps
    /// the resource locked until it returns.
    pub fn new(base_url: String, datasource: String, user_agent: String, timeout: Option<Duration>) -> Result<Self, SyncError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| SyncError::Http { path: base_url.clone(), source })?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), datasource, user_agent })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn fetch(&self, path: &str, params: &UpstreamParams, page: u32) -> Result<UpstreamPage, SyncError> {
        let url = self.url_for(path);
        debug!(%url, page, "GET upstream");

        let mut request = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[("datasource", self.datasource.as_str())])
            .query(&params.query)
            .query(&[("page", page)]);
        if let Some(token) = &params.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| SyncError::Http { path: path.to_string(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UpstreamStatus { path: path.to_string(), status: status.as_u16() });
        }

        let expires = parse_expires(response.headers());
        let pages = parse_pages(response.headers());
        let body: Value = response.json().await.map_err(|source| SyncError::Http { path: path.to_string(), source })?;

        Ok(UpstreamPage { body, expires, pages })
    }
}

/// Parses the HTTP-date in `Expires`, e.g. `Wed, 21 Oct 2026 07:28:00 GMT`.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value).ok().map(|date| date.with_timezone(&Utc))
}

fn parse_expires(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let raw = headers.get(EXPIRES_HEADER)?.to_str().ok()?;
    let parsed = parse_http_date(raw);
    if parsed.is_none() {
        warn!(value = raw, "Ignoring unparseable Expires header");
    }
    parsed
}

fn parse_pages(headers: &HeaderMap) -> Option<u32> {
    let raw = headers.get(PAGES_HEADER)?.to_str().ok()?;
    match raw.trim().parse() {
        Ok(pages) => Some(pages),
        Err(e) => {
            warn!(value = raw, "Ignoring unparseable page count header: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_http_date("Wed, 21 Oct 2026 07:28:00 GMT").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 21, 7, 28, 0).unwrap());
        assert!(parse_http_date("not a date").is_none());
    }

    #[test]
    fn test_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_pages(&headers), None);
        assert_eq!(parse_expires(&headers), None);

        headers.insert(PAGES_HEADER, HeaderValue::from_static("3"));
        headers.insert(EXPIRES_HEADER, HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        assert_eq!(parse_pages(&headers), Some(3));
        assert!(parse_expires(&headers).is_some());

        headers.insert(PAGES_HEADER, HeaderValue::from_static("many"));
        assert_eq!(parse_pages(&headers), None);
    }

    #[test]
    fn test_params_builder() {
        let params = UpstreamParams::new().with_query("order_type", "buy").with_token(Some("abc".to_string()));
        assert_eq!(params.query, vec![("order_type".to_string(), "buy".to_string())]);
        assert_eq!(params.bearer_token.as_deref(), Some("abc"));
        assert_eq!(params.resource_key("/markets/1/orders/"), "/markets/1/orders/?order_type=buy");
        assert_eq!(UpstreamParams::new().resource_key("/universe/types/"), "/universe/types/");
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let upstream =
            HttpUpstream::new("https://esi.example/latest/".to_string(), "tranquility".to_string(), "test".to_string(), None)
                .unwrap();
        assert_eq!(upstream.url_for("/universe/regions/"), "https://esi.example/latest/universe/regions/");
    }
}
