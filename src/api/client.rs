use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use yansi::Paint;

use crate::config::AppConfig;
use crate::error::FetchError;

/// Thin HTTP client for the training backend.
/// Handles bearer authentication, request building, and error responses.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("trainboard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<Vec<(String, String)>>,
    ) -> Result<T, FetchError> {
        self.call(Method::GET, endpoint, None, params).await
    }

    pub async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> Result<T, FetchError> {
        self.call(Method::POST, endpoint, Some(body), None).await
    }

    /// Issue a request whose response body is irrelevant.
    pub async fn send(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<(), FetchError> {
        self.request(method, endpoint, body, None).await.map(|_| ())
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        params: Option<Vec<(String, String)>>,
    ) -> Result<T, FetchError> {
        let resp = self.request(method, endpoint, body, params).await?;
        resp.json::<T>().await.map_err(|e| {
            tracing::warn!(endpoint, %e, "Response body did not match the expected shape");
            FetchError::Decode(e.to_string())
        })
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        params: Option<Vec<(String, String)>>,
    ) -> Result<reqwest::Response, FetchError> {
        tracing::debug!(
            "Request: {}",
            curl_line(&method, &self.base_url, endpoint, body.as_ref(), params.as_deref(), !self.token.is_empty())
        );

        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.client.request(method.clone(), &url);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }
        if let Some(ref p) = params {
            req = req.query(p);
        }
        if let Some(ref b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, endpoint, %e, "Request failed");
            FetchError::Network(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%method, endpoint, status = status.as_u16(), "API returned an error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(resp)
    }
}

/// Render a request as a copy-pasteable curl command. The token is never
/// echoed.
pub fn curl_line(
    method: &Method,
    base_url: &str,
    endpoint: &str,
    body: Option<&Value>,
    params: Option<&[(String, String)]>,
    authenticated: bool,
) -> String {
    let mut url = format!("{}{}", base_url, endpoint);
    if let Some(p) = params {
        if !p.is_empty() {
            url = format!("{}?{}", url, crate::utils::build_query_string(p));
        }
    }

    let mut parts = Vec::new();
    parts.push(Paint::new("curl").green().bold().to_string());
    parts.push(format!("-X {}", Paint::new(method.as_str()).yellow().bold()));
    parts.push(format!("'{}'", Paint::new(&url).cyan()));
    if authenticated {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").magenta(),
            Paint::new("'Authorization: Bearer ***'").magenta()
        ));
    }
    if let Some(d) = body {
        let json_str = serde_json::to_string(d).unwrap_or_default();
        let escaped_json = json_str.replace('\'', "'\\''");
        parts.push(format!(
            "{} {}",
            Paint::new("-H").magenta(),
            Paint::new("'Content-Type: application/json'").magenta()
        ));
        parts.push(format!("{} '{}'", Paint::new("-d").blue(), escaped_json));
    }
    parts.join(" ")
}
