//! Control API trait and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::types::{
    AuthCheck, ConnectivityReport, LoginRequest, LoginResponse, ModelListResponse,
    ModelTestReport, TestModelRequest,
};
use crate::error::{ConsoleError, Result};
use crate::model::{GatewayConfig, Provider};

pub const AUTH_CHECK_PATH: &str = "/admin/api/auth-check";
pub const LOGIN_PATH: &str = "/admin/api/login";
pub const CONFIG_PATH: &str = "/admin/api/config";
pub const PROVIDER_TEST_PATH: &str = "/admin/api/providers/test";
pub const PROVIDER_MODELS_PATH: &str = "/admin/api/providers/models";
pub const PROVIDER_TEST_MODEL_PATH: &str = "/admin/api/providers/test-model";

#[async_trait]
pub trait ControlApi: Send + Sync {
    /// Whether the console must log in before using the other calls.
    async fn auth_check(&self) -> Result<AuthCheck>;

    /// Submit the admin password. A wrong password is an `ok: false` body,
    /// not an error.
    async fn login(&self, password: &str) -> Result<LoginResponse>;

    async fn get_config(&self) -> Result<GatewayConfig>;

    /// Replace the whole aggregate; returns the server's stored copy.
    async fn put_config(&self, config: &GatewayConfig) -> Result<GatewayConfig>;

    async fn test_provider(&self, provider: &Provider) -> Result<ConnectivityReport>;

    async fn list_models(&self, provider: &Provider) -> Result<ModelListResponse>;

    async fn test_model(&self, provider: &Provider, model: &str) -> Result<ModelTestReport>;
}

/// reqwest-backed control API client.
///
/// Keeps a cookie store so the session cookie set by a successful login is
/// sent on every later call.
#[derive(Debug, Clone)]
pub struct HttpControlClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpControlClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T> {
        tracing::debug!(path = %path, "control api request");
        let resp = req.send().await.map_err(|e| {
            tracing::warn!("control api unreachable ({}): {}", path, e);
            ConsoleError::Transport(e)
        })?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("control api rejected session ({})", path);
            return Err(ConsoleError::Unauthenticated);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            let detail = error_detail(status, &body);
            tracing::warn!("control api {} answered HTTP {}: {}", path, status.as_u16(), detail);
            return Err(ConsoleError::failed(Some(status.as_u16()), detail));
        }
        serde_json::from_str(&body).map_err(|e| {
            ConsoleError::failed(
                Some(status.as_u16()),
                format!("unexpected response from {path}: {e}"),
            )
        })
    }
}

/// Prefer the `error` field of a JSON body, then the raw text, then the reason phrase.
fn error_detail(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .filter(|s| !s.trim().is_empty());
    if let Some(msg) = from_json {
        return msg;
    }
    let text = body.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[async_trait]
impl ControlApi for HttpControlClient {
    async fn auth_check(&self) -> Result<AuthCheck> {
        let req = self.request(Method::GET, AUTH_CHECK_PATH);
        self.send_json(req, AUTH_CHECK_PATH).await
    }

    async fn login(&self, password: &str) -> Result<LoginResponse> {
        let req = self
            .request(Method::POST, LOGIN_PATH)
            .json(&LoginRequest { password });
        self.send_json(req, LOGIN_PATH).await
    }

    async fn get_config(&self) -> Result<GatewayConfig> {
        let req = self.request(Method::GET, CONFIG_PATH);
        self.send_json(req, CONFIG_PATH).await
    }

    async fn put_config(&self, config: &GatewayConfig) -> Result<GatewayConfig> {
        let req = self.request(Method::PUT, CONFIG_PATH).json(config);
        self.send_json(req, CONFIG_PATH).await
    }

    async fn test_provider(&self, provider: &Provider) -> Result<ConnectivityReport> {
        let req = self.request(Method::POST, PROVIDER_TEST_PATH).json(provider);
        self.send_json(req, PROVIDER_TEST_PATH).await
    }

    async fn list_models(&self, provider: &Provider) -> Result<ModelListResponse> {
        let req = self.request(Method::POST, PROVIDER_MODELS_PATH).json(provider);
        self.send_json(req, PROVIDER_MODELS_PATH).await
    }

    async fn test_model(&self, provider: &Provider, model: &str) -> Result<ModelTestReport> {
        let req = self
            .request(Method::POST, PROVIDER_TEST_MODEL_PATH)
            .json(&TestModelRequest { provider, model });
        self.send_json(req, PROVIDER_TEST_MODEL_PATH).await
    }
}
