//! # Drawing Service Client
//!
//! Wrapper around the backend REST API used by the CLI.
//!
//! Failures are returned as `ClientError` and never retried here.

use crate::types::{Drawing, DrawingStatus, ErrorResponse, ExecuteRequest, MessageResponse};
use autoclick_core::{ConnectionFormat, GraphDocument};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cannot reach the backend.
    #[error("Cannot connect to backend at {0}")]
    ConnectionFailed(String),

    /// 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other 4xx status, with the backend's `error` message.
    #[error("Request rejected ({0}): {1}")]
    Rejected(u16, String),

    /// Server returned a 5xx error.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Failed to parse a request or response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// HTTP client for the drawing endpoints.
#[derive(Debug, Clone)]
pub struct DrawingClient {
    http: reqwest::Client,
    base_url: String,
}

impl DrawingClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ConnectionFailed(format!("{base_url}: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http.request(method, &url)
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Map error statuses and decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(if status == reqwest::StatusCode::NOT_FOUND {
                ClientError::NotFound(message)
            } else if status.is_client_error() {
                ClientError::Rejected(status.as_u16(), message)
            } else {
                ClientError::ServerError(status.as_u16(), message)
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// GET /drawings/{id}
    pub async fn get_drawing(&self, id: &str) -> Result<Drawing, ClientError> {
        let req = self.request(reqwest::Method::GET, &format!("/drawings/{id}"));
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// PUT /drawings/{id} with `{nodes}`.
    pub async fn save_drawing(
        &self,
        id: &str,
        document: &GraphDocument,
        format: ConnectionFormat,
    ) -> Result<MessageResponse, ClientError> {
        let body = document
            .to_value(format)
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        let req = self
            .request(reqwest::Method::PUT, &format!("/drawings/{id}"))
            .json(&body);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// POST /drawings/{id}/execute
    pub async fn start_execution(
        &self,
        id: &str,
        request: ExecuteRequest,
    ) -> Result<MessageResponse, ClientError> {
        let req = self
            .request(reqwest::Method::POST, &format!("/drawings/{id}/execute"))
            .json(&request);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// DELETE /drawings/{id}/execute
    pub async fn stop_execution(&self, id: &str) -> Result<MessageResponse, ClientError> {
        let req = self.request(reqwest::Method::DELETE, &format!("/drawings/{id}/execute"));
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// GET /drawings/{id}/status
    pub async fn status(&self, id: &str) -> Result<DrawingStatus, ClientError> {
        let req = self.request(reqwest::Method::GET, &format!("/drawings/{id}/status"));
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }
}
