//! Client for the remote storefront REST API.
//!
//! Every screen goes through [`ApiClient::send`]: method, path, optional auth
//! token, query pairs and optional JSON body in, a successful response or
//! [`ApiError`] out.

mod auth;
mod products;

pub use auth::{Credentials, SignupRequest};

use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Header carrying the session token on every authenticated call.
pub const AUTH_HEADER: &str = "x-auth-token";

pub const DEFAULT_API_BASE: &str = "https://dev-project-ecommerce.upgrad.dev/api";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issues one request. Non-2xx statuses become [`ApiError::Status`]; the
    /// error body is not inspected.
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.header(AUTH_HEADER, token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, "calling storefront API");
        let response = request.send().await.map_err(|e| {
            warn!(%method, %url, "request error: {}", e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%method, %url, %status, "storefront API rejected request");
            return Err(ApiError::Status {
                method,
                path: path.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.send::<()>(Method::GET, path, token, query, None).await?;
        response.json::<T>().await.map_err(ApiError::Decode)
    }
}
