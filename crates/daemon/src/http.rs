// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the remote API.
//!
//! Every response is unwrapped from the `{ "data": ... }` envelope here, and
//! every failure leaves this module as a classified [`RemoteError`].

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use ferry_core::{RemoteError, RemoteResult};

use crate::config::Config;
use crate::error::Result;

const USER_AGENT: &str = concat!("ferryd/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Envelope of acknowledgement responses. A missing `data` field reads as
/// `None`.
#[derive(Deserialize)]
struct Ack<T> {
    data: Option<T>,
}

/// Shared HTTP client bound to the API base URL.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(
        base: Url,
        token: Option<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(HttpClient {
            client,
            base,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.base_url()?,
            config.api_token(),
            Duration::from_secs(config.remote.timeout_secs),
            Duration::from_secs(config.remote.connect_timeout_secs),
        )
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET `path` and decode the enveloped body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> RemoteResult<T> {
        let body = self
            .execute(self.request(Method::GET, path)?.query(query))
            .await?;
        decode(&body)
    }

    /// Send `body` as JSON and decode the enveloped record.
    pub async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> RemoteResult<T> {
        let body = self
            .execute(self.request(method, path)?.json(body))
            .await?;
        decode(&body)
    }

    /// Like [`send`](Self::send), for endpoints that may answer without a
    /// record. A missing body is not an error.
    pub async fn send_optional<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> RemoteResult<Option<T>> {
        let mut request = self.request(method, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        let body = self.execute(request).await?;
        decode_optional(&body)
    }

    fn request(&self, method: Method, path: &str) -> RemoteResult<RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| RemoteError::Unknown(format!("invalid request path '{path}': {e}")))?;
        let request = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn execute(&self, request: RequestBuilder) -> RemoteResult<String> {
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await.map_err(classify_transport)?;
        tracing::debug!(status = status.as_u16(), path = %url, "remote response");

        if status.is_success() {
            Ok(body)
        } else {
            let body = Some(body.as_str()).filter(|b| !b.trim().is_empty());
            Err(RemoteError::from_status(status.as_u16(), body))
        }
    }
}

/// Map a transport-level failure. Anything that kept the request from
/// reaching the server counts as an unreachable network.
pub(crate) fn classify_transport(err: reqwest::Error) -> RemoteError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        tracing::debug!(error = %err, "remote unreachable");
        RemoteError::NetworkUnreachable(
            "Unable to reach the server. Please check your internet connection.".to_string(),
        )
    } else {
        RemoteError::Unknown(err.to_string())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| RemoteError::Unknown(format!("invalid response body: {e}")))
}

pub(crate) fn decode_optional<T: DeserializeOwned>(body: &str) -> RemoteResult<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Ack<T>>(body)
        .map(|ack| ack.data)
        .map_err(|e| RemoteError::Unknown(format!("invalid response body: {e}")))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
