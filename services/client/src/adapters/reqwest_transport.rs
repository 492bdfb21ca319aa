//! services/client/src/adapters/reqwest_transport.rs
//!
//! This module contains the adapter that carries gateway requests over HTTP.
//! It implements the `HttpTransport` port from the `core` crate.

use std::time::Duration;

use async_trait::async_trait;
use novel_reader_core::ports::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, PortError, PortResult,
};
use reqwest::{Client, Method};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `HttpTransport` port using `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport` for the API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

//=========================================================================================
// `HttpTransport` Trait Implementation
//=========================================================================================

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> PortResult<HttpResponse> {
        let mut builder = self
            .client
            .request(method_of(request.method), self.url(&request.path))
            .header("Accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // Anything that fails before a status line arrives is a network failure.
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PortError::Network("Request timed out".to_string())
            } else {
                PortError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}
