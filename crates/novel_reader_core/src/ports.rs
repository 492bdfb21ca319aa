//! crates/novel_reader_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture: the stores and
//! the refresh coordination never see a concrete HTTP library, filesystem or UI.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Novel, ProgressUpdate, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external collaborators (network, storage).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// HTTP Transport
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A request as the gateway hands it to the transport. `path` is relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_bearer(mut self, bearer: Option<String>) -> Self {
        self.bearer = bearer;
        self
    }
}

/// A raw response. Any status code counts as a delivered response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request. Returns `PortError::Network` only when no response arrived
    /// (connection failure, timeout).
    async fn send(&self, request: HttpRequest) -> PortResult<HttpResponse>;
}

//=========================================================================================
// Durable Client Storage
//=========================================================================================

/// A durable string key-value store, the equivalent of browser local storage.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

//=========================================================================================
// Navigation and Backend Collaborators
//=========================================================================================

/// The navigation side effect of an irrecoverable authentication failure.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Confirms that a stored access token is still accepted and returns its owner.
    async fn verify(&self, access_token: &str) -> PortResult<User>;
}

#[async_trait]
pub trait ProgressSync: Send + Sync {
    async fn push_progress(&self, update: &ProgressUpdate) -> PortResult<()>;

    async fn fetch_bookmarks(&self) -> PortResult<Vec<Novel>>;

    async fn add_bookmark(&self, novel_id: &str) -> PortResult<()>;

    async fn remove_bookmark(&self, novel_id: &str) -> PortResult<()>;
}
