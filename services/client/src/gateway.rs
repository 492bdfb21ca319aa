//! services/client/src/gateway.rs
//!
//! The authenticated HTTP client every service talks through.
//!
//! The gateway attaches the stored bearer token, turns error responses into
//! `ClientError`s with a readable message, and recovers from an expired access
//! token: the first request to see a 401 refreshes the token pair while every
//! other request parks on the `RefreshGate` and replays once the outcome is known.

use std::sync::Arc;

use novel_reader_core::envelope::{decode_data, decode_page, extract_error_message, parse_body};
use novel_reader_core::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, LoginRedirect};
use novel_reader_core::refresh::{RefreshFailure, RefreshGate, RefreshTicket};
use novel_reader_core::{Page, SessionStore, SessionTokens};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::endpoints;
use crate::error::{ClientError, ClientResult};

/// Per-request knobs.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Pass a 401 straight through instead of refreshing. Set on the auth endpoints.
    pub skip_refresh: bool,
    pub query: Vec<(String, String)>,
    /// Overrides the stored access token for the first attempt.
    pub bearer: Option<String>,
}

impl RequestOptions {
    pub fn skip_refresh() -> Self {
        Self {
            skip_refresh: true,
            ..Self::default()
        }
    }

    pub fn query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// The HTTP client with refresh coordination.
pub struct ApiGateway {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
    gate: RefreshGate,
}

impl ApiGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            transport,
            session,
            redirect,
            gate: RefreshGate::new(),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn refresh_gate(&self) -> &RefreshGate {
        &self.gate
    }

    /// Sends one request and returns the parsed response body.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ClientResult<Value> {
        if !options.skip_refresh {
            // Don't go out with a token that is about to be replaced.
            if let Some(Err(failure)) = self.gate.wait_if_in_flight().await {
                return Err(ClientError::Authentication(failure.0));
            }
        }

        let bearer = options.bearer.clone().or_else(|| self.session.access_token());
        let response = self
            .send(method, path, body.as_ref(), &options.query, bearer.clone())
            .await?;

        if response.status != 401 || options.skip_refresh {
            return Self::finish(response);
        }

        debug!("{} {} was rejected with 401.", method.as_str(), path);
        let token = match self.session.access_token() {
            // Another request already rotated the pair while this one was in flight.
            Some(current) if bearer.as_deref() != Some(current.as_str()) => current,
            // A refresh failed while this one was in flight; the session is already over.
            None if bearer.is_some() => {
                debug!("{} {} finished after the session ended.", method.as_str(), path);
                return Err(ClientError::Authentication("Session has ended".to_string()));
            }
            _ => self.refresh_session().await?,
        };

        let retried = self
            .send(method, path, body.as_ref(), &options.query, Some(token))
            .await?;
        if retried.status == 401 {
            let message = extract_error_message(retried.status, &retried.body);
            warn!("{} {} was rejected again after a token refresh.", method.as_str(), path);
            self.end_session();
            return Err(ClientError::Authentication(message));
        }
        Self::finish(retried)
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> ClientResult<Value> {
        self.request(HttpMethod::Get, path, None, options).await
    }

    pub async fn post(&self, path: &str, body: Value, options: RequestOptions) -> ClientResult<Value> {
        self.request(HttpMethod::Post, path, Some(body), options).await
    }

    pub async fn put(&self, path: &str, body: Value) -> ClientResult<Value> {
        self.request(HttpMethod::Put, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn delete(&self, path: &str, body: Option<Value>) -> ClientResult<Value> {
        self.request(HttpMethod::Delete, path, body, RequestOptions::default())
            .await
    }

    /// `GET` and decode the payload out of its envelope.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let body = self.get(path, options).await?;
        Ok(decode_data(&body)?)
    }

    /// `GET` a cursor-paginated listing.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<Page<T>> {
        let body = self.get(path, options).await?;
        Ok(decode_page(&body)?)
    }

    /// Any method with a JSON body, decoding the enveloped payload.
    pub async fn send_data<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let body = self.request(method, path, body, options).await?;
        Ok(decode_data(&body)?)
    }

    //=====================================================================================
    // Refresh coordination
    //=====================================================================================

    /// Refreshes the token pair, or waits for the refresh already running.
    /// On failure the session is signed out and the login redirect fires.
    pub async fn refresh_session(&self) -> ClientResult<String> {
        match self.gate.acquire_or_wait() {
            RefreshTicket::Leader(lease) => match self.refresh_tokens().await {
                Ok(token) => {
                    let released = lease.release(Ok(token.clone()));
                    info!("Access token refreshed; replaying {} parked request(s).", released);
                    Ok(token)
                }
                Err(e) => {
                    let message = match e {
                        ClientError::Authentication(message) => message,
                        other => other.to_string(),
                    };
                    warn!("Token refresh failed: {}", message);
                    // Clear the session before waking the parked requests.
                    self.end_session();
                    lease.release(Err(RefreshFailure(message.clone())));
                    Err(ClientError::Authentication(message))
                }
            },
            RefreshTicket::Waiter(waiter) => waiter
                .outcome()
                .await
                .map_err(|failure| ClientError::Authentication(failure.0)),
        }
    }

    async fn refresh_tokens(&self) -> ClientResult<String> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ClientError::Authentication("No refresh token available".to_string()))?;

        let body = json!({ "refreshToken": refresh_token });
        let response = self
            .send(HttpMethod::Post, endpoints::REFRESH, Some(&body), &[], None)
            .await?;
        if !response.is_success() {
            return Err(ClientError::Authentication(extract_error_message(
                response.status,
                &response.body,
            )));
        }

        let tokens: SessionTokens = decode_data(&parse_body(&response.body)?)?;
        self.session
            .rotate_tokens(&tokens.access_token, tokens.refresh_token.as_deref())?;
        Ok(tokens.access_token)
    }

    fn end_session(&self) {
        self.session.sign_out();
        self.redirect.redirect_to_login();
    }

    //=====================================================================================
    // Wire helpers
    //=====================================================================================

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        query: &[(String, String)],
        bearer: Option<String>,
    ) -> ClientResult<HttpResponse> {
        let request = HttpRequest::new(method, path)
            .with_body(body.cloned())
            .with_query(query.to_vec())
            .with_bearer(bearer);

        debug!("Sending {} {}", method.as_str(), path);
        let response = self.transport.send(request).await.map_err(|e| {
            warn!("{} {} failed without a response: {}", method.as_str(), path, e);
            ClientError::from(e)
        })?;
        debug!("{} {} -> {}", method.as_str(), path, response.status);
        Ok(response)
    }

    fn finish(response: HttpResponse) -> ClientResult<Value> {
        if response.is_success() {
            return Ok(parse_body(&response.body)?);
        }
        Err(ClientError::Http {
            status: response.status,
            message: extract_error_message(response.status, &response.body),
        })
    }
}

