//! services/client/src/services/auth.rs
//!
//! Login, signup, verification and refresh. Successful login and signup move the
//! session to `Authenticated`; logout is purely local.

use std::sync::Arc;

use async_trait::async_trait;
use novel_reader_core::ports::{HttpMethod, PortResult, SessionVerifier};
use novel_reader_core::{SessionTokens, User};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::endpoints;
use crate::error::ClientResult;
use crate::gateway::{ApiGateway, RequestOptions};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// What login and signup answer with: the token pair next to the profile.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(flatten)]
    tokens: SessionTokens,
    user: User,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VerifyResponse {
    Wrapped { user: User },
    Bare(User),
}

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<ApiGateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let body = json!({ "email": credentials.email, "password": credentials.password });
        self.authenticate(endpoints::LOGIN, body).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<User> {
        let body = json!({
            "username": request.username,
            "email": request.email,
            "password": request.password,
        });
        self.authenticate(endpoints::SIGNUP, body).await
    }

    /// Confirms the stored access token and returns its owner.
    pub async fn verify(&self) -> ClientResult<User> {
        self.verify_with(RequestOptions::default()).await
    }

    /// Mints a new access token through the gateway's single-flight refresh.
    pub async fn refresh(&self) -> ClientResult<String> {
        self.gateway.refresh_session().await
    }

    pub fn logout(&self) {
        self.gateway.session().sign_out();
    }

    async fn authenticate(&self, path: &str, body: Value) -> ClientResult<User> {
        let response: AuthResponse = self
            .gateway
            .send_data(HttpMethod::Post, path, Some(body), RequestOptions::skip_refresh())
            .await?;

        self.gateway
            .session()
            .sign_in(response.tokens, response.user.clone())?;
        info!("Authenticated '{}' via {}.", response.user.username, path);
        Ok(response.user)
    }

    async fn verify_with(&self, options: RequestOptions) -> ClientResult<User> {
        let response: VerifyResponse = self.gateway.get_data(endpoints::VERIFY, options).await?;
        Ok(match response {
            VerifyResponse::Wrapped { user } | VerifyResponse::Bare(user) => user,
        })
    }
}

#[async_trait]
impl SessionVerifier for AuthService {
    async fn verify(&self, access_token: &str) -> PortResult<User> {
        self.verify_with(RequestOptions::default().with_bearer(access_token))
            .await
            .map_err(Into::into)
    }
}

