//! services/client/src/app.rs
//!
//! The composition root. Every store and service is built here once and handed
//! its collaborators explicitly; nothing in the crate reaches for a global.

use std::sync::Arc;

use novel_reader_core::ports::{HttpTransport, KeyValueStorage, LoginRedirect};
use novel_reader_core::{
    Access, LanguagePreference, ReadingProgressStore, Route, RouteGuard, SessionState, SessionStore,
};
use tracing::info;

use crate::adapters::{ConsoleRedirect, FileStorage, ReqwestTransport};
use crate::config::Config;
use crate::error::ClientResult;
use crate::gateway::ApiGateway;
use crate::services::{AdminService, AuthService, CommentService, NovelService, ReadingService};

/// The wired-up client: stores, gateway and services sharing one session.
pub struct ReaderApp {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub gateway: Arc<ApiGateway>,
    pub progress: ReadingProgressStore,
    pub language: LanguagePreference,
    pub auth: AuthService,
    pub novels: NovelService,
    pub comments: CommentService,
    pub reading: ReadingService,
    pub admin: AdminService,
}

impl ReaderApp {
    pub fn new(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStorage>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(storage.clone(), config.session_policy()));
        let gateway = Arc::new(ApiGateway::new(transport, session.clone(), redirect));

        let auth = AuthService::new(gateway.clone());
        let novels = NovelService::new(gateway.clone());
        let comments = CommentService::new(gateway.clone());
        let reading = ReadingService::new(gateway.clone());
        let admin = AdminService::new(gateway.clone());

        let progress = ReadingProgressStore::new(
            storage.clone(),
            session.clone(),
            Arc::new(reading.clone()),
        );
        let language = LanguagePreference::new(storage, config.default_language);

        Self {
            config,
            session,
            gateway,
            progress,
            language,
            auth,
            novels,
            comments,
            reading,
            admin,
        }
    }

    /// Builds the production adapters from configuration.
    pub fn from_config(config: Config) -> ClientResult<(Self, Arc<ConsoleRedirect>)> {
        let transport = Arc::new(ReqwestTransport::new(
            &config.api_base_url,
            config.request_timeout,
        )?);
        let storage = Arc::new(FileStorage::open(&config.storage_path)?);
        let redirect = Arc::new(ConsoleRedirect::new());
        info!(
            "Using API at {} with storage at {}.",
            config.api_base_url,
            config.storage_path.display()
        );
        Ok((Self::new(config, transport, storage, redirect.clone()), redirect))
    }

    /// Resolves the session from storage, verifying the stored token with the backend.
    pub async fn restore_session(&self) -> SessionState {
        self.session.restore(&self.auth).await
    }

    pub fn check_route(&self, path: &str) -> (Route, Access) {
        let route = Route::parse(path);
        let access = RouteGuard::check(&route, &self.session.current());
        (route, access)
    }
}
