//! services/client/src/services/reading.rs
//!
//! Server-side reading progress. This is the backend half of the local-first
//! progress store: it implements the `ProgressSync` port the store pushes through.

use std::sync::Arc;

use async_trait::async_trait;
use novel_reader_core::ports::{PortResult, ProgressSync};
use novel_reader_core::{Novel, ProgressUpdate};

use crate::endpoints;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{ApiGateway, RequestOptions};
use crate::services::novels::NovelService;

#[derive(Clone)]
pub struct ReadingService {
    gateway: Arc<ApiGateway>,
    novels: NovelService,
}

impl ReadingService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        let novels = NovelService::new(gateway.clone());
        Self { gateway, novels }
    }

    /// Everything the backend remembers about the signed-in reader's progress.
    pub async fn fetch_progress(&self) -> ClientResult<Vec<ProgressUpdate>> {
        self.gateway
            .get_data(endpoints::READING_PROGRESS, RequestOptions::default())
            .await
    }

    pub async fn push_progress(&self, update: &ProgressUpdate) -> ClientResult<()> {
        let body = serde_json::to_value(update)
            .map_err(|e| ClientError::InvalidInput(e.to_string()))?;
        self.gateway
            .post(endpoints::READING_PROGRESS, body, RequestOptions::default())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProgressSync for ReadingService {
    async fn push_progress(&self, update: &ProgressUpdate) -> PortResult<()> {
        ReadingService::push_progress(self, update)
            .await
            .map_err(Into::into)
    }

    async fn fetch_bookmarks(&self) -> PortResult<Vec<Novel>> {
        self.novels.bookmarks().await.map_err(Into::into)
    }

    async fn add_bookmark(&self, novel_id: &str) -> PortResult<()> {
        self.novels.bookmark(novel_id).await.map_err(Into::into)
    }

    async fn remove_bookmark(&self, novel_id: &str) -> PortResult<()> {
        self.novels.unbookmark(novel_id).await.map_err(Into::into)
    }
}
