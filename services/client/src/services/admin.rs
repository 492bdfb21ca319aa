//! services/client/src/services/admin.rs
//!
//! The admin CRUD surface for novels, chapters and the dashboard counters.
//! The backend enforces the role; the route guard keeps readers from getting here.

use std::sync::Arc;

use novel_reader_core::ports::HttpMethod;
use novel_reader_core::{Chapter, DashboardStats, Novel, Page};
use serde::Serialize;
use serde_json::Value;

use crate::endpoints;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{ApiGateway, RequestOptions};

/// Fields an admin can set on a novel. `None` leaves a field untouched on update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tamil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_tamil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "chapterNumber")]
    pub order: Option<u32>,
}

#[derive(Clone)]
pub struct AdminService {
    gateway: Arc<ApiGateway>,
}

impl AdminService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
        self.gateway
            .get_data(endpoints::ADMIN_STATS, RequestOptions::default())
            .await
    }

    pub async fn list_novels(&self, cursor: Option<&str>) -> ClientResult<Page<Novel>> {
        let options = match cursor {
            Some(cursor) => RequestOptions::query([("cursor", cursor)]),
            None => RequestOptions::default(),
        };
        self.gateway.get_page(endpoints::ADMIN_NOVELS, options).await
    }

    pub async fn create_novel(&self, draft: &NovelDraft) -> ClientResult<Novel> {
        if draft.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(ClientError::InvalidInput("A novel needs a title".to_string()));
        }
        self.write(HttpMethod::Post, endpoints::ADMIN_NOVELS, to_body(draft)?)
            .await
    }

    pub async fn update_novel(&self, novel_id: &str, draft: &NovelDraft) -> ClientResult<Novel> {
        self.write(HttpMethod::Put, &endpoints::admin_novel(novel_id), to_body(draft)?)
            .await
    }

    pub async fn delete_novel(&self, novel_id: &str) -> ClientResult<()> {
        self.gateway
            .delete(&endpoints::admin_novel(novel_id), None)
            .await?;
        Ok(())
    }

    pub async fn create_chapter(&self, novel_id: &str, draft: &ChapterDraft) -> ClientResult<Chapter> {
        if draft.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(ClientError::InvalidInput("A chapter needs a title".to_string()));
        }
        self.write(
            HttpMethod::Post,
            &endpoints::admin_novel_chapters(novel_id),
            to_body(draft)?,
        )
        .await
    }

    pub async fn update_chapter(&self, chapter_id: &str, draft: &ChapterDraft) -> ClientResult<Chapter> {
        self.write(HttpMethod::Put, &endpoints::admin_chapter(chapter_id), to_body(draft)?)
            .await
    }

    pub async fn delete_chapter(&self, chapter_id: &str) -> ClientResult<()> {
        self.gateway
            .delete(&endpoints::admin_chapter(chapter_id), None)
            .await?;
        Ok(())
    }

    async fn write<T: serde::de::DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Value,
    ) -> ClientResult<T> {
        self.gateway
            .send_data(method, path, Some(body), RequestOptions::default())
            .await
    }
}

fn to_body<T: Serialize>(draft: &T) -> ClientResult<Value> {
    serde_json::to_value(draft).map_err(|e| ClientError::InvalidInput(e.to_string()))
}
