//! services/client/src/services/novels.rs
//!
//! Catalog browsing plus the per-reader toggles (likes and bookmarks).

use std::sync::Arc;

use novel_reader_core::envelope::decode_data;
use novel_reader_core::ports::HttpMethod;
use novel_reader_core::{Chapter, Novel, Page};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::endpoints;
use crate::error::ClientResult;
use crate::gateway::{ApiGateway, RequestOptions};

/// Filters and cursor for the catalog listing.
#[derive(Debug, Clone, Default)]
pub struct NovelQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub genre: Option<String>,
}

impl NovelQuery {
    pub fn after(cursor: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor.into()),
            ..Self::default()
        }
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor".to_string(), cursor.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.is_empty()) {
            pairs.push(("genre".to_string(), genre.to_string()));
        }
        pairs
    }
}

/// The like counter after a toggle.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LikeStatus {
    #[serde(alias = "isLiked")]
    pub liked: bool,
    #[serde(alias = "likeCount")]
    pub likes: u64,
}

#[derive(Clone)]
pub struct NovelService {
    gateway: Arc<ApiGateway>,
}

impl NovelService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_novels(&self, query: &NovelQuery) -> ClientResult<Page<Novel>> {
        let options = RequestOptions {
            query: query.to_pairs(),
            ..RequestOptions::default()
        };
        self.gateway.get_page(endpoints::NOVELS, options).await
    }

    pub async fn get_novel(&self, novel_id: &str) -> ClientResult<Novel> {
        self.gateway
            .get_data(&endpoints::novel(novel_id), RequestOptions::default())
            .await
    }

    /// Chapter listing for a novel, in reading order.
    pub async fn list_chapters(&self, novel_id: &str) -> ClientResult<Vec<Chapter>> {
        let page: Page<Chapter> = self
            .gateway
            .get_page(&endpoints::novel_chapters(novel_id), RequestOptions::default())
            .await?;
        let mut chapters = page.items;
        chapters.sort_by_key(|c| c.order);
        Ok(chapters)
    }

    pub async fn get_chapter(&self, novel_id: &str, chapter_id: &str) -> ClientResult<Chapter> {
        self.gateway
            .get_data(
                &endpoints::novel_chapter(novel_id, chapter_id),
                RequestOptions::default(),
            )
            .await
    }

    pub async fn like_novel(&self, novel_id: &str) -> ClientResult<LikeStatus> {
        self.toggle(HttpMethod::Post, endpoints::NOVEL_LIKE, Some(novel_body(novel_id)))
            .await
    }

    pub async fn unlike_novel(&self, novel_id: &str) -> ClientResult<LikeStatus> {
        self.toggle(HttpMethod::Delete, endpoints::NOVEL_LIKE, Some(novel_body(novel_id)))
            .await
    }

    pub async fn like_chapter(&self, chapter_id: &str) -> ClientResult<LikeStatus> {
        self.toggle(HttpMethod::Post, &endpoints::chapter_like(chapter_id), None)
            .await
    }

    pub async fn unlike_chapter(&self, chapter_id: &str) -> ClientResult<LikeStatus> {
        self.toggle(HttpMethod::Delete, &endpoints::chapter_like(chapter_id), None)
            .await
    }

    pub async fn bookmark(&self, novel_id: &str) -> ClientResult<()> {
        self.gateway
            .post(endpoints::NOVEL_BOOKMARK, novel_body(novel_id), RequestOptions::default())
            .await?;
        Ok(())
    }

    pub async fn unbookmark(&self, novel_id: &str) -> ClientResult<()> {
        self.gateway
            .delete(endpoints::NOVEL_BOOKMARK, Some(novel_body(novel_id)))
            .await?;
        Ok(())
    }

    /// The signed-in reader's bookmarked novels.
    pub async fn bookmarks(&self) -> ClientResult<Vec<Novel>> {
        let page: Page<Novel> = self
            .gateway
            .get_page(endpoints::NOVEL_BOOKMARKS, RequestOptions::default())
            .await?;
        Ok(page.items)
    }

    async fn toggle(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<LikeStatus> {
        let response = self
            .gateway
            .request(method, path, body, RequestOptions::default())
            .await?;
        // Some toggles answer with an empty body.
        if response.is_null() {
            return Ok(LikeStatus::default());
        }
        Ok(decode_data(&response)?)
    }
}

fn novel_body(novel_id: &str) -> Value {
    json!({ "novelId": novel_id })
}
