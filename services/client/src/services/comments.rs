//! services/client/src/services/comments.rs

use std::sync::Arc;

use novel_reader_core::ports::HttpMethod;
use novel_reader_core::{Comment, Page};
use serde_json::json;

use crate::endpoints;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{ApiGateway, RequestOptions};

#[derive(Debug, Clone)]
pub struct NewComment {
    pub novel_id: String,
    pub chapter_id: String,
    pub content: String,
}

#[derive(Clone)]
pub struct CommentService {
    gateway: Arc<ApiGateway>,
}

impl CommentService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_for_chapter(&self, chapter_id: &str) -> ClientResult<Vec<Comment>> {
        let page: Page<Comment> = self
            .gateway
            .get_page(&endpoints::chapter_comments(chapter_id), RequestOptions::default())
            .await?;
        Ok(page.items)
    }

    pub async fn post(&self, comment: &NewComment) -> ClientResult<Comment> {
        if comment.content.trim().is_empty() {
            return Err(ClientError::InvalidInput("Comment cannot be empty".to_string()));
        }

        let body = json!({
            "novelId": comment.novel_id,
            "chapterId": comment.chapter_id,
            "content": comment.content.trim(),
        });
        self.gateway
            .send_data(HttpMethod::Post, endpoints::COMMENTS, Some(body), RequestOptions::default())
            .await
    }
}
