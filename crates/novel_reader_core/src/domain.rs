//! crates/novel_reader_core/src/domain.rs
//!
//! Defines the core data structures shared by the stores and the services.
//! Backend records are mirrored as plain DTOs; the only client-owned
//! invariants live on `ReadingRecord` and are enforced by the progress store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Users and Sessions
//=========================================================================================

/// The role attached to a user profile. Unknown roles from the backend fall back to `Reader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(rename = "user", other)]
    Reader,
}

/// A user profile as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The credential pair minted by login, signup and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

//=========================================================================================
// Language
//=========================================================================================

/// The two interface languages of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "ta")]
    Tamil,
    #[default]
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Tamil => "ta",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "ta" | "tamil" => Some(Language::Tamil),
            "en" | "english" => Some(Language::English),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Language::Tamil => Language::English,
            Language::English => Language::Tamil,
        }
    }
}

//=========================================================================================
// Catalog Records
//=========================================================================================

/// A novel in the public catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "tamilTitle")]
    pub title_tamil: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default, alias = "cover")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "totalChapters")]
    pub chapter_count: u32,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default, alias = "isLiked")]
    pub liked: bool,
    #[serde(default, alias = "isBookmarked")]
    pub bookmarked: bool,
}

impl Novel {
    /// Picks the Tamil title when the reader prefers Tamil and one is available.
    pub fn display_title(&self, language: Language) -> &str {
        match (language, self.title_tamil.as_deref()) {
            (Language::Tamil, Some(title)) if !title.trim().is_empty() => title,
            _ => &self.title,
        }
    }

    pub fn summary(&self) -> NovelSummary {
        NovelSummary {
            novel_id: self.id.clone(),
            title: self.title.clone(),
            cover_image: self.cover_image.clone(),
            author: self.author.clone(),
        }
    }
}

/// A chapter of a novel. `content` is empty in chapter listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub novel_id: String,
    #[serde(default, alias = "chapterNumber", alias = "chapterOrder")]
    pub order: u32,
    pub title: String,
    #[serde(default, alias = "tamilTitle")]
    pub title_tamil: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, alias = "isLiked")]
    pub liked: bool,
}

impl Chapter {
    pub fn display_title(&self, language: Language) -> &str {
        match (language, self.title_tamil.as_deref()) {
            (Language::Tamil, Some(title)) if !title.trim().is_empty() => title,
            _ => &self.title,
        }
    }
}

/// A reader comment attached to a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub chapter_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Aggregate counters shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_novels: u64,
    pub total_chapters: u64,
    pub total_users: u64,
    pub total_views: u64,
    pub total_comments: u64,
}

//=========================================================================================
// Reading Progress
//=========================================================================================

/// The descriptive fields a caller hands over when a novel enters or leaves the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelSummary {
    pub novel_id: String,
    pub title: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: String,
}

impl NovelSummary {
    pub fn new(novel_id: &str, title: &str, cover_image: Option<&str>, author: &str) -> Self {
        Self {
            novel_id: novel_id.to_string(),
            title: title.to_string(),
            cover_image: cover_image.map(str::to_string),
            author: author.to_string(),
        }
    }
}

/// A per-novel reading-progress record. Lives in exactly one of the ongoing or completed sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRecord {
    pub novel_id: String,
    pub title: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: String,
    pub last_chapter_order: u32,
    #[serde(default)]
    pub last_chapter_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReadingRecord {
    pub fn started(summary: &NovelSummary, now: DateTime<Utc>) -> Self {
        Self {
            novel_id: summary.novel_id.clone(),
            title: summary.title.clone(),
            cover_image: summary.cover_image.clone(),
            author: summary.author.clone(),
            last_chapter_order: 1,
            last_chapter_id: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

/// Whether a progress update concerns an ongoing or a finished novel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Ongoing,
    Completed,
}

/// The payload pushed to the backend whenever local progress changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub novel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    pub chapter_order: u32,
    pub status: ReadingStatus,
}

impl ProgressUpdate {
    pub fn from_record(record: &ReadingRecord, status: ReadingStatus) -> Self {
        Self {
            novel_id: record.novel_id.clone(),
            chapter_id: record.last_chapter_id.clone(),
            chapter_order: record.last_chapter_order,
            status,
        }
    }
}
