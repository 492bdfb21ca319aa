//! services/client/src/endpoints.rs
//!
//! The backend path table. Paths are relative to the configured API base URL.

pub const LOGIN: &str = "/auth/login";
pub const SIGNUP: &str = "/auth/signup";
pub const VERIFY: &str = "/auth/verify";
pub const REFRESH: &str = "/auth/refresh";

pub const NOVELS: &str = "/novels";
pub const NOVEL_BOOKMARK: &str = "/novels/bookmark";
pub const NOVEL_BOOKMARKS: &str = "/novels/bookmarks";
pub const NOVEL_LIKE: &str = "/novels/like";

pub const READING_PROGRESS: &str = "/reading/progress";
pub const COMMENTS: &str = "/comments";

pub const ADMIN_STATS: &str = "/admin/dashboard/stats";
pub const ADMIN_NOVELS: &str = "/admin/novels";

pub fn novel(id: &str) -> String {
    format!("{}/{}", NOVELS, id)
}

pub fn novel_chapters(novel_id: &str) -> String {
    format!("{}/{}/chapters", NOVELS, novel_id)
}

pub fn novel_chapter(novel_id: &str, chapter_id: &str) -> String {
    format!("{}/{}/chapters/{}", NOVELS, novel_id, chapter_id)
}

pub fn chapter_like(chapter_id: &str) -> String {
    format!("/chapters/{}/like", chapter_id)
}

pub fn chapter_comments(chapter_id: &str) -> String {
    format!("{}/{}", COMMENTS, chapter_id)
}

pub fn admin_novel(id: &str) -> String {
    format!("{}/{}", ADMIN_NOVELS, id)
}

pub fn admin_novel_chapters(novel_id: &str) -> String {
    format!("{}/{}/chapters", ADMIN_NOVELS, novel_id)
}

pub fn admin_chapter(chapter_id: &str) -> String {
    format!("/admin/chapters/{}", chapter_id)
}
