//! services/client/src/services/mod.rs
//!
//! Typed wrappers over the gateway, one function per backend operation.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod novels;
pub mod reading;

pub use admin::{AdminService, ChapterDraft, NovelDraft};
pub use auth::{AuthService, Credentials, SignupRequest};
pub use comments::{CommentService, NewComment};
pub use novels::{LikeStatus, NovelQuery, NovelService};
pub use reading::ReadingService;
