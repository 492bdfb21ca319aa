pub mod access;
pub mod domain;
pub mod envelope;
pub mod language;
pub mod ports;
pub mod progress;
pub mod refresh;
pub mod session;
pub mod storage;

pub use access::{Access, Route, RouteGuard};
pub use domain::{
    Chapter, Comment, DashboardStats, Language, Novel, NovelSummary, Page, ProgressUpdate,
    ReadingRecord, ReadingStatus, Role, SessionTokens, User,
};
pub use language::LanguagePreference;
pub use ports::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, KeyValueStorage, LoginRedirect,
    PortError, PortResult, ProgressSync, SessionVerifier,
};
pub use progress::{ProgressSnapshot, ReadingProgressStore, SyncResult};
pub use refresh::{RefreshFailure, RefreshGate, RefreshLease, RefreshOutcome, RefreshTicket};
pub use session::{AuthenticatedSession, SessionPolicy, SessionState, SessionStore};
pub use storage::MemoryStorage;
