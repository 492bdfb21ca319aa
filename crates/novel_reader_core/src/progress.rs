//! crates/novel_reader_core/src/progress.rs
//!
//! Local-first reading progress: the ongoing and completed shelves plus the
//! cached library of bookmarked novels.
//!
//! Every mutation is applied to the in-memory snapshot and written to durable
//! storage before any network call. The backend push that follows is
//! best-effort; its outcome is reported as a `SyncResult` and never rolls back
//! local state.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::{Novel, NovelSummary, ProgressUpdate, ReadingRecord, ReadingStatus};
use crate::ports::{KeyValueStorage, ProgressSync};
use crate::session::SessionStore;
use crate::storage::{self, COMPLETED_NOVELS, LIBRARY_BOOKMARKS, ONGOING_NOVELS};

/// Outcome of the backend half of a local-first operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Nothing was sent: the reader is anonymous or the call changed nothing.
    Skipped,
    Synced,
    /// The backend call failed; local state is kept as is.
    Failed(String),
}

impl SyncResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncResult::Failed(_))
    }
}

/// Everything the shelves show at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub ongoing: Vec<ReadingRecord>,
    pub completed: Vec<ReadingRecord>,
    pub library: Vec<Novel>,
}

impl ProgressSnapshot {
    fn position(records: &[ReadingRecord], novel_id: &str) -> Option<usize> {
        records.iter().position(|r| r.novel_id == novel_id)
    }

    fn is_ongoing(&self, novel_id: &str) -> bool {
        Self::position(&self.ongoing, novel_id).is_some()
    }

    fn is_completed(&self, novel_id: &str) -> bool {
        Self::position(&self.completed, novel_id).is_some()
    }
}

pub struct ReadingProgressStore {
    storage: Arc<dyn KeyValueStorage>,
    session: Arc<SessionStore>,
    sync: Arc<dyn ProgressSync>,
    state: watch::Sender<ProgressSnapshot>,
}

impl ReadingProgressStore {
    /// Creates the store and loads the shelves from durable storage.
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        session: Arc<SessionStore>,
        sync: Arc<dyn ProgressSync>,
    ) -> Self {
        let snapshot = load_snapshot(storage.as_ref());
        let (state, _) = watch::channel(snapshot);
        Self {
            storage,
            session,
            sync,
            state,
        }
    }

    /// Puts a novel on the ongoing shelf at chapter 1. No-op when the novel is already
    /// ongoing or completed.
    pub async fn start_reading(&self, summary: &NovelSummary) -> SyncResult {
        let now = Utc::now();
        let mut started = None;

        self.state.send_if_modified(|snapshot| {
            if snapshot.is_completed(&summary.novel_id) || snapshot.is_ongoing(&summary.novel_id) {
                return false;
            }
            let record = ReadingRecord::started(summary, now);
            started = Some(record.clone());
            snapshot.ongoing.push(record);
            true
        });

        let Some(record) = started else {
            debug!("'{}' is already on a shelf.", summary.novel_id);
            return SyncResult::Skipped;
        };

        info!("Started reading '{}'.", record.title);
        self.persist_ongoing();
        self.push(&record, ReadingStatus::Ongoing).await
    }

    /// Moves the ongoing record to the given chapter. Novels that are not ongoing are
    /// left untouched; `chapter_order` of `None` keeps the stored order.
    pub async fn update_progress(
        &self,
        novel_id: &str,
        chapter_id: &str,
        chapter_order: Option<u32>,
    ) -> SyncResult {
        let now = Utc::now();
        let mut updated = None;

        self.state.send_if_modified(|snapshot| {
            let Some(index) = ProgressSnapshot::position(&snapshot.ongoing, novel_id) else {
                return false;
            };
            let record = &mut snapshot.ongoing[index];
            record.last_chapter_id = Some(chapter_id.to_string());
            if let Some(order) = chapter_order {
                record.last_chapter_order = order;
            }
            record.updated_at = now;
            updated = Some(record.clone());
            true
        });

        let Some(record) = updated else {
            debug!("'{}' is not on the ongoing shelf, progress not recorded.", novel_id);
            return SyncResult::Skipped;
        };

        self.persist_ongoing();
        self.push(&record, ReadingStatus::Ongoing).await
    }

    /// Moves a novel from the ongoing shelf to the completed shelf. Completing an
    /// already completed novel changes nothing.
    pub async fn complete_novel(&self, summary: &NovelSummary) -> SyncResult {
        let now = Utc::now();
        let mut completed = None;

        let changed = self.state.send_if_modified(|snapshot| {
            let ongoing = ProgressSnapshot::position(&snapshot.ongoing, &summary.novel_id)
                .map(|index| snapshot.ongoing.remove(index));

            if snapshot.is_completed(&summary.novel_id) {
                return ongoing.is_some();
            }

            let mut record = ongoing.unwrap_or_else(|| ReadingRecord::started(summary, now));
            record.updated_at = now;
            record.completed_at = Some(now);
            completed = Some(record.clone());
            snapshot.completed.push(record);
            true
        });

        if changed {
            self.persist_ongoing();
            self.persist_completed();
        }

        let Some(record) = completed else {
            debug!("'{}' is already completed.", summary.novel_id);
            return SyncResult::Skipped;
        };

        info!("Completed '{}'.", record.title);
        self.push(&record, ReadingStatus::Completed).await
    }

    /// Pulls the bookmarked novels from the backend. Only runs for signed-in readers and
    /// only when asked, so page views never pay for it.
    pub async fn refresh_library(&self) -> SyncResult {
        if !self.session.is_authenticated() {
            return SyncResult::Skipped;
        }

        match self.sync.fetch_bookmarks().await {
            Ok(novels) => {
                info!("Library refreshed with {} bookmark(s).", novels.len());
                self.state.send_modify(|snapshot| snapshot.library = novels);
                self.persist_library();
                SyncResult::Synced
            }
            Err(e) => {
                warn!("Failed to refresh library, keeping cached bookmarks: {}", e);
                SyncResult::Failed(e.to_string())
            }
        }
    }

    pub async fn add_bookmark(&self, novel: &Novel) -> SyncResult {
        let added = self.state.send_if_modified(|snapshot| {
            if snapshot.library.iter().any(|n| n.id == novel.id) {
                return false;
            }
            let mut bookmarked = novel.clone();
            bookmarked.bookmarked = true;
            snapshot.library.push(bookmarked);
            true
        });
        if !added {
            return SyncResult::Skipped;
        }

        self.persist_library();
        if !self.session.is_authenticated() {
            return SyncResult::Skipped;
        }
        into_sync_result(self.sync.add_bookmark(&novel.id).await, "add bookmark")
    }

    pub async fn remove_bookmark(&self, novel_id: &str) -> SyncResult {
        let removed = self.state.send_if_modified(|snapshot| {
            let before = snapshot.library.len();
            snapshot.library.retain(|n| n.id != novel_id);
            snapshot.library.len() != before
        });
        if !removed {
            return SyncResult::Skipped;
        }

        self.persist_library();
        if !self.session.is_authenticated() {
            return SyncResult::Skipped;
        }
        into_sync_result(self.sync.remove_bookmark(novel_id).await, "remove bookmark")
    }

    /// Re-reads the shelves from durable storage, discarding in-memory state.
    pub fn reload(&self) {
        self.state.send_replace(load_snapshot(self.storage.as_ref()));
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.borrow().clone()
    }

    pub fn ongoing(&self) -> Vec<ReadingRecord> {
        self.state.borrow().ongoing.clone()
    }

    pub fn completed(&self) -> Vec<ReadingRecord> {
        self.state.borrow().completed.clone()
    }

    pub fn library(&self) -> Vec<Novel> {
        self.state.borrow().library.clone()
    }

    pub fn record(&self, novel_id: &str) -> Option<ReadingRecord> {
        let snapshot = self.state.borrow();
        snapshot
            .ongoing
            .iter()
            .chain(snapshot.completed.iter())
            .find(|r| r.novel_id == novel_id)
            .cloned()
    }

    pub fn is_completed(&self, novel_id: &str) -> bool {
        self.state.borrow().is_completed(novel_id)
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.state.subscribe()
    }

    async fn push(&self, record: &ReadingRecord, status: ReadingStatus) -> SyncResult {
        if !self.session.is_authenticated() {
            return SyncResult::Skipped;
        }
        let update = ProgressUpdate::from_record(record, status);
        into_sync_result(self.sync.push_progress(&update).await, "sync reading progress")
    }

    fn persist_ongoing(&self) {
        let records = self.ongoing();
        self.persist(ONGOING_NOVELS, &records);
    }

    fn persist_completed(&self) {
        let records = self.completed();
        self.persist(COMPLETED_NOVELS, &records);
    }

    fn persist_library(&self) {
        let novels = self.library();
        self.persist(LIBRARY_BOOKMARKS, &novels);
    }

    fn persist<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = storage::write_json(self.storage.as_ref(), key, value) {
            warn!("Failed to persist '{}': {}", key, e);
        }
    }
}

fn into_sync_result(result: crate::ports::PortResult<()>, action: &str) -> SyncResult {
    match result {
        Ok(()) => SyncResult::Synced,
        Err(e) => {
            warn!("Failed to {}, local state kept: {}", action, e);
            SyncResult::Failed(e.to_string())
        }
    }
}

/// Loads the shelves, repairing anything that violates the one-shelf-per-novel rule.
fn load_snapshot(storage: &dyn KeyValueStorage) -> ProgressSnapshot {
    let mut completed: Vec<ReadingRecord> =
        storage::read_json(storage, COMPLETED_NOVELS).unwrap_or_default();
    dedup_by_novel(&mut completed);

    let mut ongoing: Vec<ReadingRecord> =
        storage::read_json(storage, ONGOING_NOVELS).unwrap_or_default();
    dedup_by_novel(&mut ongoing);
    let before = ongoing.len();
    ongoing.retain(|r| !completed.iter().any(|c| c.novel_id == r.novel_id));
    if ongoing.len() != before {
        warn!("Dropped {} ongoing record(s) already marked completed.", before - ongoing.len());
    }

    let library: Vec<Novel> = storage::read_json(storage, LIBRARY_BOOKMARKS).unwrap_or_default();

    ProgressSnapshot {
        ongoing,
        completed,
        library,
    }
}

fn dedup_by_novel(records: &mut Vec<ReadingRecord>) {
    let mut seen = std::collections::HashSet::new();
    records.retain(|r| seen.insert(r.novel_id.clone()));
}
