//! services/client/src/adapters/console_redirect.rs
//!
//! The terminal stand-in for navigating to the login page.

use std::sync::atomic::{AtomicUsize, Ordering};

use novel_reader_core::ports::LoginRedirect;
use tracing::warn;

/// Logs that the reader has to sign in again and counts how often that happened.
#[derive(Debug, Default)]
pub struct ConsoleRedirect {
    redirects: AtomicUsize,
}

impl ConsoleRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_required(&self) -> bool {
        self.redirects() > 0
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for ConsoleRedirect {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        warn!("Your session has ended. Run `reader login` to sign in again.");
    }
}
