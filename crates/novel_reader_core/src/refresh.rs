//! crates/novel_reader_core/src/refresh.rs
//!
//! Single-flight coordination for access-token refresh.
//!
//! `RefreshGate` owns the only shared mutable state of the request path: the
//! "refresh in flight" flag and the queue of parked requests. Exactly one caller
//! holds a `RefreshLease` at a time; everyone else gets a `RefreshWaiter` that
//! resolves with the leader's outcome.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;

/// Why a refresh did not produce a new access token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RefreshFailure(pub String);

/// The new access token, or the failure shared by every parked request.
pub type RefreshOutcome = Result<String, RefreshFailure>;

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// The single-flight guard. Cloning shares the same gate.
#[derive(Debug, Clone, Default)]
pub struct RefreshGate {
    state: Arc<Mutex<GateState>>,
}

/// What `acquire_or_wait` hands back.
#[derive(Debug)]
pub enum RefreshTicket {
    /// The caller must perform the refresh and release the lease with its outcome.
    Leader(RefreshLease),
    /// A refresh is already running; await its outcome.
    Waiter(RefreshWaiter),
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Becomes the refresher if none is running, otherwise parks the caller.
    pub fn acquire_or_wait(&self) -> RefreshTicket {
        let mut state = self.lock();
        if state.in_flight {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            debug!("Refresh in flight, parking request ({} waiting).", state.waiters.len());
            RefreshTicket::Waiter(RefreshWaiter { receiver })
        } else {
            state.in_flight = true;
            debug!("Acquired refresh lease.");
            RefreshTicket::Leader(RefreshLease {
                gate: self.clone(),
                released: false,
            })
        }
    }

    /// Waits for a running refresh to finish. Returns `None` immediately when idle.
    pub async fn wait_if_in_flight(&self) -> Option<RefreshOutcome> {
        let waiter = {
            let mut state = self.lock();
            if !state.in_flight {
                return None;
            }
            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            RefreshWaiter { receiver }
        };
        Some(waiter.outcome().await)
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Number of requests currently parked behind the running refresh.
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    fn finish(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped no longer listens.
            let _ = waiter.send(outcome.clone());
        }
        debug!(
            "Refresh finished ({}), released {} parked request(s).",
            if outcome.is_ok() { "ok" } else { "failed" },
            released
        );
        released
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Proof of being the single refresher. Dropping it unreleased fails every waiter.
#[derive(Debug)]
pub struct RefreshLease {
    gate: RefreshGate,
    released: bool,
}

impl RefreshLease {
    /// Ends the refresh and hands `outcome` to every parked request.
    /// Returns how many requests were released.
    pub fn release(mut self, outcome: RefreshOutcome) -> usize {
        self.released = true;
        self.gate.finish(outcome)
    }
}

impl Drop for RefreshLease {
    fn drop(&mut self) {
        if !self.released {
            self.gate
                .finish(Err(RefreshFailure("token refresh was abandoned".to_string())));
        }
    }
}

/// A parked request.
#[derive(Debug)]
pub struct RefreshWaiter {
    receiver: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWaiter {
    pub async fn outcome(self) -> RefreshOutcome {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(RefreshFailure("token refresh was abandoned".to_string())))
    }
}
