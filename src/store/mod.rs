// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side state stores.
//!
//! Each store keeps its state behind a `tokio::sync::watch` channel. All
//! mutations go through a synchronous reducer while the channel's write
//! lock is held, so no two reducers on the same store ever interleave.
//! Asynchronous operations follow pending → (fulfilled | rejected).
//!
//! Fetches are tagged per slot with a monotonically increasing sequence
//! number. A completion whose tag is no longer the latest for its slot is
//! dropped, so a slow response can never overwrite a newer one.

pub mod auth;
pub mod leaderboards;
pub mod threads;

pub use auth::{AuthAction, AuthStore, Session, SessionStatus};
pub use leaderboards::{LeaderboardAction, LeaderboardState, LeaderboardStore};
pub use threads::{ThreadsAction, ThreadsState, ThreadsStore};

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// State that evolves only through its reducer.
pub trait Reducer {
    type Action;

    fn reduce(&mut self, action: Self::Action);
}

/// Tag of one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RequestToken {
    slot: &'static str,
    seq: u64,
}

/// Latest issued request per slot.
#[derive(Default)]
pub(crate) struct RequestTracker {
    next: AtomicU64,
    latest: DashMap<&'static str, u64>,
}

impl RequestTracker {
    /// Issue a new token for `slot`, superseding any outstanding one.
    pub(crate) fn begin(&self, slot: &'static str) -> RequestToken {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        self.latest.insert(slot, seq);
        RequestToken { slot, seq }
    }

    /// Retire `token` if it is still the latest for its slot.
    ///
    /// Returns `false` for superseded or cancelled requests.
    pub(crate) fn finish(&self, token: RequestToken) -> bool {
        self.latest
            .remove_if(token.slot, |_, seq| *seq == token.seq)
            .is_some()
    }

    /// Retire whatever is outstanding for `slot`. Returns whether anything was.
    pub(crate) fn cancel(&self, slot: &'static str) -> bool {
        self.latest.remove(slot).is_some()
    }

    pub(crate) fn in_flight(&self, slot: &'static str) -> bool {
        self.latest.contains_key(slot)
    }
}

/// State cell shared by all stores.
pub(crate) struct StoreCore<S> {
    state: watch::Sender<S>,
    requests: RequestTracker,
}

impl<S: Reducer + Clone> StoreCore<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            requests: RequestTracker::default(),
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub(crate) fn dispatch(&self, action: S::Action) {
        self.state.send_modify(|state| state.reduce(action));
    }

    /// Run `f` under the state lock and notify subscribers.
    pub(crate) fn update<R: Default>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut out = R::default();
        self.state.send_modify(|state| out = f(state));
        out
    }

    /// Apply `action` only if `token` is still current. Returns whether it was.
    pub(crate) fn dispatch_if_current(&self, token: RequestToken, action: S::Action) -> bool {
        self.update_if_current(token, |state| state.reduce(action))
    }

    /// Run `f` under the state lock only if `token` is still current.
    ///
    /// Side effects in `f` are serialized with every other dispatch on
    /// this store.
    pub(crate) fn update_if_current(&self, token: RequestToken, f: impl FnOnce(&mut S)) -> bool {
        self.state.send_if_modified(|state| {
            if self.requests.finish(token) {
                f(state);
                true
            } else {
                tracing::debug!(slot = token.slot, seq = token.seq, "Dropping stale response");
                false
            }
        })
    }

    pub(crate) fn requests(&self) -> &RequestTracker {
        &self.requests
    }
}
