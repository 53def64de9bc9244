// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thread list, open thread detail, and optimistic votes.
//!
//! `threads` and `thread_detail` are independent copies of overlapping
//! data. An optimistic vote is applied to every copy of the entity in the
//! same reducer call, using the single toggle rule in [`Votes::toggle`].
//! The store never rolls a vote back; callers reconcile by re-fetching.
//!
//! [`Votes::toggle`]: crate::models::Votes::toggle

use crate::error::AppError;
use crate::models::{Comment, NewThread, Thread, ThreadDetail, User, VoteDirection, VoteType};
use crate::services::ForumClient;
use crate::store::{Reducer, StoreCore};
use std::collections::HashMap;
use tokio::sync::watch;

const THREADS_SLOT: &str = "threads";
const DETAIL_SLOT: &str = "thread_detail";

/// Message reported when the thread list or user list is rejected by the API.
pub const FETCH_THREADS_FAILED: &str = "Failed to fetch data";

/// Threads state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadsState {
    /// Most recent first after local creation; server order otherwise
    pub threads: Vec<Thread>,
    pub thread_detail: Option<ThreadDetail>,
    pub loading: bool,
    pub error: Option<String>,
    /// Empty string means no filter
    pub filtered_category: String,
}

/// Threads transitions.
#[derive(Debug, Clone)]
pub enum ThreadsAction {
    FetchThreadsPending,
    FetchThreadsFulfilled(Vec<Thread>),
    FetchThreadsRejected(String),
    FetchDetailPending,
    FetchDetailFulfilled(ThreadDetail),
    FetchDetailRejected(String),
    CreateThreadFulfilled(Thread),
    SetFilteredCategory(String),
    ClearThreadDetail,
    VoteThread {
        thread_id: String,
        user_id: String,
        direction: VoteDirection,
    },
    VoteComment {
        comment_id: String,
        user_id: String,
        direction: VoteDirection,
    },
}

impl Reducer for ThreadsState {
    type Action = ThreadsAction;

    fn reduce(&mut self, action: ThreadsAction) {
        match action {
            ThreadsAction::FetchThreadsPending | ThreadsAction::FetchDetailPending => {
                self.loading = true;
                self.error = None;
            }
            ThreadsAction::FetchThreadsFulfilled(threads) => {
                self.loading = false;
                self.threads = threads;
            }
            ThreadsAction::FetchDetailFulfilled(detail) => {
                self.loading = false;
                self.thread_detail = Some(detail);
            }
            ThreadsAction::FetchThreadsRejected(message)
            | ThreadsAction::FetchDetailRejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            ThreadsAction::CreateThreadFulfilled(thread) => {
                self.threads.insert(0, thread);
            }
            ThreadsAction::SetFilteredCategory(category) => {
                self.filtered_category = category;
            }
            ThreadsAction::ClearThreadDetail => {
                self.thread_detail = None;
            }
            ThreadsAction::VoteThread {
                thread_id,
                user_id,
                direction,
            } => {
                self.vote_thread(&thread_id, &user_id, direction);
            }
            ThreadsAction::VoteComment {
                comment_id,
                user_id,
                direction,
            } => {
                self.vote_comment(&comment_id, &user_id, direction);
            }
        }
    }
}

impl ThreadsState {
    /// Toggle a thread vote in the list and in the open detail.
    ///
    /// Returns the user's resulting vote, or `None` if the thread is cached
    /// in neither place.
    pub fn vote_thread(
        &mut self,
        thread_id: &str,
        user_id: &str,
        direction: VoteDirection,
    ) -> Option<VoteType> {
        let mut outcome = None;

        if let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) {
            outcome = Some(thread.votes.toggle(user_id, direction));
        }

        if let Some(detail) = self.thread_detail.as_mut().filter(|d| d.id == thread_id) {
            let detail_outcome = detail.votes.toggle(user_id, direction);
            // The detail copy is the fresher one when both exist.
            outcome = Some(detail_outcome);
        }

        outcome
    }

    /// Toggle a comment vote in the open detail.
    pub fn vote_comment(
        &mut self,
        comment_id: &str,
        user_id: &str,
        direction: VoteDirection,
    ) -> Option<VoteType> {
        self.thread_detail
            .as_mut()?
            .comment_mut(comment_id)
            .map(|comment| comment.votes.toggle(user_id, direction))
    }

    /// Distinct categories in first-seen order, empty category excluded.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for thread in &self.threads {
            if !thread.category.is_empty() && !seen.contains(&thread.category) {
                seen.push(thread.category.clone());
            }
        }
        seen
    }

    /// Threads matching the active category filter.
    pub fn filtered_threads(&self) -> Vec<&Thread> {
        self.threads
            .iter()
            .filter(|t| self.filtered_category.is_empty() || t.category == self.filtered_category)
            .collect()
    }

    /// Whether `thread_id` is in the cached thread list.
    pub fn is_listed(&self, thread_id: &str) -> bool {
        self.threads.iter().any(|t| t.id == thread_id)
    }

    /// Whether `thread_id` is the open detail.
    pub fn is_detail_open(&self, thread_id: &str) -> bool {
        self.thread_detail
            .as_ref()
            .is_some_and(|detail| detail.id == thread_id)
    }
}

/// Attach each thread's owner from `users` by `owner_id`.
///
/// Threads whose owner is missing from `users` get `owner: None`.
pub fn denormalize_threads(threads: Vec<Thread>, users: &[User]) -> Vec<Thread> {
    let by_id: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();

    threads
        .into_iter()
        .map(|mut thread| {
            thread.owner = by_id.get(thread.owner_id.as_str()).map(|u| (*u).clone());
            thread
        })
        .collect()
}

/// Threads state store.
pub struct ThreadsStore {
    api: ForumClient,
    core: StoreCore<ThreadsState>,
}

impl ThreadsStore {
    pub fn new(api: ForumClient) -> Self {
        Self {
            api,
            core: StoreCore::new(ThreadsState::default()),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ThreadsState {
        self.core.snapshot()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ThreadsState> {
        self.core.subscribe()
    }

    /// Fetch threads and users concurrently and attach owners.
    ///
    /// Both calls form one operation. If the API rejects either one, the
    /// fixed [`FETCH_THREADS_FAILED`] message is reported; a transport
    /// failure reports its own message.
    pub async fn fetch_threads(&self) -> Result<(), AppError> {
        let request = self.core.requests().begin(THREADS_SLOT);
        self.core.dispatch(ThreadsAction::FetchThreadsPending);

        let (threads, users) = tokio::join!(self.api.get_all_threads(), self.api.get_all_users());

        let (threads, users) = match (threads, users) {
            (Ok(threads), Ok(users)) => (threads, users),
            (threads, users) => {
                let transport = [threads.err(), users.err()]
                    .into_iter()
                    .flatten()
                    .find(|e| !e.is_structural());
                let err = transport.unwrap_or_else(|| AppError::Api(FETCH_THREADS_FAILED.to_string()));

                tracing::warn!(error = %err, "Failed to fetch threads");
                self.core
                    .dispatch_if_current(request, ThreadsAction::FetchThreadsRejected(err.message()));
                return Err(err);
            }
        };

        let count = threads.len();
        let threads = denormalize_threads(threads, &users);
        if self
            .core
            .dispatch_if_current(request, ThreadsAction::FetchThreadsFulfilled(threads))
        {
            tracing::debug!(count, "Threads loaded");
        }
        Ok(())
    }

    /// Fetch one thread with comments, replacing the open detail.
    pub async fn fetch_thread_detail(&self, thread_id: &str) -> Result<(), AppError> {
        let request = self.core.requests().begin(DETAIL_SLOT);
        self.core.dispatch(ThreadsAction::FetchDetailPending);

        match self.api.get_thread_detail(thread_id).await {
            Ok(detail) => {
                self.core
                    .dispatch_if_current(request, ThreadsAction::FetchDetailFulfilled(detail));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "Failed to fetch thread detail");
                self.core
                    .dispatch_if_current(request, ThreadsAction::FetchDetailRejected(e.message()));
                Err(e)
            }
        }
    }

    /// Create a thread and put it at the front of the list.
    pub async fn create_thread(&self, new_thread: &NewThread) -> Result<Thread, AppError> {
        let thread = self.api.create_thread(new_thread).await?;
        tracing::info!(thread_id = %thread.id, "Thread created");
        self.core
            .dispatch(ThreadsAction::CreateThreadFulfilled(thread.clone()));
        Ok(thread)
    }

    /// Post a comment. The open detail is left as is; re-fetch it to see
    /// the new comment.
    pub async fn create_comment(&self, thread_id: &str, content: &str) -> Result<Comment, AppError> {
        let comment = self.api.create_comment(thread_id, content).await?;
        tracing::info!(thread_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    /// Optimistically toggle an up vote on a thread.
    pub fn up_vote_thread(&self, thread_id: &str, user_id: &str) -> Option<VoteType> {
        self.vote_thread(thread_id, user_id, VoteDirection::Up)
    }

    /// Optimistically toggle a down vote on a thread.
    pub fn down_vote_thread(&self, thread_id: &str, user_id: &str) -> Option<VoteType> {
        self.vote_thread(thread_id, user_id, VoteDirection::Down)
    }

    /// Optimistically toggle an up vote on a comment of the open detail.
    pub fn up_vote_comment(&self, comment_id: &str, user_id: &str) -> Option<VoteType> {
        self.vote_comment(comment_id, user_id, VoteDirection::Up)
    }

    /// Optimistically toggle a down vote on a comment of the open detail.
    pub fn down_vote_comment(&self, comment_id: &str, user_id: &str) -> Option<VoteType> {
        self.vote_comment(comment_id, user_id, VoteDirection::Down)
    }

    pub fn vote_thread(
        &self,
        thread_id: &str,
        user_id: &str,
        direction: VoteDirection,
    ) -> Option<VoteType> {
        self.core
            .update(|state| state.vote_thread(thread_id, user_id, direction))
    }

    pub fn vote_comment(
        &self,
        comment_id: &str,
        user_id: &str,
        direction: VoteDirection,
    ) -> Option<VoteType> {
        self.core
            .update(|state| state.vote_comment(comment_id, user_id, direction))
    }

    /// Set the category filter. Empty string shows all threads.
    pub fn set_filtered_category(&self, category: impl Into<String>) {
        self.core
            .dispatch(ThreadsAction::SetFilteredCategory(category.into()));
    }

    /// Close the detail view and drop any detail fetch still in flight.
    pub fn clear_thread_detail(&self) {
        let cancelled = self.core.requests().cancel(DETAIL_SLOT);
        let list_in_flight = self.core.requests().in_flight(THREADS_SLOT);

        self.core.update(|state| {
            state.reduce(ThreadsAction::ClearThreadDetail);
            if cancelled && !list_in_flight {
                state.loading = false;
            }
        });
    }
}
