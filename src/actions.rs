// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Multi-step flows that span the API and several stores.
//!
//! Votes are applied to the stores first, then sent to the API. A failed
//! call is reconciled by re-fetching authoritative state; the local toggle
//! is never undone directly.

use crate::error::AppError;
use crate::models::{Comment, NewUser, User, VoteDirection, VoteType};
use crate::Forum;

impl Forum {
    /// Load the profile for a token restored from storage.
    ///
    /// Returns `None` for anonymous sessions and for tokens the API
    /// rejects (the session is dropped in that case).
    pub async fn bootstrap(&self) -> Option<User> {
        if !self.auth.state().is_authenticated() {
            return None;
        }
        match self.auth.fetch_own_profile().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::info!(error = %e, "Stored session is no longer valid");
                None
            }
        }
    }

    /// Log in, then load the profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        self.auth.login(email, password).await?;
        self.auth.fetch_own_profile().await
    }

    /// Register a new account, then log in with it.
    pub async fn register_and_login(&self, new_user: &NewUser) -> Result<User, AppError> {
        self.auth.register(new_user).await?;
        self.login(&new_user.email, &new_user.password).await
    }

    /// Id of the logged-in user, required for any vote.
    pub fn current_user_id(&self) -> Result<String, AppError> {
        let session = self.auth.state();
        if !session.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        session.user.map(|u| u.id).ok_or(AppError::Unauthorized)
    }

    /// Toggle a thread vote locally and mirror the result to the API.
    ///
    /// Returns the vote that was sent. On failure the thread is re-fetched
    /// and the API error is returned.
    pub async fn vote_thread(
        &self,
        thread_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteType, AppError> {
        let user_id = self.current_user_id()?;

        let vote = self
            .threads
            .vote_thread(thread_id, &user_id, direction)
            .unwrap_or_else(|| direction.into());

        if let Err(e) = self.api.vote_thread(thread_id, vote).await {
            tracing::warn!(thread_id, error = %e, "Thread vote failed, re-fetching");
            self.reconcile_thread(thread_id).await;
            return Err(e);
        }
        Ok(vote)
    }

    /// Withdraw a thread vote, then re-fetch authoritative state.
    pub async fn neutralize_thread_vote(&self, thread_id: &str) -> Result<(), AppError> {
        self.current_user_id()?;
        self.api.vote_thread(thread_id, VoteType::Neutral).await?;
        self.reconcile_thread(thread_id).await;
        Ok(())
    }

    /// Toggle a comment vote locally and mirror the result to the API.
    pub async fn vote_comment(
        &self,
        thread_id: &str,
        comment_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteType, AppError> {
        let user_id = self.current_user_id()?;

        let vote = self
            .threads
            .vote_comment(comment_id, &user_id, direction)
            .unwrap_or_else(|| direction.into());

        if let Err(e) = self.api.vote_comment(thread_id, comment_id, vote).await {
            tracing::warn!(thread_id, comment_id, error = %e, "Comment vote failed, re-fetching");
            self.refetch_detail(thread_id).await;
            return Err(e);
        }
        Ok(vote)
    }

    /// Withdraw a comment vote, then re-fetch the thread detail.
    pub async fn neutralize_comment_vote(
        &self,
        thread_id: &str,
        comment_id: &str,
    ) -> Result<(), AppError> {
        self.current_user_id()?;
        self.api
            .vote_comment(thread_id, comment_id, VoteType::Neutral)
            .await?;
        self.refetch_detail(thread_id).await;
        Ok(())
    }

    /// Post a comment, then re-fetch the thread detail so it shows up.
    pub async fn post_comment(&self, thread_id: &str, content: &str) -> Result<Comment, AppError> {
        let comment = self.threads.create_comment(thread_id, content).await?;
        self.refetch_detail(thread_id).await;
        Ok(comment)
    }

    /// Re-fetch every cached copy of `thread_id`.
    ///
    /// The thread list is re-fetched when it holds the thread or when the
    /// detail is not open, so both copies end up matching the server.
    async fn reconcile_thread(&self, thread_id: &str) {
        let state = self.threads.state();
        let detail_open = state.is_detail_open(thread_id);
        let listed = state.is_listed(thread_id);

        if detail_open && listed {
            let (list, ()) = tokio::join!(
                self.threads.fetch_threads(),
                self.refetch_detail(thread_id)
            );
            if let Err(e) = list {
                tracing::warn!(error = %e, "Re-fetching threads failed");
            }
        } else if detail_open {
            self.refetch_detail(thread_id).await;
        } else if let Err(e) = self.threads.fetch_threads().await {
            tracing::warn!(error = %e, "Re-fetching threads failed");
        }
    }

    async fn refetch_detail(&self, thread_id: &str) {
        if let Err(e) = self.threads.fetch_thread_detail(thread_id).await {
            tracing::warn!(thread_id, error = %e, "Re-fetching thread detail failed");
        }
    }
}
