// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Forum client: session, thread, and leaderboard state for a discussion
//! forum REST API.
//!
//! This crate keeps a thin cache of API responses with optimistic vote
//! updates. All persistence and business rules live in the remote API.

pub mod actions;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;

use config::Config;
use error::AppError;
use services::ForumClient;
use storage::TokenStorage;
use store::{AuthStore, LeaderboardStore, ThreadsStore};

/// Shared client state: one API client and the three stores built on it.
pub struct Forum {
    pub config: Config,
    pub api: ForumClient,
    pub auth: AuthStore,
    pub threads: ThreadsStore,
    pub leaderboards: LeaderboardStore,
}

impl Forum {
    /// Build a client persisting its token to `config.token_file`.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let tokens = TokenStorage::new(config.token_file.clone());
        Self::with_storage(config, tokens)
    }

    /// Build a client on an explicit token storage (e.g. `TokenStorage::new_mock()`).
    pub fn with_storage(config: Config, tokens: TokenStorage) -> Result<Self, AppError> {
        let api = ForumClient::new(&config, tokens)?;
        Ok(Self {
            auth: AuthStore::new(api.clone()),
            threads: ThreadsStore::new(api.clone()),
            leaderboards: LeaderboardStore::new(api.clone()),
            api,
            config,
        })
    }
}
