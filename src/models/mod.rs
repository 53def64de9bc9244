// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the forum API.

pub mod leaderboard;
pub mod thread;
pub mod user;
pub mod vote;

pub use leaderboard::LeaderboardEntry;
pub use thread::{Comment, NewThread, Thread, ThreadDetail};
pub use user::{NewUser, User};
pub use vote::{VoteDirection, VoteType, Votes};
