// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vote sets and the toggle rule shared by threads and comments.
//!
//! Every optimistic vote, whether it lands on the thread list, the open
//! thread detail, or a comment, goes through [`Votes::toggle`] so the copies
//! cannot drift apart.

use serde::{Deserialize, Serialize};

/// Up/down voters of a thread or comment.
///
/// A user id appears at most once, in at most one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Votes {
    #[serde(default)]
    pub up_votes_by: Vec<String>,
    #[serde(default)]
    pub down_votes_by: Vec<String>,
}

/// Direction of an optimistic vote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

/// Vote state a user ends up in; one per API vote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Up,
    Down,
    Neutral,
}

impl VoteType {
    /// Final path segment of the matching vote endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            VoteType::Up => "up-vote",
            VoteType::Down => "down-vote",
            VoteType::Neutral => "neutral-vote",
        }
    }
}

impl From<VoteDirection> for VoteType {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => VoteType::Up,
            VoteDirection::Down => VoteType::Down,
        }
    }
}

impl Votes {
    /// Current vote of `user_id`.
    pub fn vote_of(&self, user_id: &str) -> VoteType {
        if self.up_votes_by.iter().any(|id| id == user_id) {
            VoteType::Up
        } else if self.down_votes_by.iter().any(|id| id == user_id) {
            VoteType::Down
        } else {
            VoteType::Neutral
        }
    }

    /// Toggle `user_id`'s vote in `direction`.
    ///
    /// A user already in the target list is withdrawn and nothing else
    /// changes. Otherwise the user is appended to the target list and removed
    /// from the opposite one. Returns the user's resulting vote.
    pub fn toggle(&mut self, user_id: &str, direction: VoteDirection) -> VoteType {
        let (target, opposite) = match direction {
            VoteDirection::Up => (&mut self.up_votes_by, &mut self.down_votes_by),
            VoteDirection::Down => (&mut self.down_votes_by, &mut self.up_votes_by),
        };

        if target.iter().any(|id| id == user_id) {
            target.retain(|id| id != user_id);
            return VoteType::Neutral;
        }

        opposite.retain(|id| id != user_id);
        target.push(user_id.to_string());
        direction.into()
    }

    /// Net score (up minus down).
    pub fn score(&self) -> i64 {
        self.up_votes_by.len() as i64 - self.down_votes_by.len() as i64
    }
}
