//! Leaderboard ranking rows.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// One ranked user with their activity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: User,
    pub score: i64,
}
