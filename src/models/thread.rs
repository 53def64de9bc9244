//! Thread, thread detail, and comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{User, Votes};

/// Thread as listed by `GET /threads`.
///
/// `owner` is not part of the API payload; it is attached locally from the
/// user list (see [`crate::store::threads::denormalize_threads`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default)]
    pub total_comments: u32,
    #[serde(flatten)]
    pub votes: Votes,
}

/// Full thread with comments, as returned by `GET /threads/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetail {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(flatten)]
    pub votes: Votes,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl ThreadDetail {
    /// Find a comment by id.
    pub fn comment_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }
}

/// Comment on a thread. Only ever cached inside a [`ThreadDetail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(flatten)]
    pub votes: Votes,
}

/// Payload for `POST /threads`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewThread {
    pub title: String,
    pub body: String,
    /// Empty string when uncategorized
    pub category: String,
}
