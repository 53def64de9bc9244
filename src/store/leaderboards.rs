//! Read-only leaderboard cache.

use crate::error::AppError;
use crate::models::LeaderboardEntry;
use crate::services::ForumClient;
use crate::store::{Reducer, StoreCore};
use tokio::sync::watch;

const LEADERBOARD_SLOT: &str = "leaderboards";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardState {
    pub leaderboards: Vec<LeaderboardEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LeaderboardAction {
    FetchPending,
    FetchFulfilled(Vec<LeaderboardEntry>),
    FetchRejected(String),
}

impl Reducer for LeaderboardState {
    type Action = LeaderboardAction;

    fn reduce(&mut self, action: LeaderboardAction) {
        match action {
            LeaderboardAction::FetchPending => {
                self.loading = true;
                self.error = None;
            }
            LeaderboardAction::FetchFulfilled(entries) => {
                self.loading = false;
                self.leaderboards = entries;
            }
            LeaderboardAction::FetchRejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
        }
    }
}

pub struct LeaderboardStore {
    api: ForumClient,
    core: StoreCore<LeaderboardState>,
}

impl LeaderboardStore {
    pub fn new(api: ForumClient) -> Self {
        Self {
            api,
            core: StoreCore::new(LeaderboardState::default()),
        }
    }

    pub fn state(&self) -> LeaderboardState {
        self.core.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LeaderboardState> {
        self.core.subscribe()
    }

    /// Replace the cached rankings with the API's current ones.
    pub async fn fetch_leaderboards(&self) -> Result<(), AppError> {
        let request = self.core.requests().begin(LEADERBOARD_SLOT);
        self.core.dispatch(LeaderboardAction::FetchPending);

        match self.api.get_leaderboards().await {
            Ok(entries) => {
                self.core
                    .dispatch_if_current(request, LeaderboardAction::FetchFulfilled(entries));
                Ok(())
            }
            Err(e) => {
                self.core
                    .dispatch_if_current(request, LeaderboardAction::FetchRejected(e.message()));
                Err(e)
            }
        }
    }
}
