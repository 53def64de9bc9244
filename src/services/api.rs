// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Forum REST API client.
//!
//! Every endpoint answers with the same envelope:
//! - `{"status": "success", "data": {...}}`
//! - `{"status": "fail", "message": "..."}`
//!
//! The envelope is authoritative; the HTTP status code is not consulted.
//! A failure envelope becomes [`AppError::Api`]; anything that prevents
//! reading an envelope at all becomes [`AppError::Transport`].

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    Comment, LeaderboardEntry, NewThread, NewUser, Thread, ThreadDetail, User, VoteType,
};
use crate::storage::TokenStorage;
use anyhow::Context;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

const STATUS_SUCCESS: &str = "success";

/// Forum API client.
///
/// The bearer token is read from [`TokenStorage`] on every request, so a
/// login or logout takes effect on the next call without rebuilding the
/// client.
#[derive(Clone)]
pub struct ForumClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStorage,
}

impl ForumClient {
    /// Create a client for `config.api_url`.
    pub fn new(config: &Config, tokens: TokenStorage) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("failed building forum HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Token storage shared with the auth store.
    pub fn tokens(&self) -> &TokenStorage {
        &self.tokens
    }

    // ─── Auth ────────────────────────────────────────────────────────────

    /// `POST /register`. Returns the created user.
    pub async fn register(&self, new_user: &NewUser) -> Result<User, AppError> {
        let data: UserData = self.post_json("/register", new_user).await?;
        Ok(data.user)
    }

    /// `POST /login`. Returns the bearer token; storing it is up to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let body = LoginRequest { email, password };
        let data: TokenData = self.post_json("/login", &body).await?;
        Ok(data.token)
    }

    /// `GET /users/me`.
    pub async fn get_own_profile(&self) -> Result<User, AppError> {
        let data: UserData = self.get_json("/users/me").await?;
        Ok(data.user)
    }

    /// `GET /users`.
    pub async fn get_all_users(&self) -> Result<Vec<User>, AppError> {
        let data: UsersData = self.get_json("/users").await?;
        Ok(data.users)
    }

    // ─── Threads ─────────────────────────────────────────────────────────

    /// `GET /threads`. Threads come back without `owner`.
    pub async fn get_all_threads(&self) -> Result<Vec<Thread>, AppError> {
        let data: ThreadsData = self.get_json("/threads").await?;
        Ok(data.threads)
    }

    /// `GET /threads/:id`.
    pub async fn get_thread_detail(&self, thread_id: &str) -> Result<ThreadDetail, AppError> {
        let path = format!("/threads/{}", urlencoding::encode(thread_id));
        let data: DetailData = self.get_json(&path).await?;
        Ok(data.detail_thread)
    }

    /// `POST /threads`.
    pub async fn create_thread(&self, new_thread: &NewThread) -> Result<Thread, AppError> {
        let data: ThreadData = self.post_json("/threads", new_thread).await?;
        Ok(data.thread)
    }

    /// `POST /threads/:id/comments`.
    pub async fn create_comment(&self, thread_id: &str, content: &str) -> Result<Comment, AppError> {
        let path = format!("/threads/{}/comments", urlencoding::encode(thread_id));
        let data: CommentData = self
            .post_json(&path, &CommentRequest { content })
            .await?;
        Ok(data.comment)
    }

    // ─── Votes ───────────────────────────────────────────────────────────

    /// `POST /threads/:id/{up-vote,down-vote,neutral-vote}`.
    pub async fn vote_thread(&self, thread_id: &str, vote: VoteType) -> Result<(), AppError> {
        let path = format!(
            "/threads/{}/{}",
            urlencoding::encode(thread_id),
            vote.path_segment()
        );
        self.post_empty(&path).await
    }

    /// `POST /threads/:id/comments/:cid/{up-vote,down-vote,neutral-vote}`.
    pub async fn vote_comment(
        &self,
        thread_id: &str,
        comment_id: &str,
        vote: VoteType,
    ) -> Result<(), AppError> {
        let path = format!(
            "/threads/{}/comments/{}/{}",
            urlencoding::encode(thread_id),
            urlencoding::encode(comment_id),
            vote.path_segment()
        );
        self.post_empty(&path).await
    }

    // ─── Leaderboards ────────────────────────────────────────────────────

    /// `GET /leaderboards`.
    pub async fn get_leaderboards(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let data: LeaderboardsData = self.get_json("/leaderboards").await?;
        Ok(data.leaderboards)
    }

    // ─── Transport ───────────────────────────────────────────────────────

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match self.tokens.load() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Generic GET request returning the envelope's `data`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        read_envelope(path, response).await
    }

    /// Generic POST request with a JSON body returning the envelope's `data`.
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        read_envelope(path, response).await
    }

    /// POST without body whose success envelope carries nothing we need.
    async fn post_empty(&self, path: &str) -> Result<(), AppError> {
        let response = self.request(reqwest::Method::POST, path).send().await?;
        let envelope: Envelope<IgnoredAny> = decode_envelope(path, response).await?;
        envelope.into_result().map(|_| ())
    }
}

async fn read_envelope<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, AppError> {
    let envelope: Envelope<T> = decode_envelope(path, response).await?;
    envelope
        .into_result()?
        .ok_or_else(|| AppError::Transport(format!("Missing data in response from {path}")))
}

async fn decode_envelope<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<Envelope<T>, AppError> {
    let status = response.status();
    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(path, status = %status, error = %e, "Undecodable forum API response");
        AppError::Transport(format!("JSON parse error: {}", e))
    })
}

/// Uniform response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<Option<T>, AppError> {
        if self.status == STATUS_SUCCESS {
            Ok(self.data)
        } else {
            Err(AppError::Api(self.message.unwrap_or_else(|| {
                AppError::DEFAULT_API_MESSAGE.to_string()
            })))
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct UserData {
    user: User,
}

#[derive(Deserialize)]
struct UsersData {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct TokenData {
    token: String,
}

#[derive(Deserialize)]
struct ThreadsData {
    threads: Vec<Thread>,
}

#[derive(Deserialize)]
struct ThreadData {
    thread: Thread,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailData {
    detail_thread: ThreadDetail,
}

#[derive(Deserialize)]
struct CommentData {
    comment: Comment,
}

#[derive(Deserialize)]
struct LeaderboardsData {
    leaderboards: Vec<LeaderboardEntry>,
}
