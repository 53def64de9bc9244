// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the forum REST API.
//!
//! Serves the same envelopes as the real API from seeded in-memory data.
//! Individual endpoints can be switched to answer with a failure envelope
//! or with an undecodable body, and any path can be delayed.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use forum_client::config::Config;
use forum_client::storage::TokenStorage;
use forum_client::Forum;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const JOHN_EMAIL: &str = "john@example.com";
pub const JOHN_PASSWORD: &str = "secret123";
pub const JOHN_ID: &str = "user-1";

/// Canned misbehavior for one endpoint.
#[derive(Clone)]
#[allow(dead_code)]
pub enum Fault {
    /// `{"status":"fail","message":...}`
    Fail(String),
    /// A body that is not JSON at all.
    Garbage,
}

#[derive(Default)]
struct Inner {
    users: Vec<Value>,
    passwords: HashMap<String, (String, String)>,
    tokens: HashMap<String, String>,
    threads: Vec<Value>,
    details: HashMap<String, Value>,
    leaderboards: Vec<Value>,
    faults: HashMap<&'static str, Fault>,
    delays: HashMap<String, Duration>,
    requests: Vec<RecordedRequest>,
    next_id: u32,
}

/// One request as seen by the mock.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

/// Mock forum API. Clones share state.
#[derive(Clone, Default)]
pub struct MockForum {
    inner: Arc<Mutex<Inner>>,
}

#[allow(dead_code)]
impl MockForum {
    /// Two users, two threads (one owned by a user the API does not list),
    /// one thread detail with a comment, and a leaderboard.
    pub fn seeded() -> Self {
        let mock = Self::default();
        {
            let mut inner = mock.inner.lock();
            inner.users = vec![
                json!({"id": JOHN_ID, "name": "John Doe", "email": JOHN_EMAIL, "avatar": "https://example.com/john.png"}),
                json!({"id": "user-2", "name": "Jane Roe", "email": "jane@example.com", "avatar": "https://example.com/jane.png"}),
            ];
            inner.passwords.insert(
                JOHN_EMAIL.to_string(),
                (JOHN_PASSWORD.to_string(), JOHN_ID.to_string()),
            );
            inner.threads = vec![
                json!({
                    "id": "thread-1",
                    "title": "Thread Pertama",
                    "body": "Ini adalah thread pertama",
                    "category": "General",
                    "createdAt": "2021-06-21T07:00:00.000Z",
                    "ownerId": JOHN_ID,
                    "totalComments": 1,
                    "upVotesBy": [],
                    "downVotesBy": ["user-2"]
                }),
                json!({
                    "id": "thread-2",
                    "title": "Thread Kedua",
                    "body": "Ini adalah thread kedua",
                    "category": "redux",
                    "createdAt": "2021-06-21T07:00:00.000Z",
                    "ownerId": "user-ghost",
                    "totalComments": 0,
                    "upVotesBy": [],
                    "downVotesBy": []
                }),
            ];
            inner.details.insert(
                "thread-1".to_string(),
                json!({
                    "id": "thread-1",
                    "title": "Thread Pertama",
                    "body": "Ini adalah thread pertama",
                    "category": "General",
                    "createdAt": "2021-06-21T07:00:00.000Z",
                    "owner": {"id": JOHN_ID, "name": "John Doe", "avatar": "https://example.com/john.png"},
                    "upVotesBy": [],
                    "downVotesBy": ["user-2"],
                    "comments": [{
                        "id": "comment-1",
                        "content": "Ini adalah komentar pertama",
                        "createdAt": "2021-06-21T07:00:00.000Z",
                        "owner": {"id": "user-2", "name": "Jane Roe", "avatar": "https://example.com/jane.png"},
                        "upVotesBy": [],
                        "downVotesBy": []
                    }]
                }),
            );
            inner.details.insert(
                "thread-2".to_string(),
                json!({
                    "id": "thread-2",
                    "title": "Thread Kedua",
                    "body": "Ini adalah thread kedua",
                    "category": "redux",
                    "createdAt": "2021-06-21T07:00:00.000Z",
                    "owner": null,
                    "upVotesBy": [],
                    "downVotesBy": [],
                    "comments": []
                }),
            );
            inner.leaderboards = vec![
                json!({"user": {"id": JOHN_ID, "name": "John Doe", "email": JOHN_EMAIL, "avatar": "https://example.com/john.png"}, "score": 25}),
                json!({"user": {"id": "user-2", "name": "Jane Roe", "email": "jane@example.com", "avatar": "https://example.com/jane.png"}, "score": 10}),
            ];
        }
        mock
    }

    pub fn set_fault(&self, endpoint: &'static str, fault: Fault) {
        self.inner.lock().faults.insert(endpoint, fault);
    }

    pub fn clear_fault(&self, endpoint: &'static str) {
        self.inner.lock().faults.remove(endpoint);
    }

    /// Delay every response for `path`.
    pub fn delay_path(&self, path: &str, delay: Duration) {
        self.inner.lock().delays.insert(path.to_string(), delay);
    }

    /// Invalidate every issued token (as if they expired).
    pub fn revoke_tokens(&self) {
        self.inner.lock().tokens.clear();
    }

    /// Register `token` as valid for `user_id`.
    pub fn issue_token(&self, token: &str, user_id: &str) {
        self.inner
            .lock()
            .tokens
            .insert(token.to_string(), user_id.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    /// Number of requests matching `method` and `path`.
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Server-side votes of a thread detail.
    pub fn detail_votes(&self, thread_id: &str) -> (Vec<String>, Vec<String>) {
        let inner = self.inner.lock();
        let detail = &inner.details[thread_id];
        (ids(&detail["upVotesBy"]), ids(&detail["downVotesBy"]))
    }

    fn fault(&self, endpoint: &'static str) -> Option<Response> {
        let fault = self.inner.lock().faults.get(endpoint).cloned()?;
        Some(match fault {
            Fault::Fail(message) => fail(StatusCode::BAD_REQUEST, &message),
            Fault::Garbage => (StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>").into_response(),
        })
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<Value> {
        let token = bearer(headers)?;
        let inner = self.inner.lock();
        let user_id = inner.tokens.get(&token)?;
        inner.users.iter().find(|u| u["id"] == *user_id).cloned()
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        format!("{prefix}-new-{}", inner.next_id)
    }
}

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(String::from)
}

fn success(data: Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({"status": "success", "message": "ok", "data": data})),
    )
        .into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "fail", "message": message}))).into_response()
}

fn unauthorized() -> Response {
    fail(StatusCode::UNAUTHORIZED, "Missing authentication")
}

/// Apply a vote to an object with `upVotesBy`/`downVotesBy`.
fn apply_vote(target: &mut Value, user_id: &str, vote: &str) {
    for key in ["upVotesBy", "downVotesBy"] {
        if let Some(list) = target[key].as_array_mut() {
            list.retain(|v| v.as_str() != Some(user_id));
        }
    }
    let key = match vote {
        "up-vote" => "upVotesBy",
        "down-vote" => "downVotesBy",
        _ => return,
    };
    if let Some(list) = target[key].as_array_mut() {
        list.push(json!(user_id));
    }
}

async fn record(State(mock): State<MockForum>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        bearer: bearer(request.headers()),
    };
    let delay = {
        let mut inner = mock.inner.lock();
        let delay = inner.delays.get(&recorded.path).copied();
        inner.requests.push(recorded);
        delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    next.run(request).await
}

async fn register(State(mock): State<MockForum>, Json(body): Json<Value>) -> Response {
    if let Some(r) = mock.fault("register") {
        return r;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let name = body["name"].as_str().unwrap_or_default().to_string();

    if mock.inner.lock().passwords.contains_key(&email) {
        return fail(StatusCode::BAD_REQUEST, "email is already taken");
    }

    let id = mock.next_id("user");
    let user = json!({"id": id, "name": name, "email": email, "avatar": "https://example.com/new.png"});
    let mut inner = mock.inner.lock();
    inner.users.push(user.clone());
    inner.passwords.insert(email, (password, id));
    success(json!({ "user": user }))
}

async fn login(State(mock): State<MockForum>, Json(body): Json<Value>) -> Response {
    if let Some(r) = mock.fault("login") {
        return r;
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut inner = mock.inner.lock();
    match inner.passwords.get(email).cloned() {
        Some((expected, user_id)) if expected == password => {
            let token = format!("token-{user_id}");
            inner.tokens.insert(token.clone(), user_id);
            success(json!({ "token": token }))
        }
        _ => fail(StatusCode::UNAUTHORIZED, "email or password is wrong"),
    }
}

async fn own_profile(State(mock): State<MockForum>, headers: HeaderMap) -> Response {
    if let Some(r) = mock.fault("me") {
        return r;
    }
    match mock.user_for(&headers) {
        Some(user) => success(json!({ "user": user })),
        None => fail(StatusCode::UNAUTHORIZED, "token tidak valid"),
    }
}

async fn all_users(State(mock): State<MockForum>) -> Response {
    if let Some(r) = mock.fault("users") {
        return r;
    }
    let users = mock.inner.lock().users.clone();
    success(json!({ "users": users }))
}

async fn all_threads(State(mock): State<MockForum>) -> Response {
    if let Some(r) = mock.fault("threads") {
        return r;
    }
    let threads = mock.inner.lock().threads.clone();
    success(json!({ "threads": threads }))
}

async fn thread_detail(State(mock): State<MockForum>, Path(id): Path<String>) -> Response {
    if let Some(r) = mock.fault("detail") {
        return r;
    }
    match mock.inner.lock().details.get(&id).cloned() {
        Some(detail) => success(json!({ "detailThread": detail })),
        None => fail(StatusCode::NOT_FOUND, "thread tidak ditemukan"),
    }
}

async fn create_thread(
    State(mock): State<MockForum>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(r) = mock.fault("create_thread") {
        return r;
    }
    let Some(user) = mock.user_for(&headers) else {
        return unauthorized();
    };
    let id = mock.next_id("thread");
    let thread = json!({
        "id": id,
        "title": body["title"],
        "body": body["body"],
        "category": body["category"],
        "createdAt": "2024-01-01T00:00:00.000Z",
        "ownerId": user["id"],
        "totalComments": 0,
        "upVotesBy": [],
        "downVotesBy": []
    });
    mock.inner.lock().threads.insert(0, thread.clone());
    success(json!({ "thread": thread }))
}

async fn create_comment(
    State(mock): State<MockForum>,
    headers: HeaderMap,
    Path(thread_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(r) = mock.fault("comment") {
        return r;
    }
    let Some(user) = mock.user_for(&headers) else {
        return unauthorized();
    };
    let id = mock.next_id("comment");
    let comment = json!({
        "id": id,
        "content": body["content"],
        "createdAt": "2024-01-01T00:00:00.000Z",
        "owner": {"id": user["id"], "name": user["name"], "avatar": user["avatar"]},
        "upVotesBy": [],
        "downVotesBy": []
    });
    let mut inner = mock.inner.lock();
    match inner.details.get_mut(&thread_id) {
        Some(detail) => {
            if let Some(comments) = detail["comments"].as_array_mut() {
                comments.push(comment.clone());
            }
            success(json!({ "comment": comment }))
        }
        None => fail(StatusCode::NOT_FOUND, "thread tidak ditemukan"),
    }
}

async fn vote_thread(
    State(mock): State<MockForum>,
    headers: HeaderMap,
    Path((thread_id, vote)): Path<(String, String)>,
) -> Response {
    if let Some(r) = mock.fault("vote") {
        return r;
    }
    let Some(user) = mock.user_for(&headers) else {
        return unauthorized();
    };
    let user_id = user["id"].as_str().unwrap_or_default().to_string();

    let mut inner = mock.inner.lock();
    if let Some(thread) = inner.threads.iter_mut().find(|t| t["id"] == thread_id) {
        apply_vote(thread, &user_id, &vote);
    }
    match inner.details.get_mut(&thread_id) {
        Some(detail) => {
            apply_vote(detail, &user_id, &vote);
            success(json!({"vote": {"id": "vote-1", "userId": user_id, "threadId": thread_id}}))
        }
        None => fail(StatusCode::NOT_FOUND, "thread tidak ditemukan"),
    }
}

async fn vote_comment(
    State(mock): State<MockForum>,
    headers: HeaderMap,
    Path((thread_id, comment_id, vote)): Path<(String, String, String)>,
) -> Response {
    if let Some(r) = mock.fault("vote") {
        return r;
    }
    let Some(user) = mock.user_for(&headers) else {
        return unauthorized();
    };
    let user_id = user["id"].as_str().unwrap_or_default().to_string();

    let mut inner = mock.inner.lock();
    let comment = inner
        .details
        .get_mut(&thread_id)
        .and_then(|d| d["comments"].as_array_mut())
        .and_then(|comments| comments.iter_mut().find(|c| c["id"] == comment_id));
    match comment {
        Some(comment) => {
            apply_vote(comment, &user_id, &vote);
            success(json!({"vote": {"id": "vote-2", "userId": user_id, "commentId": comment_id}}))
        }
        None => fail(StatusCode::NOT_FOUND, "komentar tidak ditemukan"),
    }
}

async fn leaderboards(State(mock): State<MockForum>) -> Response {
    if let Some(r) = mock.fault("leaderboards") {
        return r;
    }
    let leaderboards = mock.inner.lock().leaderboards.clone();
    success(json!({ "leaderboards": leaderboards }))
}

fn router(mock: MockForum) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users/me", get(own_profile))
        .route("/users", get(all_users))
        .route("/threads", get(all_threads).post(create_thread))
        .route("/threads/{id}", get(thread_detail))
        .route("/threads/{id}/comments", post(create_comment))
        .route("/threads/{id}/{vote}", post(vote_thread))
        .route(
            "/threads/{id}/comments/{comment_id}/{vote}",
            post(vote_comment),
        )
        .route("/leaderboards", get(leaderboards))
        .layer(middleware::from_fn_with_state(mock.clone(), record))
        .with_state(mock)
}

/// Serve `mock` on an ephemeral local port and return its base URL.
pub async fn spawn(mock: MockForum) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock forum");
    let addr = listener.local_addr().expect("Mock forum has no address");
    tokio::spawn(async move {
        axum::serve(listener, router(mock))
            .await
            .expect("Mock forum crashed");
    });
    format!("http://{addr}")
}

/// Forum client against a fresh mock, with in-memory token storage.
#[allow(dead_code)]
pub async fn test_forum(mock: &MockForum) -> Forum {
    test_forum_with_storage(mock, TokenStorage::new_mock()).await
}

#[allow(dead_code)]
pub async fn test_forum_with_storage(mock: &MockForum, tokens: TokenStorage) -> Forum {
    let url = spawn(mock.clone()).await;
    let config = Config::test_default().with_api_url(url);
    Forum::with_storage(config, tokens).expect("Failed to build forum client")
}

/// Forum client pointed at a port nothing listens on.
#[allow(dead_code)]
pub fn unreachable_forum() -> Forum {
    Forum::with_storage(Config::test_default(), TokenStorage::new_mock())
        .expect("Failed to build forum client")
}

/// Log in as John and load his profile.
#[allow(dead_code)]
pub async fn logged_in(mock: &MockForum) -> Forum {
    let forum = test_forum(mock).await;
    forum
        .login(JOHN_EMAIL, JOHN_PASSWORD)
        .await
        .expect("Login should succeed");
    forum
}
