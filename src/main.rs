// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Forum command-line client
//!
//! Logs in, browses threads and leaderboards, posts, and votes against the
//! forum REST API. The session token is kept in a file between runs.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use forum_client::{
    config::Config,
    models::{NewThread, NewUser, Thread, ThreadDetail, VoteDirection, VoteType},
    Forum,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forum", version, about = "Discussion forum client")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token.
    Login { email: String, password: String },
    /// Create an account and log in with it.
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Forget the stored session token.
    Logout,
    /// Show the logged-in user.
    Me,
    /// List threads, newest first.
    Threads {
        /// Only show threads in this category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a thread with its comments.
    Show { thread_id: String },
    /// Start a new thread.
    Post {
        title: String,
        body: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Comment on a thread.
    Comment { thread_id: String, content: String },
    /// Vote on a thread, or on one of its comments.
    Vote {
        thread_id: String,
        #[arg(value_enum)]
        vote: VoteArg,
        /// Vote on this comment instead of the thread.
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show the leaderboard.
    Leaderboard,
}

#[derive(Clone, Copy, ValueEnum)]
enum VoteArg {
    Up,
    Down,
    Neutral,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, "Starting forum client");

    let forum = Forum::new(config).context("Failed to initialize forum client")?;
    forum.bootstrap().await;

    run(&forum, cli.command).await
}

async fn run(forum: &Forum, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = forum.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email.unwrap_or_default());
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let new_user = NewUser {
                name,
                email,
                password,
            };
            let user = forum.register_and_login(&new_user).await?;
            println!("Registered and logged in as {}", user.name);
        }
        Command::Logout => {
            forum.auth.logout()?;
            println!("Logged out");
        }
        Command::Me => match forum.auth.state().user {
            Some(user) => println!("{} <{}> ({})", user.name, user.email.unwrap_or_default(), user.id),
            None => println!("Not logged in"),
        },
        Command::Threads { category } => {
            forum.threads.fetch_threads().await?;
            forum
                .threads
                .set_filtered_category(category.unwrap_or_default());
            let state = forum.threads.state();
            if !state.categories().is_empty() {
                println!("Categories: {}", state.categories().join(", "));
            }
            for thread in state.filtered_threads() {
                print_thread_line(thread);
            }
        }
        Command::Show { thread_id } => {
            forum.threads.fetch_thread_detail(&thread_id).await?;
            if let Some(detail) = forum.threads.state().thread_detail {
                print_detail(&detail);
                if let Some(user) = forum.auth.state().user {
                    let vote = match detail.votes.vote_of(&user.id) {
                        VoteType::Up => "up",
                        VoteType::Down => "down",
                        VoteType::Neutral => "none",
                    };
                    println!();
                    println!("Your vote: {vote}");
                }
            }
        }
        Command::Post {
            title,
            body,
            category,
        } => {
            let thread = forum
                .threads
                .create_thread(&NewThread {
                    title,
                    body,
                    category,
                })
                .await?;
            println!("Created thread {}", thread.id);
        }
        Command::Comment { thread_id, content } => {
            let comment = forum.post_comment(&thread_id, &content).await?;
            println!("Created comment {}", comment.id);
        }
        Command::Vote {
            thread_id,
            vote,
            comment,
        } => {
            // Load the thread so the toggle sees the current votes.
            forum.threads.fetch_thread_detail(&thread_id).await?;
            let direction = match vote {
                VoteArg::Up => Some(VoteDirection::Up),
                VoteArg::Down => Some(VoteDirection::Down),
                VoteArg::Neutral => None,
            };
            match (comment, direction) {
                (Some(comment_id), Some(direction)) => {
                    let sent = forum.vote_comment(&thread_id, &comment_id, direction).await?;
                    println!("Comment vote: {}", sent.path_segment());
                }
                (Some(comment_id), None) => {
                    forum.neutralize_comment_vote(&thread_id, &comment_id).await?;
                    println!("Comment vote withdrawn");
                }
                (None, Some(direction)) => {
                    let sent = forum.vote_thread(&thread_id, direction).await?;
                    println!("Thread vote: {}", sent.path_segment());
                }
                (None, None) => {
                    forum.neutralize_thread_vote(&thread_id).await?;
                    println!("Thread vote withdrawn");
                }
            }
        }
        Command::Leaderboard => {
            forum.leaderboards.fetch_leaderboards().await?;
            for (rank, entry) in forum.leaderboards.state().leaderboards.iter().enumerate() {
                println!("{:>3}. {:<30} {:>5}", rank + 1, entry.user.name, entry.score);
            }
        }
    }
    Ok(())
}

fn print_thread_line(thread: &Thread) {
    let owner = thread.owner.as_ref().map_or("unknown", |u| u.name.as_str());
    println!(
        "{}  [{}] {} by {} ({} comments, {:+}, {})",
        thread.id,
        thread.category,
        thread.title,
        owner,
        thread.total_comments,
        thread.votes.score(),
        ago(thread.created_at),
    );
}

fn print_detail(detail: &ThreadDetail) {
    let owner = detail.owner.as_ref().map_or("unknown", |u| u.name.as_str());
    println!("{} [{}]", detail.title, detail.category);
    println!("by {} {} ({:+})", owner, ago(detail.created_at), detail.votes.score());
    println!();
    println!("{}", detail.body);
    println!();
    for comment in &detail.comments {
        let author = comment.owner.as_ref().map_or("unknown", |u| u.name.as_str());
        println!(
            "  {} {} {} ({:+}): {}",
            comment.id,
            author,
            ago(comment.created_at),
            comment.votes.score(),
            comment.content
        );
    }
}

fn ago(at: chrono::DateTime<Utc>) -> String {
    let delta = Utc::now().signed_duration_since(at);
    if delta.num_days() > 0 {
        format!("{} days ago", delta.num_days())
    } else if delta.num_hours() > 0 {
        format!("{} hours ago", delta.num_hours())
    } else {
        format!("{} minutes ago", delta.num_minutes().max(0))
    }
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "forum_client=info";

/// Initialize logging to stderr.
fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
    Ok(())
}
