// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-key durable storage for the bearer token.
//!
//! The token is the only piece of session state that survives a restart.
//! A missing file means an anonymous session.

use crate::error::Result;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Durable token storage.
///
/// Cloning shares the same backing file (or in-memory slot), so the API
/// client and the auth store always see the same token.
#[derive(Clone)]
pub struct TokenStorage {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    File(Arc<PathBuf>),
    Memory(Arc<Mutex<Option<String>>>),
}

impl TokenStorage {
    /// File-backed storage at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(Arc::new(path.into())),
        }
    }

    /// In-memory storage for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(None))),
        }
    }

    /// In-memory storage pre-seeded with a token.
    pub fn new_mock_with_token(token: impl Into<String>) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(Some(token.into())))),
        }
    }

    /// Read the stored token.
    ///
    /// Unreadable storage is treated as an anonymous session.
    pub fn load(&self) -> Option<String> {
        match &self.backend {
            Backend::Memory(slot) => slot.lock().clone(),
            Backend::File(path) => match std::fs::read_to_string(path.as_ref()) {
                Ok(contents) => {
                    let token = contents.trim();
                    (!token.is_empty()).then(|| token.to_string())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "Failed to read token file, treating session as anonymous"
                    );
                    None
                }
            },
        }
    }

    /// Persist `token`, replacing any previous one.
    pub fn save(&self, token: &str) -> Result<()> {
        match &self.backend {
            Backend::Memory(slot) => {
                *slot.lock() = Some(token.to_string());
                Ok(())
            }
            Backend::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                write_private(path, token)?;
                tracing::debug!(path = %path.display(), "Token saved");
                Ok(())
            }
        }
    }

    /// Remove the stored token. Clearing an empty storage is not an error.
    pub fn clear(&self) -> Result<()> {
        match &self.backend {
            Backend::Memory(slot) => {
                *slot.lock() = None;
                Ok(())
            }
            Backend::File(path) => match std::fs::remove_file(path.as_ref()) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(token.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    std::fs::write(path, token)
}
