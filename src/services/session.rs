// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted session: the current user and bearer token.
//!
//! Persistence goes through the [`Storage`] trait, which has browser
//! local-storage semantics (string keys, string values, synchronous).
//! `MemoryStorage` backs tests; `FileStorage` keeps one file per key.

use crate::error::AppError;
use crate::models::User;
use anyhow::Context;
use dashmap::DashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage key for the serialized user.
pub const USER_KEY: &str = "fitpulse-user";

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "fitpulse-token";

/// Key/value persistence backend.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove_item(&self, key: &str) -> Result<(), AppError>;
}

/// In-memory storage.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    items: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        self.items.remove(key);
        Ok(())
    }
}

/// File-backed storage: `<dir>/<key>` holds the value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::Validation(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("reading {}", path.display()))
                .into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        // Write-then-rename: readers never see a partial value.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("removing {}", path.display()))
                .into()),
        }
    }
}

/// The persisted half of the current session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Session kept in memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Read the persisted user. Malformed or unreadable data is discarded
    /// and its key removed.
    pub fn load_user(&self) -> Option<User> {
        let raw = match self.storage.get_item(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) if is_undecodable(&e) => {
                tracing::warn!(error = %e, "Discarding undecodable stored user");
                self.discard(USER_KEY);
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored user");
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(mut user) => {
                if user.token.is_none() {
                    user.token = self.token();
                }
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed stored user");
                self.discard(USER_KEY);
                None
            }
        }
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            tracing::warn!(key, error = %e, "Failed to remove stored item");
        }
    }

    /// Persisted bearer token, if any.
    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    /// Persist `user` and its token. A user without a token removes any
    /// stored token, so the token key always belongs to the stored user.
    pub fn persist(&self, user: &User) -> Result<(), AppError> {
        let json = serde_json::to_string(user)
            .map_err(|e| AppError::Storage(anyhow::Error::new(e).context("serializing user")))?;
        self.storage.set_item(USER_KEY, &json)?;
        match &user.token {
            Some(token) => self.storage.set_item(TOKEN_KEY, token)?,
            None => self.storage.remove_item(TOKEN_KEY)?,
        }
        Ok(())
    }

    /// Remove the persisted user and token.
    pub fn clear(&self) -> Result<(), AppError> {
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(TOKEN_KEY)?;
        Ok(())
    }
}

/// Read failures caused by the stored bytes themselves (e.g. invalid UTF-8),
/// as opposed to the storage being unavailable.
fn is_undecodable(err: &AppError) -> bool {
    match err {
        AppError::Storage(e) => e
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == ErrorKind::InvalidData),
        _ => false,
    }
}
