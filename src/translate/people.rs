//! Resolution of person references to user IDs.

use crate::error::AppError;
use crate::types::UserId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// The directory of users in the target system.
pub trait UserDirectory: Send + Sync {
    fn lookup_by_email(&self, email: &str) -> Option<UserId>;
    fn lookup_by_username(&self, username: &str) -> Option<UserId>;

    /// Tries the reference as an email first, then as a username.
    fn resolve(&self, reference: &str) -> Option<UserId> {
        self.lookup_by_email(reference)
            .or_else(|| self.lookup_by_username(reference))
    }
}

/// Splits a free-text email property into individual addresses.
///
/// Separators are `;` and `,`; surrounding whitespace and blank entries are
/// dropped.
pub fn split_email_list(raw: &str) -> Vec<&str> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// One user as listed in a directory file.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// A directory held in memory, matching emails and usernames
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    by_email: HashMap<String, UserId>,
    by_username: HashMap<String, UserId>,
}

impl InMemoryDirectory {
    pub fn new(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let mut directory = Self::default();
        for entry in entries {
            if let Some(email) = entry.email.as_deref() {
                directory.by_email.insert(normalize(email), entry.id);
            }
            if let Some(username) = entry.username.as_deref() {
                directory.by_username.insert(normalize(username), entry.id);
            }
        }
        directory
    }

    /// Loads `[{"id": 1, "email": "...", "username": "..."}]` from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)?;
        let entries: Vec<DirectoryEntry> =
            serde_json::from_str(&contents).map_err(|source| AppError::JsonParseError {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded {} users from {}", entries.len(), path.display());
        Ok(Self::new(entries))
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty() && self.by_username.is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn lookup_by_email(&self, email: &str) -> Option<UserId> {
        self.by_email.get(&normalize(email)).copied()
    }

    fn lookup_by_username(&self, username: &str) -> Option<UserId> {
        self.by_username.get(&normalize(username)).copied()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
