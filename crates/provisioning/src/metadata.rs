//! The metadata record stored as `metaData.json` next to the project document.
//!
//! Two shapes exist on purpose. [`Metadata`] is the strict record this
//! subsystem writes; [`StoredMetadata`] is a lenient view used when reading
//! records written by anyone (older clients, the edit flow, hand edits), where
//! every field may be missing.

use serde::{Deserialize, Serialize};

use crate::keys::KeyDigest;
use crate::types::{Timestamp, DEFAULT_THEME};

/// Metadata written at creation or fork time.
///
/// `hashed_key` is the digest of the secret handed to the caller; the
/// plaintext is never part of this record. `forked_from` is present only on
/// forks and is the sole marker that a repository is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub created_at: Timestamp,
    pub theme: String,
    pub hashed_key: KeyDigest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<String>,
}

impl Metadata {
    /// Record for a freshly provisioned repository.
    pub fn new(hashed_key: KeyDigest, theme: impl Into<String>) -> Self {
        Self {
            created_at: Timestamp::now(),
            theme: theme.into(),
            hashed_key,
            forked_from: None,
        }
    }

    /// Record for a fork of the repository at `source_url`.
    pub fn fork_of(hashed_key: KeyDigest, theme: impl Into<String>, source_url: String) -> Self {
        Self {
            forked_from: Some(source_url),
            ..Self::new(hashed_key, theme)
        }
    }

    /// Compact JSON, as written through the remote API.
    pub fn to_document(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Two-space indented JSON, as rewritten inside a local clone.
    pub fn to_pretty_document(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Lenient read-side view of a stored metadata record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetadata {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub hashed_key: Option<String>,
    #[serde(default)]
    pub forked_from: Option<String>,
}

impl StoredMetadata {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The recorded theme, or [`DEFAULT_THEME`] when absent or blank.
    pub fn theme_or_default(&self) -> &str {
        match self.theme.as_deref() {
            Some(theme) if !theme.trim().is_empty() => theme,
            _ => DEFAULT_THEME,
        }
    }

    /// Provenance URL, when this record describes a fork.
    pub fn upstream_url(&self) -> Option<&str> {
        self.forked_from
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
