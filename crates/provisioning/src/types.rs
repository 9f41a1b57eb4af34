//! Shared value types for the project repository domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structured payloads exchanged with the hosting platform: repository
//! creation requests, file contents with their revision markers, pull requests,
//! and the summaries returned by listing queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BranchName, CommitSha, PullRequestNumber, RepoName, RepoPath, RevisionId};

/// Path of the opaque project document at the repository root.
pub const PROJECT_DATA_FILE: &str = "projectData.json";

/// Path of the metadata record at the repository root.
pub const METADATA_FILE: &str = "metaData.json";

/// Theme recorded when the caller (or a fork source) supplies none.
pub const DEFAULT_THEME: &str = "default";

// ---------------------------------------------------------------------------
// Project data
// ---------------------------------------------------------------------------

/// The user's work: an opaque JSON document stored as `projectData.json`.
///
/// This subsystem never interprets the document; it only moves it between
/// callers and repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectData(serde_json::Value);

impl ProjectData {
    pub fn new(document: serde_json::Value) -> Self {
        Self(document)
    }

    /// An empty object, used when a cloned repository has no project file.
    pub fn empty() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Parses a stored document.
    pub fn from_document(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self)
    }

    /// Serialises the document compactly, as written to the repository.
    pub fn to_document(&self) -> String {
        self.0.to_string()
    }

    /// `true` when the caller supplied no document at all.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Repository creation
// ---------------------------------------------------------------------------

/// Visibility of a newly created repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private)
    }
}

/// Optional platform features toggled at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFeatures {
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
}

impl Default for RepositoryFeatures {
    fn default() -> Self {
        Self {
            has_issues: true,
            has_projects: true,
            has_wiki: true,
        }
    }
}

/// Everything the platform needs to create a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRepository {
    pub name: RepoName,
    pub description: String,
    pub visibility: Visibility,
    pub features: RepositoryFeatures,
}

impl NewRepository {
    /// A public repository with every feature enabled.
    pub fn public(name: RepoName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
            visibility: Visibility::Public,
            features: RepositoryFeatures::default(),
        }
    }
}

/// Handle to a repository the platform has just created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// Name as assigned by the platform (it may normalise the requested name).
    pub name: RepoName,
    /// `"owner/name"`.
    pub full_name: String,
    pub html_url: String,
    pub default_branch: Option<BranchName>,
}

// ---------------------------------------------------------------------------
// File contents
// ---------------------------------------------------------------------------

/// Decoded contents of a remote file plus the marker needed to overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    pub revision: RevisionId,
}

/// A single file write.
///
/// `revision` must be `Some` when the file already exists on the target
/// branch and `None` when it is being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: RepoPath,
    pub content: String,
    pub message: String,
    pub revision: Option<RevisionId>,
    /// Target branch; `None` writes to the repository's default branch.
    pub branch: Option<BranchName>,
}

impl FileWrite {
    /// Creates a new file on the default branch.
    pub fn create(path: RepoPath, content: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
            message: message.into(),
            revision: None,
            branch: None,
        }
    }

    /// Seed write used when populating a freshly created repository.
    pub fn seed(file: &'static str, content: impl Into<String>) -> Self {
        Self::create(RepoPath::root_file(file), content, format!("Add {file}"))
    }

    pub fn on_branch(mut self, branch: BranchName) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn replacing(mut self, revision: Option<RevisionId>) -> Self {
        self.revision = revision;
        self
    }
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// Request to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: BranchName,
    pub base: BranchName,
    pub body: String,
}

/// A pull request resource as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: PullRequestNumber,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    pub head: BranchName,
    pub base: BranchName,
}

/// An open pull request together with the project document on its head branch.
///
/// `project_data` is `None` when the document could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestWithProjectData {
    pub pull_request: PullRequest,
    pub project_data: Option<ProjectData>,
}

// ---------------------------------------------------------------------------
// Listing summaries
// ---------------------------------------------------------------------------

/// One entry of an organization repository listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: RepoName,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: Option<Timestamp>,
}

/// One entry of a repository's commit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: CommitSha,
    pub message: String,
    pub author_name: Option<String>,
    pub authored_at: Option<Timestamp>,
    pub html_url: String,
}

/// Project document read from a repository, with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project_data: ProjectData,
    pub revision: RevisionId,
    /// The ref the document was read at; `None` means the default branch.
    pub git_ref: Option<String>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Serialises as RFC 3339 with millisecond precision
/// (`2024-01-01T00:00:00.000Z`), the format stored in `metaData.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        )
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}
