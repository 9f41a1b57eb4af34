//! Newtype domain identifiers.
//!
//! Every name that travels between the orchestration layer and the hosting
//! platform is a distinct newtype, so a [`BranchName`] cannot be passed where a
//! [`RepoName`] is expected even though both are strings under the hood.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (platform / Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// The organization (or user namespace) that owns project repositories.
    OrgName
}

string_id! {
    /// A repository name, unique within its owning organization.
    RepoName
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"pr-from-fork-1718000000000"`).
    BranchName
}

string_id! {
    /// A Git commit SHA (40-character lowercase hex string).
    CommitSha
}

string_id! {
    /// Opaque marker identifying the current version of a remote file.
    ///
    /// Must accompany any write that overwrites an existing file; a stale
    /// marker makes the platform reject the write.
    RevisionId
}

string_id! {
    /// A file path relative to the repository root.
    RepoPath
}

impl RepoName {
    /// Appends a freshly generated UUID suffix: `<name>-<uuid>`.
    ///
    /// Used to escape a name collision and to name data-only forks.
    pub fn with_unique_suffix(&self) -> Self {
        Self(format!("{}-{}", self.0, Uuid::new_v4()))
    }

    /// Name for a history-preserving fork: `<name>-fork-<uuid>`.
    pub fn history_fork_name(&self) -> Self {
        Self(format!("{}-fork-{}", self.0, Uuid::new_v4()))
    }
}

impl RepoPath {
    /// A well-known file at the repository root, e.g. `projectData.json`.
    pub fn root_file(name: &'static str) -> Self {
        Self(name.to_owned())
    }
}

impl BranchName {
    /// Branch name for an upstream proposal, discriminated by wall-clock millis.
    pub fn for_upstream_proposal(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self(format!("pr-from-fork-{}", now.timestamp_millis()))
    }
}

// ---------------------------------------------------------------------------
// Integer identifiers
// ---------------------------------------------------------------------------

/// Number of a pull request within its repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Repository coordinates
// ---------------------------------------------------------------------------

/// Fully qualified repository coordinates: owner plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: OrgName,
    pub name: RepoName,
}

impl RepoRef {
    pub fn new(owner: OrgName, name: RepoName) -> Self {
        Self { owner, name }
    }

    /// Browser URL of the repository under `web_base` (e.g. `https://github.com`).
    pub fn web_url(&self, web_base: &Url) -> String {
        format!(
            "{}/{}/{}",
            web_base.as_str().trim_end_matches('/'),
            self.owner,
            self.name
        )
    }

    /// Parses the owner/repository pair out of a provenance URL.
    ///
    /// Accepts `https://<host>/<owner>/<repo>` with an optional `.git` suffix
    /// and optional trailing slash. Returns `None` for anything else, including
    /// URLs with more or fewer than two path segments.
    pub fn from_url(raw: &str) -> Option<Self> {
        let parsed = Url::parse(raw.trim()).ok()?;
        parsed.host_str()?;
        let segments: Vec<&str> = parsed
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();
        let &[owner, repo] = segments.as_slice() else {
            return None;
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        Some(Self {
            owner: OrgName::new(owner)?,
            name: RepoName::new(repo)?,
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
