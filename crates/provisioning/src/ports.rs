//! Port traits implemented by infrastructure crates.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`RepositoryClient`] | `github::GithubClient` (REST) |
//! | [`RepositoryConnector`] | `github::GithubConnector` |
//! | [`WorkspaceProvider`] / [`LocalWorkspace`] | `git_workspace::GitWorkspaceProvider` |
//!
//! Orchestration code depends only on these traits, which is also where the
//! in-memory test doubles plug in.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{
    BranchName, CommitIdentity, CommitSha, CommitSummary, FileWrite, NewPullRequest,
    NewRepository, OrgName, PullRequest, RemoteError, RemoteFile, RepoPath, RepoRef,
    RepositoryHandle, RepositorySummary, RevisionId, WorkspaceError,
};

// ---------------------------------------------------------------------------
// Remote repository client
// ---------------------------------------------------------------------------

/// Authenticated capability for named remote repository operations.
///
/// Every write is a real mutation on the platform and is never rolled back
/// by the client; compensation, if any, is the caller's concern.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Creates a repository under `org`.
    ///
    /// Fails with [`RemoteError::NameCollision`] when the name is taken.
    async fn create_repository(
        &self,
        org: &OrgName,
        request: &NewRepository,
    ) -> Result<RepositoryHandle, RemoteError>;

    /// Reads and decodes a file, at `git_ref` or the default branch.
    async fn read_file(
        &self,
        repo: &RepoRef,
        path: &RepoPath,
        git_ref: Option<&str>,
    ) -> Result<RemoteFile, RemoteError>;

    /// Creates or overwrites a file; returns the new revision marker.
    async fn write_file(&self, repo: &RepoRef, write: &FileWrite) -> Result<RevisionId, RemoteError>;

    /// Creates `branch` pointing at `from`.
    async fn create_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
        from: &CommitSha,
    ) -> Result<(), RemoteError>;

    /// Current tip commit of `branch`.
    async fn read_branch_tip(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
    ) -> Result<CommitSha, RemoteError>;

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        request: &NewPullRequest,
    ) -> Result<PullRequest, RemoteError>;

    /// Replaces the repository's topic set.
    async fn set_topics(&self, repo: &RepoRef, topics: &[String]) -> Result<(), RemoteError>;

    /// One page (1-based) of `org`'s repositories, newest first.
    async fn list_repositories(
        &self,
        org: &OrgName,
        page: u32,
    ) -> Result<Vec<RepositorySummary>, RemoteError>;

    async fn list_open_pull_requests(&self, repo: &RepoRef) -> Result<Vec<PullRequest>, RemoteError>;

    async fn list_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>, RemoteError>;

    /// Git transport URL for `repo` carrying this client's credentials.
    fn git_remote(&self, repo: &RepoRef) -> Result<GitRemote, RemoteError>;
}

/// Authenticates against the platform and hands out a fresh client.
///
/// Each top-level operation connects once; clients are never shared between
/// concurrent operations.
#[async_trait]
pub trait RepositoryConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn RepositoryClient>, RemoteError>;
}

// ---------------------------------------------------------------------------
// Git transport URL
// ---------------------------------------------------------------------------

/// A git remote URL that may embed credentials.
///
/// `Display` and `Debug` mask the password so the URL can be logged; only
/// [`GitRemote::expose`] yields the usable form.
#[derive(Clone, PartialEq, Eq)]
pub struct GitRemote(Url);

impl GitRemote {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    /// The URL including credentials, for handing to the VCS process.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    fn redacted(&self) -> String {
        let mut shown = self.0.clone();
        if shown.password().is_some() {
            // Only fails for cannot-be-a-base URLs, which never carry a password.
            let _ = shown.set_password(Some("***"));
        }
        shown.to_string()
    }
}

impl std::fmt::Display for GitRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl std::fmt::Debug for GitRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GitRemote({})", self.redacted())
    }
}

// ---------------------------------------------------------------------------
// Local repository workspace
// ---------------------------------------------------------------------------

/// Produces local clones in isolated scratch directories.
#[async_trait]
pub trait WorkspaceProvider: Send + Sync {
    /// Clones the full history of `source` into a new, uniquely named
    /// scratch directory.
    async fn clone_repository(&self, source: &GitRemote) -> Result<Box<dyn LocalWorkspace>, WorkspaceError>;
}

/// A local clone. The scratch directory is removed when the value is dropped,
/// whether the surrounding operation succeeded or not.
#[async_trait]
pub trait LocalWorkspace: Send + Sync {
    /// Root of the working tree.
    fn root(&self) -> &Path;

    /// Reads a file from the working tree; `None` if it does not exist.
    async fn read_file(&self, path: &RepoPath) -> Result<Option<String>, WorkspaceError>;

    /// Overwrites (or creates) a file in the working tree.
    async fn write_file(&self, path: &RepoPath, contents: &str) -> Result<(), WorkspaceError>;

    /// Stages exactly `paths` and records one commit as `identity`.
    async fn commit(
        &self,
        paths: &[RepoPath],
        message: &str,
        identity: &CommitIdentity,
    ) -> Result<(), WorkspaceError>;

    /// Replaces the `origin` remote with `destination` and pushes `branch`.
    async fn push_to(&self, destination: &GitRemote, branch: &BranchName) -> Result<(), WorkspaceError>;
}
