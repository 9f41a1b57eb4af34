//! Local git workspaces for history-preserving forks.
//!
//! Implements the [`provisioning`] `WorkspaceProvider` / `LocalWorkspace`
//! ports by driving the `git` executable with `tokio::process`. Each clone
//! lives in its own `tempfile` scratch directory under a configurable root;
//! the directory is deleted when the workspace value is dropped.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** No domain rules. Remote URLs carry credentials, so
//! they are never logged and never appear in errors: failures record the
//! git subcommand, its exit code, and a redacted stderr.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use provisioning::{
    BranchName, CommitIdentity, GitRemote, LocalWorkspace, RepoPath, WorkspaceError,
    WorkspaceProvider,
};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, instrument};

const CLONE_DIR: &str = "repo";
const REMOTE_NAME: &str = "origin";

/// Clones repositories into unique directories below `scratch_root`.
#[derive(Debug, Clone)]
pub struct GitWorkspaceProvider {
    scratch_root: PathBuf,
}

impl GitWorkspaceProvider {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }
}

#[async_trait]
impl WorkspaceProvider for GitWorkspaceProvider {
    #[instrument(skip_all, fields(source = %source))]
    async fn clone_repository(&self, source: &GitRemote) -> Result<Box<dyn LocalWorkspace>, WorkspaceError> {
        tokio::fs::create_dir_all(&self.scratch_root)
            .await
            .map_err(|e| WorkspaceError::io("creating scratch root", e))?;
        let scratch = tempfile::Builder::new()
            .prefix("clone-")
            .tempdir_in(&self.scratch_root)
            .map_err(|e| WorkspaceError::io("creating scratch directory", e))?;
        let root = scratch.path().join(CLONE_DIR);

        let target = root.to_string_lossy().into_owned();
        run_git(
            scratch.path(),
            "clone",
            &["clone", "--quiet", source.expose(), target.as_str()],
            Some(source),
        )
        .await?;
        debug!(root = %root.display(), "repository cloned");

        Ok(Box::new(GitWorkspace {
            root,
            _scratch: scratch,
        }))
    }
}

/// A clone with its working tree at `root`.
pub struct GitWorkspace {
    root: PathBuf,
    _scratch: TempDir,
}

impl GitWorkspace {
    fn path_of(&self, path: &RepoPath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

#[async_trait]
impl LocalWorkspace for GitWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn read_file(&self, path: &RepoPath) -> Result<Option<String>, WorkspaceError> {
        match tokio::fs::read_to_string(self.path_of(path)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkspaceError::io(format!("reading {path}"), e)),
        }
    }

    async fn write_file(&self, path: &RepoPath, contents: &str) -> Result<(), WorkspaceError> {
        tokio::fs::write(self.path_of(path), contents)
            .await
            .map_err(|e| WorkspaceError::io(format!("writing {path}"), e))
    }

    async fn commit(
        &self,
        paths: &[RepoPath],
        message: &str,
        identity: &CommitIdentity,
    ) -> Result<(), WorkspaceError> {
        run_git(&self.root, "config", &["config", "user.name", identity.name.as_str()], None).await?;
        run_git(&self.root, "config", &["config", "user.email", identity.email.as_str()], None).await?;

        let mut add = vec!["add", "--"];
        add.extend(paths.iter().map(RepoPath::as_str));
        run_git(&self.root, "add", &add, None).await?;
        run_git(&self.root, "commit", &["commit", "--quiet", "-m", message], None).await
    }

    async fn push_to(&self, destination: &GitRemote, branch: &BranchName) -> Result<(), WorkspaceError> {
        run_git(&self.root, "remote remove", &["remote", "remove", REMOTE_NAME], None).await?;
        run_git(
            &self.root,
            "remote add",
            &["remote", "add", REMOTE_NAME, destination.expose()],
            Some(destination),
        )
        .await?;
        run_git(
            &self.root,
            "push",
            &["push", "--quiet", "-u", REMOTE_NAME, branch.as_str()],
            Some(destination),
        )
        .await
    }
}

/// Runs `git args` in `cwd` without any interactive prompt.
///
/// `subcommand` is what gets recorded on failure. When `remote` is given,
/// its credentials are masked in the captured stderr.
async fn run_git(
    cwd: &Path,
    subcommand: &str,
    args: &[&str],
    remote: Option<&GitRemote>,
) -> Result<(), WorkspaceError> {
    let command = format!("git {subcommand}");
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| WorkspaceError::io(format!("running `{command}`"), e))?;
    if output.status.success() {
        return Ok(());
    }

    let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if let Some(remote) = remote {
        stderr = stderr.replace(remote.expose(), &remote.to_string());
    }
    Err(WorkspaceError::CommandFailed {
        command,
        status: output.status.code(),
        stderr,
    })
}
