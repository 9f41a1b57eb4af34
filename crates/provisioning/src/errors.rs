//! Error and retry-policy types for the project repository domain.
//!
//! Failures are characterised where they arise and never re-parsed upstream:
//!
//! - [`RemoteError`] is decided at the remote client boundary (status code and
//!   body inspection happen exactly once, inside the adapter).
//! - [`WorkspaceError`] covers local VCS process invocations.
//! - [`ProvisioningError`] is the single failure an operation returns to its
//!   caller; [`ProvisioningError::to_failure`] renders it for user display.
//!
//! [`RetryPolicy`] is a cross-cutting concern: the only retried failure class
//! is a repository name collision, and only once per operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition may be recovered from and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The requested repository name is taken; retry once under a new name.
    RenameAndRetry,
    /// The operation must not be retried; the failure is surfaced verbatim.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Remote client errors
// ---------------------------------------------------------------------------

/// Typed failure returned by every remote repository client method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The platform rejected a repository creation because the name is taken.
    #[error("Repository name already exists: {name}")]
    NameCollision {
        /// The name that collided.
        name: String,
    },

    /// The requested resource (repository, file, ref) does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// Human-readable description of what was requested.
        resource: String,
    },

    /// Any other non-2xx response from the platform.
    #[error("Remote platform returned {status}: {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Platform-provided message.
        message: String,
    },

    /// A credential for the platform could not be obtained.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid response from remote platform: {message}")]
    InvalidResponse { message: String },
}

impl RemoteError {
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            RemoteError::NameCollision { .. } => RetryPolicy::RenameAndRetry,
            _ => RetryPolicy::NonRetryable,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }

    /// HTTP status associated with the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::NameCollision { .. } => Some(422),
            RemoteError::NotFound { .. } => Some(404),
            RemoteError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Local workspace errors
// ---------------------------------------------------------------------------

/// Failure of a local VCS workspace operation.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Filesystem access inside the scratch directory failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A VCS process exited unsuccessfully.
    ///
    /// `command` names the subcommand only (e.g. `"git push"`); arguments are
    /// never recorded because remote URLs carry credentials.
    #[error("`{command}` failed with exit code {}: {stderr}", .status.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl WorkspaceError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        WorkspaceError::Io {
            context: context.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Operation-level errors
// ---------------------------------------------------------------------------

/// The single characterised failure returned by a top-level operation.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The repository name collided again after the one permitted rename.
    #[error("Repository name collision persisted after renaming to '{name}'")]
    Collision { name: String },

    /// Required input or derived state is missing (no project data, a
    /// repository that is not a fork, an unparseable provenance URL).
    #[error("Precondition failed: {reason}")]
    Precondition { reason: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Local repository operation failed: {0}")]
    LocalProcess(#[from] WorkspaceError),

    /// A stored document (`projectData.json`, `metaData.json`) is not valid JSON.
    #[error("Invalid document '{path}': {message}")]
    InvalidDocument { path: String, message: String },
}

impl ProvisioningError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        ProvisioningError::Precondition {
            reason: reason.into(),
        }
    }

    pub fn invalid_document(path: impl Into<String>, source: &serde_json::Error) -> Self {
        ProvisioningError::InvalidDocument {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Short machine-readable classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProvisioningError::Collision { .. } => FailureKind::Collision,
            ProvisioningError::Precondition { .. } => FailureKind::Precondition,
            ProvisioningError::Remote(RemoteError::NameCollision { .. }) => FailureKind::Collision,
            ProvisioningError::Remote(_) => FailureKind::Remote,
            ProvisioningError::LocalProcess(_) => FailureKind::LocalProcess,
            ProvisioningError::InvalidDocument { .. } => FailureKind::Precondition,
        }
    }

    /// Renders the failure for the caller: a generic message plus the detail.
    pub fn to_failure(&self) -> OperationFailure {
        OperationFailure {
            message: OperationFailure::GENERIC_MESSAGE.to_string(),
            kind: self.kind(),
            status: match self {
                ProvisioningError::Remote(remote) => remote.status(),
                _ => None,
            },
            detail: self.to_string(),
        }
    }
}

/// Failure classes of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Collision,
    Precondition,
    Remote,
    LocalProcess,
}

/// User-visible rendering of a failed operation. There is no partial-success
/// flag: an operation either returns its result or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub message: String,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
}

impl OperationFailure {
    pub const GENERIC_MESSAGE: &'static str = "Could not complete operation";
}
