//! Core domain for project repository provisioning and synchronization.
//!
//! This crate contains every domain concept, newtype identifier, value type,
//! error type, and port trait shared by the workspace. Infrastructure crates
//! implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepoName`, `BranchName`, `RepoRef`, etc.) |
//! | [`types`] | Shared value types (`ProjectData`, `FileWrite`, `PullRequest`, etc.) |
//! | [`metadata`] | The `metaData.json` record and its lenient read view |
//! | [`keys`] | Secret issuance and digests |
//! | [`topics`] | Topic name sanitisation |
//! | [`settings`] | Explicit service configuration |
//! | [`ports`] | Remote client, connector, and local workspace traits |
//! | [`errors`] | Error taxonomy and retry policy |

pub mod errors;
pub mod identifiers;
pub mod keys;
pub mod metadata;
pub mod ports;
pub mod settings;
pub mod topics;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    FailureKind, OperationFailure, ProvisioningError, RemoteError, RetryPolicy, WorkspaceError,
};
pub use identifiers::{
    BranchName, CommitSha, OrgName, PullRequestNumber, RepoName, RepoPath, RepoRef, RevisionId,
};
pub use keys::{digest_of, IssuedKey, KeyDigest, KeyIssuer, RandomKeyIssuer, Secret};
pub use metadata::{Metadata, StoredMetadata};
pub use ports::{
    GitRemote, LocalWorkspace, RepositoryClient, RepositoryConnector, WorkspaceProvider,
};
pub use settings::{CommitIdentity, ServiceSettings};
pub use topics::{is_valid_topic, sanitize_topics, topics_from_theme};
pub use types::{
    CommitSummary, FileWrite, NewPullRequest, NewRepository, ProjectData, ProjectSnapshot,
    PullRequest, PullRequestWithProjectData, RemoteFile, RepositoryFeatures, RepositoryHandle,
    RepositorySummary, Timestamp, Visibility, DEFAULT_THEME, METADATA_FILE, PROJECT_DATA_FILE,
};
