//! GitHub infrastructure adapter.
//!
//! Implements the [`provisioning`] port traits `RepositoryClient` and
//! `RepositoryConnector` over the GitHub REST v3 API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (headers, base64 contents, status codes) are
//! handled here; failures are classified into `RemoteError` exactly once,
//! at this boundary, and the orchestration layer never sees a status code
//! it has to interpret.

pub mod client;
pub mod connector;

pub use client::{classify_creation_failure, classify_failure, GithubClient, GithubEndpoints, REPOSITORIES_PER_PAGE};
pub use connector::{AccessToken, GithubConnector, StaticTokenSource, TokenSource, DEFAULT_USER_AGENT};
