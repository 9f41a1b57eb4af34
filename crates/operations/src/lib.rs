//! Project repository operations.
//!
//! This crate sequences the calls that provision a project repository, fork
//! it (data-only or with full history), propose a fork's data back upstream,
//! edit it, and read it back. [`ProjectService`] bundles them behind one
//! value.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Operations sequence calls between the domain in
//! the [`provisioning`] crate and its port traits (remote client, local
//! workspace). They contain no platform or VCS details of their own.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`context`] | `Capabilities` passed to every component |
//! | [`provision`] | `Provisioner`: create, seed, tag, rename once on collision |
//! | [`fork`] | `DataForkEngine`: copy the current project files |
//! | [`history`] | `HistoryForkEngine`: clone, rewrite metadata, push |
//! | [`upstream`] | `UpstreamSync`: branch + write + pull request on the upstream |
//! | [`queries`] | `ProjectQueries`: listings and document reads |
//! | [`edit`] | `ProjectEditor`: revision-checked overwrite |
//! | [`service`] | `ProjectService` facade |

pub mod context;
pub mod edit;
pub mod fork;
pub mod history;
pub mod provision;
pub mod queries;
pub mod service;
pub mod upstream;

mod seed;

#[cfg(test)]
mod testing;

pub use context::Capabilities;
pub use edit::{ProjectEdit, ProjectEditor};
pub use fork::{DataFork, DataForkEngine};
pub use history::{HistoryFork, HistoryForkEngine};
pub use provision::{ProvisionRequest, Provisioned, Provisioner};
pub use queries::ProjectQueries;
pub use service::ProjectService;
pub use upstream::UpstreamSync;
