//! The inbound operation surface as a single value.

use std::sync::Arc;

use provisioning::{
    CommitSummary, ProjectData, ProjectSnapshot, ProvisioningError, PullRequest,
    PullRequestWithProjectData, RepositorySummary, WorkspaceProvider,
};

use crate::context::Capabilities;
use crate::edit::{ProjectEdit, ProjectEditor};
use crate::fork::{DataFork, DataForkEngine};
use crate::history::{HistoryFork, HistoryForkEngine};
use crate::provision::{ProvisionRequest, Provisioned, Provisioner};
use crate::queries::ProjectQueries;
use crate::upstream::UpstreamSync;

/// Every project repository operation, wired from one set of capabilities.
///
/// Each call is independent: it connects its own client and shares no
/// mutable state with concurrent calls.
pub struct ProjectService {
    provisioner: Provisioner,
    data_forks: DataForkEngine,
    history_forks: HistoryForkEngine,
    upstream: UpstreamSync,
    queries: ProjectQueries,
    editor: ProjectEditor,
}

impl ProjectService {
    pub fn new(caps: Capabilities, workspaces: Arc<dyn WorkspaceProvider>) -> Self {
        Self {
            provisioner: Provisioner::new(caps.clone()),
            data_forks: DataForkEngine::new(caps.clone()),
            history_forks: HistoryForkEngine::new(caps.clone(), workspaces),
            upstream: UpstreamSync::new(caps.clone()),
            queries: ProjectQueries::new(caps.clone()),
            editor: ProjectEditor::new(caps),
        }
    }

    pub async fn provision(&self, request: ProvisionRequest) -> Result<Provisioned, ProvisioningError> {
        self.provisioner.provision(request).await
    }

    pub async fn fork_data(&self, source: &str) -> Result<DataFork, ProvisioningError> {
        self.data_forks.fork(source).await
    }

    pub async fn fork_history(&self, source: &str) -> Result<HistoryFork, ProvisioningError> {
        self.history_forks.fork(source).await
    }

    pub async fn propose_upstream_change(
        &self,
        fork: &str,
        project_data: ProjectData,
    ) -> Result<PullRequest, ProvisioningError> {
        self.upstream.propose(fork, project_data).await
    }

    pub async fn edit_project(
        &self,
        repo: &str,
        project_data: ProjectData,
        message: &str,
    ) -> Result<ProjectEdit, ProvisioningError> {
        self.editor.edit(repo, project_data, message).await
    }

    pub async fn list_repositories(&self, page: u32) -> Result<Vec<RepositorySummary>, ProvisioningError> {
        self.queries.list_repositories(page).await
    }

    pub async fn list_commits(&self, repo: &str) -> Result<Vec<CommitSummary>, ProvisioningError> {
        self.queries.list_commits(repo).await
    }

    pub async fn read_project_data(
        &self,
        repo: &str,
        git_ref: Option<&str>,
    ) -> Result<ProjectSnapshot, ProvisioningError> {
        self.queries.read_project_data(repo, git_ref).await
    }

    pub async fn list_open_pull_requests(
        &self,
        repo: &str,
    ) -> Result<Vec<PullRequestWithProjectData>, ProvisioningError> {
        self.queries.list_open_pull_requests(repo).await
    }
}
