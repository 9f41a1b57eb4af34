//! Read-only views over project repositories.

use futures::future::join_all;
use provisioning::{
    CommitSummary, ProjectData, ProjectSnapshot, ProvisioningError, PullRequestWithProjectData,
    RepoPath, RepositorySummary, PROJECT_DATA_FILE,
};
use tracing::{instrument, warn};

use crate::context::{required_name, Capabilities};

pub struct ProjectQueries {
    caps: Capabilities,
}

impl ProjectQueries {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// One page (1-based, 50 entries) of the organization's repositories,
    /// newest first.
    #[instrument(skip(self))]
    pub async fn list_repositories(&self, page: u32) -> Result<Vec<RepositorySummary>, ProvisioningError> {
        if page == 0 {
            return Err(ProvisioningError::precondition("page numbers start at 1"));
        }
        let client = self.caps.connect().await?;
        Ok(client.list_repositories(&self.caps.settings.org, page).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_commits(&self, repo: &str) -> Result<Vec<CommitSummary>, ProvisioningError> {
        let repo = self.caps.settings.repo(required_name(repo, "repository name")?);
        let client = self.caps.connect().await?;
        Ok(client.list_commits(&repo).await?)
    }

    /// `projectData.json` at `git_ref` (a branch or commit), or at the
    /// default branch when `None`.
    #[instrument(skip(self))]
    pub async fn read_project_data(
        &self,
        repo: &str,
        git_ref: Option<&str>,
    ) -> Result<ProjectSnapshot, ProvisioningError> {
        let repo = self.caps.settings.repo(required_name(repo, "repository name")?);
        let git_ref = git_ref.map(str::trim).filter(|r| !r.is_empty());
        let client = self.caps.connect().await?;
        let file = client
            .read_file(&repo, &RepoPath::root_file(PROJECT_DATA_FILE), git_ref)
            .await?;
        let project_data = ProjectData::from_document(&file.content)
            .map_err(|e| ProvisioningError::invalid_document(PROJECT_DATA_FILE, &e))?;
        Ok(ProjectSnapshot {
            project_data,
            revision: file.revision,
            git_ref: git_ref.map(str::to_string),
        })
    }

    /// Open pull requests, each with the project document on its head branch.
    ///
    /// The documents are read concurrently. One that cannot be read or
    /// parsed is reported as `None`; it never fails the listing.
    #[instrument(skip(self))]
    pub async fn list_open_pull_requests(
        &self,
        repo: &str,
    ) -> Result<Vec<PullRequestWithProjectData>, ProvisioningError> {
        let repo = self.caps.settings.repo(required_name(repo, "repository name")?);
        let client = self.caps.connect().await?;
        let pulls = client.list_open_pull_requests(&repo).await?;

        let path = RepoPath::root_file(PROJECT_DATA_FILE);
        let reads = pulls.iter().map(|pull| {
            let client = client.clone();
            let (repo, path) = (&repo, &path);
            async move {
                match client.read_file(repo, path, Some(pull.head.as_str())).await {
                    Ok(file) => match ProjectData::from_document(&file.content) {
                        Ok(data) => Some(data),
                        Err(error) => {
                            warn!(%repo, number = %pull.number, %error, "pull request project data is not valid JSON");
                            None
                        }
                    },
                    Err(error) => {
                        warn!(%repo, number = %pull.number, %error, "could not read pull request project data");
                        None
                    }
                }
            }
        });
        let documents = join_all(reads).await;

        Ok(pulls
            .into_iter()
            .zip(documents)
            .map(|(pull_request, project_data)| PullRequestWithProjectData {
                pull_request,
                project_data,
            })
            .collect())
    }
}
