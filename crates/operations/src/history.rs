//! History-preserving forks through a local clone.

use std::sync::Arc;

use provisioning::{
    LocalWorkspace, Metadata, NewRepository, ProjectData, ProvisioningError, RepoName, RepoPath,
    Secret, StoredMetadata, WorkspaceProvider, DEFAULT_THEME, METADATA_FILE, PROJECT_DATA_FILE,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::context::{required_name, Capabilities};

const METADATA_COMMIT_MESSAGE: &str = "Update metaData.json with new hashedKey";

/// Result of [`HistoryForkEngine::fork`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFork {
    pub new_name: RepoName,
    pub url: String,
    pub secret: Secret,
    pub success: bool,
    /// Project document found in the clone, `{}` when there is none.
    pub project_data: ProjectData,
}

pub struct HistoryForkEngine {
    caps: Capabilities,
    workspaces: Arc<dyn WorkspaceProvider>,
}

impl HistoryForkEngine {
    pub fn new(caps: Capabilities, workspaces: Arc<dyn WorkspaceProvider>) -> Self {
        Self { caps, workspaces }
    }

    /// Clones `source` with its full history, rewrites `metaData.json` in one
    /// new commit, and pushes the result to a new `<source>-fork-<uuid>`
    /// repository.
    ///
    /// The clone lives in its own scratch directory, which is removed when
    /// this call returns, on every path.
    #[instrument(skip_all, fields(source = %source))]
    pub async fn fork(&self, source: &str) -> Result<HistoryFork, ProvisioningError> {
        let source = required_name(source, "source repository name")?;
        let settings = &self.caps.settings;
        let client = self.caps.connect().await?;

        let source_remote = client.git_remote(&settings.repo(source.clone()))?;
        let workspace = self.workspaces.clone_repository(&source_remote).await?;
        debug!(root = %workspace.root().display(), "source cloned");

        // Both documents are validated before anything is created remotely.
        let theme = match read_local_metadata(workspace.as_ref()).await? {
            Some(stored) => stored.theme_or_default().to_string(),
            None => DEFAULT_THEME.to_string(),
        };
        let project_data = read_local_project(workspace.as_ref()).await?;

        let request = NewRepository::public(
            source.history_fork_name(),
            format!("Fork with history of {source}"),
        );
        let handle = client.create_repository(&settings.org, &request).await?;
        let destination = settings.repo(handle.name.clone());

        let key = self.caps.keys.issue();
        let metadata = Metadata::fork_of(key.digest.clone(), theme, settings.provenance_url(&source));
        let metadata_document = metadata
            .to_pretty_document()
            .map_err(|e| ProvisioningError::invalid_document(METADATA_FILE, &e))?;

        let metadata_path = RepoPath::root_file(METADATA_FILE);
        workspace.write_file(&metadata_path, &metadata_document).await?;
        workspace
            .commit(
                std::slice::from_ref(&metadata_path),
                METADATA_COMMIT_MESSAGE,
                &settings.bot_identity,
            )
            .await?;
        workspace
            .push_to(&client.git_remote(&destination)?, &settings.default_branch)
            .await?;

        info!(repo = %destination, forked_from = %source, "history fork pushed");
        Ok(HistoryFork {
            new_name: handle.name,
            url: handle.html_url,
            secret: key.secret,
            success: true,
            project_data,
        })
    }
}

async fn read_local_metadata(
    workspace: &dyn LocalWorkspace,
) -> Result<Option<StoredMetadata>, ProvisioningError> {
    let Some(raw) = workspace.read_file(&RepoPath::root_file(METADATA_FILE)).await? else {
        return Ok(None);
    };
    StoredMetadata::parse(&raw)
        .map(Some)
        .map_err(|e| ProvisioningError::invalid_document(METADATA_FILE, &e))
}

async fn read_local_project(workspace: &dyn LocalWorkspace) -> Result<ProjectData, ProvisioningError> {
    match workspace.read_file(&RepoPath::root_file(PROJECT_DATA_FILE)).await? {
        Some(raw) => ProjectData::from_document(&raw)
            .map_err(|e| ProvisioningError::invalid_document(PROJECT_DATA_FILE, &e)),
        None => Ok(ProjectData::empty()),
    }
}
