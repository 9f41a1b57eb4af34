//! Data-only forks: a new repository seeded from another's current files.

use provisioning::{
    Metadata, NewRepository, ProjectData, ProvisioningError, RepoName, RepoPath, RepoRef,
    RepositoryClient, Secret, StoredMetadata, METADATA_FILE, PROJECT_DATA_FILE,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::context::{required_name, Capabilities};
use crate::seed::seed_repository;

/// Result of [`DataForkEngine::fork`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFork {
    pub new_name: RepoName,
    pub url: String,
    pub secret: Secret,
    /// The source's project document, as copied.
    pub project_data: ProjectData,
}

pub struct DataForkEngine {
    caps: Capabilities,
}

impl DataForkEngine {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// Copies `projectData.json` from `source` into a new `<source>-<uuid>`
    /// repository and gives it fresh fork metadata.
    ///
    /// The project document is written exactly as read. Any failure aborts
    /// the fork; a repository created before the failure is left in place.
    #[instrument(skip_all, fields(source = %source))]
    pub async fn fork(&self, source: &str) -> Result<DataFork, ProvisioningError> {
        let source = required_name(source, "source repository name")?;
        let settings = &self.caps.settings;
        let client = self.caps.connect().await?;
        let source_repo = settings.repo(source.clone());

        let (project_document, project_data) = read_project(client.as_ref(), &source_repo).await?;
        let source_meta = read_metadata(client.as_ref(), &source_repo).await?;

        let key = self.caps.keys.issue();
        let metadata = Metadata::fork_of(
            key.digest.clone(),
            source_meta.theme_or_default(),
            settings.provenance_url(&source),
        );
        let metadata_document = metadata
            .to_document()
            .map_err(|e| ProvisioningError::invalid_document(METADATA_FILE, &e))?;

        let request = NewRepository::public(
            source.with_unique_suffix(),
            format!("Fork of {source}"),
        );
        let handle = client.create_repository(&settings.org, &request).await?;
        let repo = settings.repo(handle.name.clone());

        seed_repository(client.as_ref(), &repo, project_document, metadata_document).await?;

        info!(%repo, forked_from = %source_repo, "data fork created");
        Ok(DataFork {
            new_name: handle.name,
            url: handle.html_url,
            secret: key.secret,
            project_data,
        })
    }
}

/// Raw and parsed `projectData.json` at the default branch.
async fn read_project(
    client: &dyn RepositoryClient,
    repo: &RepoRef,
) -> Result<(String, ProjectData), ProvisioningError> {
    let file = client
        .read_file(repo, &RepoPath::root_file(PROJECT_DATA_FILE), None)
        .await?;
    let parsed = ProjectData::from_document(&file.content)
        .map_err(|e| ProvisioningError::invalid_document(PROJECT_DATA_FILE, &e))?;
    Ok((file.content, parsed))
}

/// Lenient view of `metaData.json` on the default branch.
pub(crate) async fn read_metadata(
    client: &dyn RepositoryClient,
    repo: &RepoRef,
) -> Result<StoredMetadata, ProvisioningError> {
    let file = client
        .read_file(repo, &RepoPath::root_file(METADATA_FILE), None)
        .await?;
    StoredMetadata::parse(&file.content)
        .map_err(|e| ProvisioningError::invalid_document(METADATA_FILE, &e))
}
