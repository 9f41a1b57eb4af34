//! Repository provisioning with collision-safe naming.

use provisioning::{
    topics_from_theme, Metadata, NewRepository, OrgName, ProjectData, ProvisioningError,
    RemoteError, RepoName, RepositoryClient, RepositoryHandle, RetryPolicy, Secret,
    DEFAULT_THEME, METADATA_FILE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::context::{required_name, Capabilities};
use crate::seed::seed_repository;

/// Input to [`Provisioner::provision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub name: String,
    pub project_data: ProjectData,
    /// Comma-separated free text; each part becomes a topic.
    pub theme: String,
    pub description: Option<String>,
}

/// A provisioned repository. `secret` is the only copy of the plaintext.
#[derive(Debug, Clone, Serialize)]
pub struct Provisioned {
    pub name: RepoName,
    pub url: String,
    pub secret: Secret,
    pub topics: Vec<String>,
}

/// Creates project repositories and seeds them.
pub struct Provisioner {
    caps: Capabilities,
}

impl Provisioner {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// Creates a repository, seeds `projectData.json` and `metaData.json`,
    /// and applies the theme as topics.
    ///
    /// A name collision is retried exactly once under `<name>-<uuid>`. Every
    /// other failure is surfaced as-is, and nothing already created is undone.
    #[instrument(skip_all, fields(requested = %request.name))]
    pub async fn provision(&self, request: ProvisionRequest) -> Result<Provisioned, ProvisioningError> {
        let name = required_name(&request.name, "repository name")?;
        if request.project_data.is_null() {
            return Err(ProvisioningError::precondition("project data is required"));
        }
        let theme = match request.theme.trim() {
            "" => DEFAULT_THEME.to_string(),
            _ => request.theme.clone(),
        };
        let description = request
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.caps.settings.default_description.clone());

        let key = self.caps.keys.issue();
        let metadata = Metadata::new(key.digest.clone(), theme.as_str());
        let metadata_document = metadata
            .to_document()
            .map_err(|e| ProvisioningError::invalid_document(METADATA_FILE, &e))?;

        let client = self.caps.connect().await?;
        let settings = &self.caps.settings;
        let handle = create_with_rename(
            client.as_ref(),
            &settings.org,
            NewRepository::public(name, description),
        )
        .await?;
        let repo = settings.repo(handle.name.clone());

        seed_repository(
            client.as_ref(),
            &repo,
            request.project_data.to_document(),
            metadata_document,
        )
        .await?;

        let topics = topics_from_theme(&theme);
        if topics.is_empty() {
            debug!(%repo, "theme yields no valid topics; leaving topics unset");
        } else {
            client.set_topics(&repo, &topics).await?;
        }

        info!(%repo, url = %handle.html_url, "project repository provisioned");
        Ok(Provisioned {
            name: handle.name,
            url: handle.html_url,
            secret: key.secret,
            topics,
        })
    }
}

/// Creates `request`, renaming once if the name is already taken.
async fn create_with_rename(
    client: &dyn RepositoryClient,
    org: &OrgName,
    request: NewRepository,
) -> Result<RepositoryHandle, ProvisioningError> {
    let error = match client.create_repository(org, &request).await {
        Ok(handle) => return Ok(handle),
        Err(error) => error,
    };
    if error.retry_policy() != RetryPolicy::RenameAndRetry {
        return Err(error.into());
    }

    let renamed = NewRepository {
        name: request.name.with_unique_suffix(),
        ..request
    };
    warn!(
        requested = %request.name,
        retry_as = %renamed.name,
        "repository name taken; retrying once under a new name"
    );
    client
        .create_repository(org, &renamed)
        .await
        .map_err(|error| match error {
            RemoteError::NameCollision { name } => ProvisioningError::Collision { name },
            other => other.into(),
        })
}
