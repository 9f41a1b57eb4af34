//! Saving new project data over a repository's current document.

use provisioning::{
    FileWrite, ProjectData, ProvisioningError, RepoPath, RevisionId, PROJECT_DATA_FILE,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::context::{required_name, Capabilities};

/// Result of [`ProjectEditor::edit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEdit {
    /// Revision marker the document was written over.
    pub previous: RevisionId,
    pub revision: RevisionId,
}

pub struct ProjectEditor {
    caps: Capabilities,
}

impl ProjectEditor {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// Overwrites `projectData.json` on the default branch.
    ///
    /// The current revision marker is read first and sent with the write, so
    /// a concurrent change between the two surfaces as a remote failure.
    /// Callers are expected to have verified the repository secret.
    #[instrument(skip(self, project_data))]
    pub async fn edit(
        &self,
        repo: &str,
        project_data: ProjectData,
        message: &str,
    ) -> Result<ProjectEdit, ProvisioningError> {
        let repo = self.caps.settings.repo(required_name(repo, "repository name")?);
        if project_data.is_null() {
            return Err(ProvisioningError::precondition("project data is required"));
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(ProvisioningError::precondition("commit message is required"));
        }

        let client = self.caps.connect().await?;
        let path = RepoPath::root_file(PROJECT_DATA_FILE);
        let current = client.read_file(&repo, &path, None).await?;
        let write = FileWrite::create(path, project_data.to_document(), message)
            .replacing(Some(current.revision.clone()));
        let revision = client.write_file(&repo, &write).await?;

        info!(%repo, %revision, "project data saved");
        Ok(ProjectEdit {
            previous: current.revision,
            revision,
        })
    }
}
