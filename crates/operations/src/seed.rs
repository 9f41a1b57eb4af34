//! Seeding a freshly created repository with its two required files.

use provisioning::{
    FileWrite, ProvisioningError, RepoRef, RepositoryClient, METADATA_FILE, PROJECT_DATA_FILE,
};
use tracing::warn;

/// Writes `projectData.json` and `metaData.json` concurrently.
///
/// Both writes are always driven to completion before the first failure (if
/// any) is returned. A failure leaves the repository in place: nothing is
/// deleted, the orphan is logged for out-of-band reconciliation.
pub(crate) async fn seed_repository(
    client: &dyn RepositoryClient,
    repo: &RepoRef,
    project_document: String,
    metadata_document: String,
) -> Result<(), ProvisioningError> {
    let project = FileWrite::seed(PROJECT_DATA_FILE, project_document);
    let metadata = FileWrite::seed(METADATA_FILE, metadata_document);

    let (project_written, metadata_written) = tokio::join!(
        client.write_file(repo, &project),
        client.write_file(repo, &metadata),
    );

    for (file, outcome) in [
        (PROJECT_DATA_FILE, project_written),
        (METADATA_FILE, metadata_written),
    ] {
        if let Err(error) = outcome {
            warn!(
                repository = %repo,
                file,
                %error,
                "seed write failed; repository remains without its complete contents"
            );
            return Err(error.into());
        }
    }
    Ok(())
}
