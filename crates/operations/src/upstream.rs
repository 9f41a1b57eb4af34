//! Proposing a fork's project data back to the repository it came from.

use provisioning::{
    BranchName, FileWrite, NewPullRequest, ProjectData, ProvisioningError, PullRequest,
    RemoteError, RemoteFile, RepoPath, RepoRef, RevisionId, Timestamp, PROJECT_DATA_FILE,
};
use tracing::{debug, info, instrument};

use crate::context::{required_name, Capabilities};
use crate::fork::read_metadata;

const PULL_REQUEST_TITLE: &str = "Update projectData.json from fork";
const WRITE_MESSAGE: &str = "Update projectData.json from fork";

pub struct UpstreamSync {
    caps: Capabilities,
}

impl UpstreamSync {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// Opens a pull request on the fork's upstream that replaces its
    /// `projectData.json` with `project_data`.
    ///
    /// The upstream comes from the fork's `forkedFrom` metadata. A repository
    /// without one is not a fork and fails before any write. The change lands
    /// on a fresh `pr-from-fork-<millis>` branch cut from the upstream's
    /// default branch.
    #[instrument(skip_all, fields(fork = %fork))]
    pub async fn propose(
        &self,
        fork: &str,
        project_data: ProjectData,
    ) -> Result<PullRequest, ProvisioningError> {
        let fork = required_name(fork, "fork repository name")?;
        if project_data.is_null() {
            return Err(ProvisioningError::precondition("project data is required"));
        }
        let settings = &self.caps.settings;
        let client = self.caps.connect().await?;

        let fork_repo = settings.repo(fork);
        let metadata = read_metadata(client.as_ref(), &fork_repo).await?;
        let Some(upstream_url) = metadata.upstream_url() else {
            return Err(ProvisioningError::precondition(format!(
                "repository {fork_repo} is not a fork"
            )));
        };
        let upstream = RepoRef::from_url(upstream_url).ok_or_else(|| {
            ProvisioningError::precondition(format!("invalid forkedFrom URL: {upstream_url}"))
        })?;

        let base = settings.default_branch.clone();
        let tip = client.read_branch_tip(&upstream, &base).await?;
        let head = BranchName::for_upstream_proposal(Timestamp::now().as_datetime());
        client.create_branch(&upstream, &head, &tip).await?;
        debug!(%upstream, branch = %head, from = %tip, "proposal branch created");

        let path = RepoPath::root_file(PROJECT_DATA_FILE);
        let revision = existing_revision(
            client.read_file(&upstream, &path, Some(head.as_str())).await,
        )?;
        let write = FileWrite::create(path, project_data.to_document(), WRITE_MESSAGE)
            .on_branch(head.clone())
            .replacing(revision);
        client.write_file(&upstream, &write).await?;

        let request = NewPullRequest {
            title: PULL_REQUEST_TITLE.to_string(),
            head,
            base,
            body: format!("Automated PR to update projectData.json from fork {}", fork_repo.name),
        };
        let pull = client.create_pull_request(&upstream, &request).await?;
        info!(%upstream, number = %pull.number, url = %pull.html_url, "upstream pull request opened");
        Ok(pull)
    }
}

/// Revision marker of an existing file; a missing file is not an error.
fn existing_revision(
    read: Result<RemoteFile, RemoteError>,
) -> Result<Option<RevisionId>, ProvisioningError> {
    match read {
        Ok(file) => Ok(Some(file.revision)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, Harness};
    use pretty_assertions::assert_eq;
    use provisioning::{FailureKind, METADATA_FILE};
    use serde_json::json;

    const FORK_META: &str = r#"{"createdAt":"2024-01-01T00:00:00.000Z","theme":"jazz","hashedKey":"abc","forkedFrom":"https://host/org/base"}"#;

    fn harness_with_fork() -> Harness {
        let harness = Harness::new();
        harness.platform.add_repository("music/fork-x");
        harness.platform.put_file("music/fork-x", "main", METADATA_FILE, FORK_META);
        harness.platform.add_repository("org/base");
        harness
    }

    fn data() -> ProjectData {
        ProjectData::new(json!({"notes": ["G"]}))
    }

    #[tokio::test]
    async fn opens_one_pull_request_against_the_upstream_default_branch() {
        let harness = harness_with_fork();
        harness.platform.put_file("org/base", "main", PROJECT_DATA_FILE, r#"{"notes":[]}"#);
        let sync = UpstreamSync::new(harness.caps());

        let pull = sync.propose("fork-x", data()).await.expect("proposal succeeds");

        assert_eq!(pull.base.as_str(), "main");
        assert!(pull.head.as_str().starts_with("pr-from-fork-"));
        assert_eq!(pull.title, PULL_REQUEST_TITLE);
        assert_eq!(
            pull.body.as_deref(),
            Some("Automated PR to update projectData.json from fork fork-x")
        );
        assert_eq!(
            harness.platform.file("org/base", pull.head.as_str(), PROJECT_DATA_FILE).as_deref(),
            Some(r#"{"notes":["G"]}"#)
        );
        assert_eq!(
            harness.platform.file("org/base", "main", PROJECT_DATA_FILE).as_deref(),
            Some(r#"{"notes":[]}"#)
        );

        let writes = harness.platform.writes();
        assert_eq!(writes.len(), 3);
        assert!(matches!(&writes[0], Call::CreateBranch { repo, .. } if repo == "org/base"));
        assert!(matches!(
            &writes[1],
            Call::WriteFile { repo, revision: Some(_), .. } if repo == "org/base"
        ));
        assert!(matches!(&writes[2], Call::CreatePullRequest { repo, .. } if repo == "org/base"));
        assert_eq!(harness.platform.pull_requests("org/base").len(), 1);
    }

    #[tokio::test]
    async fn missing_upstream_file_is_created_without_a_revision() {
        let harness = harness_with_fork();
        let sync = UpstreamSync::new(harness.caps());

        let pull = sync.propose("fork-x", data()).await.unwrap();

        assert!(harness
            .platform
            .writes()
            .iter()
            .any(|c| matches!(c, Call::WriteFile { revision: None, .. })));
        assert!(harness
            .platform
            .file("org/base", pull.head.as_str(), PROJECT_DATA_FILE)
            .is_some());
    }

    #[tokio::test]
    async fn non_fork_fails_without_writes() {
        let harness = Harness::new();
        harness.platform.add_repository("music/original");
        harness.platform.put_file(
            "music/original",
            "main",
            METADATA_FILE,
            r#"{"theme":"jazz","hashedKey":"abc"}"#,
        );
        let sync = UpstreamSync::new(harness.caps());

        let err = sync.propose("original", data()).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Precondition);
        assert!(err.to_string().contains("not a fork"));
        assert!(harness.platform.writes().is_empty());
    }

    #[tokio::test]
    async fn malformed_provenance_is_a_precondition_failure() {
        let harness = Harness::new();
        harness.platform.add_repository("music/fork-y");
        harness.platform.put_file(
            "music/fork-y",
            "main",
            METADATA_FILE,
            r#"{"forkedFrom":"music-project"}"#,
        );
        let sync = UpstreamSync::new(harness.caps());

        let err = sync.propose("fork-y", data()).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Precondition);
        assert!(harness.platform.writes().is_empty());
    }

    #[tokio::test]
    async fn metadata_read_failure_aborts_before_any_write() {
        let harness = harness_with_fork();
        harness.platform.fail_next("read_file", RemoteError::Remote {
            status: 500,
            message: "boom".into(),
        });
        let sync = UpstreamSync::new(harness.caps());

        let err = sync.propose("fork-x", data()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Remote);
        assert!(harness.platform.writes().is_empty());
    }

    #[test]
    fn only_not_found_is_tolerated_when_reading_the_branch_file() {
        assert_eq!(
            existing_revision(Err(RemoteError::NotFound { resource: "x".into() })).unwrap(),
            None
        );
        let err = existing_revision(Err(RemoteError::Remote {
            status: 500,
            message: "boom".into(),
        }))
        .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Remote);
    }
}
