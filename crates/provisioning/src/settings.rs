//! Explicit configuration handed to every component constructor.
//!
//! Nothing in the workspace reads ambient configuration: the binary loads and
//! validates its file into a [`ServiceSettings`] and passes it down.

use url::Url;

use crate::{BranchName, OrgName, RepoName, RepoRef};

/// Identity recorded on commits made inside a local clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "Project Repos Bot".to_string(),
            email: "bot@project-repos.invalid".to_string(),
        }
    }
}

/// Settings shared by every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Organization that owns every project repository.
    pub org: OrgName,
    /// Browser base URL of the platform, used for provenance URLs.
    pub web_url: Url,
    /// Branch treated as the default branch of every repository.
    pub default_branch: BranchName,
    /// Description given to provisioned repositories when the caller has none.
    pub default_description: String,
    pub bot_identity: CommitIdentity,
}

impl ServiceSettings {
    /// Settings with the default description and bot identity.
    pub fn new(org: OrgName, web_url: Url, default_branch: BranchName) -> Self {
        Self {
            org,
            web_url,
            default_branch,
            default_description: "Project repository".to_string(),
            bot_identity: CommitIdentity::default(),
        }
    }

    /// Coordinates of a repository owned by the configured organization.
    pub fn repo(&self, name: RepoName) -> RepoRef {
        RepoRef::new(self.org.clone(), name)
    }

    /// Fully qualified URL recorded as `forkedFrom` on forks of `name`.
    pub fn provenance_url(&self, name: &RepoName) -> String {
        self.repo(name.clone()).web_url(&self.web_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_urls_point_at_the_org_repository() {
        let settings = ServiceSettings::new(
            OrgName::new("music").unwrap(),
            Url::parse("https://github.com").unwrap(),
            BranchName::new("main").unwrap(),
        );
        assert_eq!(
            settings.provenance_url(&RepoName::new("song").unwrap()),
            "https://github.com/music/song"
        );
    }
}
