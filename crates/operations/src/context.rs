//! Capabilities shared by every operation component.

use std::sync::Arc;

use provisioning::{
    KeyIssuer, ProvisioningError, RepoName, RepositoryClient, RepositoryConnector, ServiceSettings,
};

/// Explicit capability bundle passed to every component constructor.
///
/// Cloning is cheap; components keep their own copy and never share
/// mutable state.
#[derive(Clone)]
pub struct Capabilities {
    pub settings: Arc<ServiceSettings>,
    pub connector: Arc<dyn RepositoryConnector>,
    pub keys: Arc<dyn KeyIssuer>,
}

impl Capabilities {
    pub fn new(
        settings: ServiceSettings,
        connector: Arc<dyn RepositoryConnector>,
        keys: Arc<dyn KeyIssuer>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            connector,
            keys,
        }
    }

    /// Authenticates and returns a client owned by the calling operation.
    pub(crate) async fn connect(&self) -> Result<Arc<dyn RepositoryClient>, ProvisioningError> {
        Ok(self.connector.connect().await?)
    }
}

/// Validates a caller-supplied repository name.
pub(crate) fn required_name(raw: &str, what: &str) -> Result<RepoName, ProvisioningError> {
    RepoName::new(raw.trim())
        .ok_or_else(|| ProvisioningError::precondition(format!("{what} is required")))
}
