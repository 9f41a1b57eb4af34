//! Authentication and per-operation client construction.

use std::sync::Arc;

use async_trait::async_trait;
use provisioning::{RemoteError, RepositoryClient, RepositoryConnector};
use tracing::debug;

use crate::client::{GithubClient, GithubEndpoints};

/// `User-Agent` sent when the caller does not configure one.
pub const DEFAULT_USER_AGENT: &str = concat!("project-repos/", env!("CARGO_PKG_VERSION"));

/// A GitHub access token. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Supplies the token each new client authenticates with.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<AccessToken, RemoteError>;
}

/// A pre-issued token, e.g. from `GITHUB_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: AccessToken,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<AccessToken, RemoteError> {
        if self.token.expose().trim().is_empty() {
            return Err(RemoteError::Authentication {
                message: "no GitHub access token configured".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}

/// Builds a fresh [`GithubClient`] for every operation.
pub struct GithubConnector {
    endpoints: GithubEndpoints,
    tokens: Arc<dyn TokenSource>,
    user_agent: String,
}

impl GithubConnector {
    pub fn new(endpoints: GithubEndpoints, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            endpoints,
            tokens,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait]
impl RepositoryConnector for GithubConnector {
    async fn connect(&self) -> Result<Arc<dyn RepositoryClient>, RemoteError> {
        let token = self.tokens.token().await?;
        let client = GithubClient::new(self.endpoints.clone(), token, &self.user_agent)?;
        debug!(api = %self.endpoints.api_url, "github client ready");
        Ok(Arc::new(client))
    }
}
