//! `project-repos.toml` loading and validation.
//!
//! The file is the only configuration source apart from the access token,
//! which is read from `GITHUB_TOKEN` and never from disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git_workspace::GitWorkspaceProvider;
use github::GithubEndpoints;
use provisioning::{BranchName, CommitIdentity, OrgName, ServiceSettings};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "project-repos.toml";

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_WEB_URL: &str = "https://github.com";

/// Output format of the stderr log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// The file as written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub org: String,
    #[serde(default)]
    pub api_url: Option<Url>,
    #[serde(default)]
    pub web_url: Option<Url>,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// Description for provisioned repositories that are given none.
    #[serde(default)]
    pub description: Option<String>,
    /// Parent of the per-clone scratch directories. Defaults to a
    /// `project-repos` directory under the system temp dir.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    #[serde(default)]
    pub bot_name: Option<String>,
    #[serde(default)]
    pub bot_email: Option<String>,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Validated configuration, ready to build components from.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: ServiceSettings,
    pub endpoints: GithubEndpoints,
    pub scratch_root: PathBuf,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(raw)?;
        file.validate()
    }

    pub fn workspaces(&self) -> GitWorkspaceProvider {
        GitWorkspaceProvider::new(&self.scratch_root)
    }
}

impl FileConfig {
    pub fn validate(self) -> Result<AppConfig> {
        let Some(org) = OrgName::new(self.org.trim()) else {
            bail!("`org` must not be empty");
        };
        let Some(branch) = BranchName::new(self.default_branch.trim()) else {
            bail!("`default_branch` must not be empty");
        };
        let api_url = http_url("api_url", self.api_url, DEFAULT_API_URL)?;
        let web_url = http_url("web_url", self.web_url, DEFAULT_WEB_URL)?;

        let mut settings = ServiceSettings::new(org, web_url.clone(), branch);
        if let Some(description) = self.description.filter(|d| !d.trim().is_empty()) {
            settings.default_description = description;
        }
        let defaults = CommitIdentity::default();
        settings.bot_identity = CommitIdentity {
            name: non_blank("bot_name", self.bot_name)?.unwrap_or(defaults.name),
            email: non_blank("bot_email", self.bot_email)?.unwrap_or(defaults.email),
        };

        Ok(AppConfig {
            settings,
            endpoints: GithubEndpoints { api_url, web_url },
            scratch_root: self
                .scratch_dir
                .unwrap_or_else(|| std::env::temp_dir().join("project-repos")),
            log_format: self.log_format,
        })
    }
}

fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(value) if value.trim().is_empty() => bail!("`{field}` must not be blank"),
        other => Ok(other),
    }
}

fn http_url(field: &str, configured: Option<Url>, default: &str) -> Result<Url> {
    let url = match configured {
        Some(url) => url,
        None => Url::parse(default)?,
    };
    if !matches!(url.scheme(), "http" | "https") {
        bail!("`{field}` must be an http(s) URL, got {url}");
    }
    Ok(url)
}
