//! `project-repos` command line entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `project-repos.toml` and validate it into
//!    `ServiceSettings`; read the access token from `GITHUB_TOKEN`.
//! 2. **Wire observability**: configure `tracing-subscriber` on stderr and,
//!    when an OTLP endpoint is configured, an OpenTelemetry exporter. All
//!    `tracing` spans and structured events emitted by every crate in the
//!    workspace flow through this layer.
//! 3. **Construct infrastructure**: a `GithubConnector` and a
//!    `GitWorkspaceProvider`, injected into a `ProjectService`.
//! 4. **Run one operation**: the subcommand's result is printed to stdout as
//!    JSON. A failed operation prints an `OperationFailure` to stderr and
//!    exits with status 1.

mod config;
mod input;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use github::{GithubConnector, StaticTokenSource};
use operations::{Capabilities, ProjectService, ProvisionRequest};
use provisioning::{KeyIssuer, ProvisioningError, RandomKeyIssuer, RepositoryConnector, WorkspaceProvider};
use serde::Serialize;
use tracing::error;

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

const TOKEN_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Parser)]
#[command(name = "project-repos", version, about = "Provision, fork, and sync project repositories")]
struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "PROJECT_REPOS_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a project repository and seed it.
    Provision {
        name: String,
        /// Project data as JSON, or `@path` to a JSON file.
        #[arg(long)]
        data: String,
        /// Comma-separated theme; each part becomes a topic.
        #[arg(long, default_value = "")]
        theme: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Copy a repository's current project data into a new repository.
    Fork { source: String },
    /// Fork a repository with its full history.
    ForkHistory { source: String },
    /// Open a pull request on a fork's upstream with new project data.
    Propose {
        fork: String,
        #[arg(long)]
        data: String,
    },
    /// Overwrite a repository's project data.
    Edit {
        repo: String,
        #[arg(long)]
        data: String,
        #[arg(long, short)]
        message: String,
    },
    /// List the organization's repositories, newest first.
    ListRepos {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List a repository's commits.
    Commits { repo: String },
    /// Print a repository's project data.
    ProjectData {
        repo: String,
        /// Branch or commit to read at.
        #[arg(long = "ref")]
        git_ref: Option<String>,
    },
    /// List open pull requests with their project data.
    PullRequests { repo: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let _telemetry = telemetry::init(config.log_format)?;

    let token = std::env::var(TOKEN_VAR).with_context(|| format!("{TOKEN_VAR} is not set"))?;
    let connector: Arc<dyn RepositoryConnector> = Arc::new(GithubConnector::new(
        config.endpoints.clone(),
        Arc::new(StaticTokenSource::new(token)),
    ));
    let keys: Arc<dyn KeyIssuer> = Arc::new(RandomKeyIssuer);
    let workspaces: Arc<dyn WorkspaceProvider> = Arc::new(config.workspaces());
    let service = ProjectService::new(
        Capabilities::new(config.settings.clone(), connector, keys),
        workspaces,
    );

    run(&service, cli.command).await
}

async fn run(service: &ProjectService, command: Command) -> Result<ExitCode> {
    match command {
        Command::Provision {
            name,
            data,
            theme,
            description,
        } => {
            let request = ProvisionRequest {
                name,
                project_data: input::project_document(&data)?,
                theme,
                description,
            };
            emit(service.provision(request).await)
        }
        Command::Fork { source } => emit(service.fork_data(&source).await),
        Command::ForkHistory { source } => emit(service.fork_history(&source).await),
        Command::Propose { fork, data } => {
            let data = input::project_document(&data)?;
            emit(service.propose_upstream_change(&fork, data).await)
        }
        Command::Edit {
            repo,
            data,
            message,
        } => {
            let data = input::project_document(&data)?;
            emit(service.edit_project(&repo, data, &message).await)
        }
        Command::ListRepos { page } => emit(service.list_repositories(page).await),
        Command::Commits { repo } => emit(service.list_commits(&repo).await),
        Command::ProjectData { repo, git_ref } => {
            emit(service.read_project_data(&repo, git_ref.as_deref()).await)
        }
        Command::PullRequests { repo } => emit(service.list_open_pull_requests(&repo).await),
    }
}

/// Prints the result to stdout, or the failure to stderr with exit code 1.
fn emit<T: Serialize>(result: Result<T, ProvisioningError>) -> Result<ExitCode> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            error!(kind = ?failure.kind(), error = %failure, "operation failed");
            eprintln!("{}", serde_json::to_string_pretty(&failure.to_failure())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
