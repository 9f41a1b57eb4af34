//! [`RepositoryClient`] over the GitHub REST v3 API.

use async_trait::async_trait;
use base64::Engine as _;
use provisioning::{
    BranchName, CommitSha, CommitSummary, FileWrite, GitRemote, NewPullRequest, NewRepository,
    OrgName, PullRequest, PullRequestNumber, RemoteError, RemoteFile, RepoName, RepoPath, RepoRef,
    RepositoryClient, RepositoryHandle, RepositorySummary, RevisionId, Timestamp,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::connector::AccessToken;

/// Repositories per page of an organization listing.
pub const REPOSITORIES_PER_PAGE: u32 = 50;

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const GIT_USERNAME: &str = "x-access-token";

/// Where the GitHub deployment lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubEndpoints {
    /// REST root, e.g. `https://api.github.com`.
    pub api_url: Url,
    /// Browser and git transport root, e.g. `https://github.com`.
    pub web_url: Url,
}

/// Authenticated GitHub client. One instance serves one operation.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    endpoints: GithubEndpoints,
    token: AccessToken,
}

impl GithubClient {
    pub fn new(
        endpoints: GithubEndpoints,
        token: AccessToken,
        user_agent: &str,
    ) -> Result<Self, RemoteError> {
        for base in [&endpoints.api_url, &endpoints.web_url] {
            if base.cannot_be_a_base() {
                return Err(RemoteError::InvalidResponse {
                    message: format!("{base} cannot be used as a base URL"),
                });
            }
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(|_| {
            RemoteError::Authentication {
                message: "access token contains characters not allowed in a header".to_string(),
            }
        })?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            endpoints,
            token,
        })
    }

    // Private helper methods

    /// `api_url` joined with `segments`, each percent-encoded on its own.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.endpoints.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_endpoint<'a>(&self, repo: &'a RepoRef, rest: &[&'a str]) -> Url {
        self.endpoint(
            ["repos", repo.owner.as_str(), repo.name.as_str()]
                .into_iter()
                .chain(rest.iter().copied()),
        )
    }

    fn contents_endpoint(&self, repo: &RepoRef, path: &RepoPath) -> Url {
        let mut segments = vec!["contents"];
        segments.extend(path.as_str().split('/'));
        self.repo_endpoint(repo, &segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "github request");
        self.http.request(method, url)
    }

    /// Sends `request` and decodes a 2xx body as `T`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, subject: &str) -> Result<T, RemoteError> {
        self.send_classified(request, subject, classify_failure).await
    }

    async fn send_classified<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        subject: &str,
        classify: fn(StatusCode, &str, &str) -> RemoteError,
    ) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(classify(status, &body, subject));
        }
        serde_json::from_str(&body).map_err(|e| RemoteError::InvalidResponse {
            message: format!("{subject}: {e}"),
        })
    }

    /// Sends `request`, ignoring any 2xx body.
    async fn send_unit(&self, request: RequestBuilder, subject: &str) -> Result<(), RemoteError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.map_err(transport)?;
        Err(classify_failure(status, &body, subject))
    }
}

#[async_trait]
impl RepositoryClient for GithubClient {
    async fn create_repository(
        &self,
        org: &OrgName,
        request: &NewRepository,
    ) -> Result<RepositoryHandle, RemoteError> {
        let body = CreateRepositoryBody {
            name: request.name.as_str(),
            description: &request.description,
            private: request.visibility.is_private(),
            has_issues: request.features.has_issues,
            has_projects: request.features.has_projects,
            has_wiki: request.features.has_wiki,
        };
        let url = self.endpoint(["orgs", org.as_str(), "repos"]);
        let created: RepositoryWire = self
            .send_classified(
                self.request(Method::POST, url).json(&body),
                request.name.as_str(),
                classify_creation_failure,
            )
            .await?;
        created.into_handle()
    }

    async fn read_file(
        &self,
        repo: &RepoRef,
        path: &RepoPath,
        git_ref: Option<&str>,
    ) -> Result<RemoteFile, RemoteError> {
        let mut url = self.contents_endpoint(repo, path);
        if let Some(git_ref) = git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        let subject = format!("{repo}/{path}");
        let file: ContentWire = self.send(self.request(Method::GET, url), &subject).await?;
        let encoded = file.content.unwrap_or_default();
        Ok(RemoteFile {
            content: decode_content(&encoded).map_err(|message| RemoteError::InvalidResponse {
                message: format!("{subject}: {message}"),
            })?,
            revision: revision(file.sha, &subject)?,
        })
    }

    async fn write_file(&self, repo: &RepoRef, write: &FileWrite) -> Result<RevisionId, RemoteError> {
        let body = PutContentBody {
            message: &write.message,
            content: base64::engine::general_purpose::STANDARD.encode(write.content.as_bytes()),
            sha: write.revision.as_ref().map(RevisionId::as_str),
            branch: write.branch.as_ref().map(BranchName::as_str),
        };
        let subject = format!("{repo}/{}", write.path);
        let url = self.contents_endpoint(repo, &write.path);
        let written: PutContentResponse = self
            .send(self.request(Method::PUT, url).json(&body), &subject)
            .await?;
        revision(written.content.sha, &subject)
    }

    async fn create_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
        from: &CommitSha,
    ) -> Result<(), RemoteError> {
        let body = CreateRefBody {
            git_ref: format!("refs/heads/{branch}"),
            sha: from.as_str(),
        };
        let url = self.repo_endpoint(repo, &["git", "refs"]);
        self.send_unit(self.request(Method::POST, url).json(&body), branch.as_str())
            .await
    }

    async fn read_branch_tip(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
    ) -> Result<CommitSha, RemoteError> {
        let mut segments = vec!["git", "ref", "heads"];
        segments.extend(branch.as_str().split('/'));
        let url = self.repo_endpoint(repo, &segments);
        let subject = format!("{repo}@{branch}");
        let reference: RefWire = self.send(self.request(Method::GET, url), &subject).await?;
        CommitSha::new(reference.object.sha).ok_or_else(|| RemoteError::InvalidResponse {
            message: format!("{subject}: empty commit sha"),
        })
    }

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        request: &NewPullRequest,
    ) -> Result<PullRequest, RemoteError> {
        let body = CreatePullBody {
            title: &request.title,
            head: request.head.as_str(),
            base: request.base.as_str(),
            body: &request.body,
        };
        let url = self.repo_endpoint(repo, &["pulls"]);
        let subject = repo.to_string();
        let pull: PullWire = self
            .send(self.request(Method::POST, url).json(&body), &subject)
            .await?;
        pull.into_domain()
    }

    async fn set_topics(&self, repo: &RepoRef, topics: &[String]) -> Result<(), RemoteError> {
        let url = self.repo_endpoint(repo, &["topics"]);
        let body = TopicsBody { names: topics };
        self.send_unit(self.request(Method::PUT, url).json(&body), &repo.to_string())
            .await
    }

    async fn list_repositories(
        &self,
        org: &OrgName,
        page: u32,
    ) -> Result<Vec<RepositorySummary>, RemoteError> {
        let mut url = self.endpoint(["orgs", org.as_str(), "repos"]);
        url.query_pairs_mut()
            .append_pair("sort", "created")
            .append_pair("direction", "desc")
            .append_pair("per_page", &REPOSITORIES_PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        let repos: Vec<RepositoryWire> = self
            .send(self.request(Method::GET, url), org.as_str())
            .await?;
        repos.into_iter().map(RepositoryWire::into_summary).collect()
    }

    async fn list_open_pull_requests(&self, repo: &RepoRef) -> Result<Vec<PullRequest>, RemoteError> {
        let mut url = self.repo_endpoint(repo, &["pulls"]);
        url.query_pairs_mut().append_pair("state", "open");
        let pulls: Vec<PullWire> = self
            .send(self.request(Method::GET, url), &repo.to_string())
            .await?;
        pulls.into_iter().map(PullWire::into_domain).collect()
    }

    async fn list_commits(&self, repo: &RepoRef) -> Result<Vec<CommitSummary>, RemoteError> {
        let url = self.repo_endpoint(repo, &["commits"]);
        let commits: Vec<CommitWire> = self
            .send(self.request(Method::GET, url), &repo.to_string())
            .await?;
        commits.into_iter().map(CommitWire::into_domain).collect()
    }

    fn git_remote(&self, repo: &RepoRef) -> Result<GitRemote, RemoteError> {
        let mut url = self.endpoints.web_url.clone();
        let repository = format!("{}.git", repo.name);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend([repo.owner.as_str(), repository.as_str()]);
        }
        url.set_username(GIT_USERNAME)
            .and_then(|()| url.set_password(Some(self.token.expose())))
            .map_err(|()| RemoteError::InvalidResponse {
                message: format!("cannot embed credentials in {}", self.endpoints.web_url),
            })?;
        Ok(GitRemote::new(url))
    }
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// Maps a non-2xx response to a [`RemoteError`]. `subject` names what was
/// being created or read.
pub fn classify_failure(status: StatusCode, body: &str, subject: &str) -> RemoteError {
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound {
            resource: subject.to_string(),
        },
        _ => RemoteError::Remote {
            status: status.as_u16(),
            message: error_message(body),
        },
    }
}

/// Like [`classify_failure`], but a 422 saying the name already exists is a
/// [`RemoteError::NameCollision`] on `name`. Only repository creation can
/// collide.
pub fn classify_creation_failure(status: StatusCode, body: &str, name: &str) -> RemoteError {
    if status == StatusCode::UNPROCESSABLE_ENTITY && body.to_ascii_lowercase().contains("already exists") {
        return RemoteError::NameCollision {
            name: name.to_string(),
        };
    }
    classify_failure(status, body, name)
}

/// The platform's `message`, with any per-field error messages appended.
fn error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return body.trim().to_string();
    };
    let details: Vec<String> = parsed
        .errors
        .into_iter()
        .filter_map(|e| e.message)
        .collect();
    match (parsed.message, details.is_empty()) {
        (Some(message), true) => message,
        (Some(message), false) => format!("{message}: {}", details.join("; ")),
        (None, _) => details.join("; "),
    }
}

fn transport(error: reqwest::Error) -> RemoteError {
    if error.is_decode() {
        RemoteError::InvalidResponse {
            message: error.to_string(),
        }
    } else {
        RemoteError::Transport {
            message: error.to_string(),
        }
    }
}

/// Decodes the contents API's base64, which is wrapped with newlines.
pub fn decode_content(encoded: &str) -> Result<String, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

fn revision(sha: String, subject: &str) -> Result<RevisionId, RemoteError> {
    RevisionId::new(sha).ok_or_else(|| RemoteError::InvalidResponse {
        message: format!("{subject}: empty revision"),
    })
}

fn invalid(what: &str) -> RemoteError {
    RemoteError::InvalidResponse {
        message: format!("missing {what}"),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CreateRepositoryBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    has_issues: bool,
    has_projects: bool,
    has_wiki: bool,
}

#[derive(Deserialize)]
struct RepositoryWire {
    name: String,
    full_name: String,
    html_url: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

impl RepositoryWire {
    fn into_handle(self) -> Result<RepositoryHandle, RemoteError> {
        Ok(RepositoryHandle {
            name: RepoName::new(self.name).ok_or_else(|| invalid("repository name"))?,
            full_name: self.full_name,
            html_url: self.html_url,
            default_branch: self.default_branch.and_then(BranchName::new),
        })
    }

    fn into_summary(self) -> Result<RepositorySummary, RemoteError> {
        Ok(RepositorySummary {
            name: RepoName::new(self.name).ok_or_else(|| invalid("repository name"))?,
            full_name: self.full_name,
            html_url: self.html_url,
            description: self.description,
            topics: self.topics,
            created_at: self.created_at,
        })
    }
}

#[derive(Deserialize)]
struct ContentWire {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutContentResponse {
    content: ContentWire,
}

#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Deserialize)]
struct RefWire {
    object: ObjectWire,
}

#[derive(Deserialize)]
struct ObjectWire {
    sha: String,
}

#[derive(Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct PullWire {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    html_url: String,
    head: BranchWire,
    base: BranchWire,
}

#[derive(Deserialize)]
struct BranchWire {
    #[serde(rename = "ref")]
    git_ref: String,
}

impl PullWire {
    fn into_domain(self) -> Result<PullRequest, RemoteError> {
        Ok(PullRequest {
            number: PullRequestNumber::new(self.number),
            title: self.title,
            body: self.body,
            state: self.state,
            html_url: self.html_url,
            head: BranchName::new(self.head.git_ref).ok_or_else(|| invalid("head ref"))?,
            base: BranchName::new(self.base.git_ref).ok_or_else(|| invalid("base ref"))?,
        })
    }
}

#[derive(Serialize)]
struct TopicsBody<'a> {
    names: &'a [String],
}

#[derive(Deserialize)]
struct CommitWire {
    sha: String,
    html_url: String,
    commit: CommitDetailWire,
}

#[derive(Deserialize)]
struct CommitDetailWire {
    message: String,
    #[serde(default)]
    author: Option<CommitAuthorWire>,
}

#[derive(Deserialize)]
struct CommitAuthorWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<Timestamp>,
}

impl CommitWire {
    fn into_domain(self) -> Result<CommitSummary, RemoteError> {
        let (author_name, authored_at) = match self.commit.author {
            Some(author) => (author.name, author.date),
            None => (None, None),
        };
        Ok(CommitSummary {
            sha: CommitSha::new(self.sha).ok_or_else(|| invalid("commit sha"))?,
            message: self.commit.message,
            author_name,
            authored_at,
            html_url: self.html_url,
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}
