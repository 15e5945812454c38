//! GitHub REST v3 access used by the documentation and bot pipelines.
//!
//! Endpoints used:
//!   * GET  /repos/{owner}/{repo}/wiki/pages
//!   * GET  /repos/{owner}/{repo}/contents/{path}?ref={ref}
//!   * POST /repos/{owner}/{repo}/issues/{number}/comments
//!   * POST /repos/{owner}/{repo}/issues/{number}/labels

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{
    GitContextEngineConfigError, GitContextEngineError, GitContextEngineProviderError,
    GitContextEngineResult,
};

const USER_AGENT: &str = "pr-scribe";

/// Settings for [`GitHubClient`], usually read from the Actions environment.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base, e.g. `https://api.github.com`.
    pub base_api: String,
    pub token: Option<String>,
    /// `owner/repo`.
    pub repository: Option<String>,
}

impl GitHubConfig {
    /// Reads `GITHUB_API_URL`, `GITHUB_TOKEN` and `GITHUB_REPOSITORY`.
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            base_api: non_empty("GITHUB_API_URL").unwrap_or_else(|| "https://api.github.com".into()),
            token: non_empty("GITHUB_TOKEN"),
            repository: non_empty("GITHUB_REPOSITORY"),
        }
    }
}

/// GitHub HTTP client bound to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Builds a client; fails when the token or repository slug is missing.
    pub fn from_config(cfg: GitHubConfig) -> GitContextEngineResult<Self> {
        let token = cfg.token.ok_or(GitContextEngineConfigError::MissingToken)?;
        let slug = cfg.repository.unwrap_or_default();
        let (owner, repo) = split_owner_repo(&slug)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        debug!(base_api = %cfg.base_api, %owner, %repo, "GitHubClient created");
        Ok(Self {
            http,
            base_api: cfg.base_api.trim_end_matches('/').to_string(),
            token,
            owner,
            repo,
        })
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_api, self.owner, self.repo, tail)
    }

    /// Titles of existing wiki pages. A repository without a wiki (404)
    /// yields an empty list.
    pub async fn list_wiki_pages(&self) -> GitContextEngineResult<Vec<String>> {
        let url = self.repo_url("wiki/pages");
        debug!("GitHub list_wiki_pages: {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!("wiki not found, treating as empty");
            return Ok(Vec::new());
        }

        let pages: Vec<WikiPage> = resp.error_for_status()?.json().await?;
        let titles: Vec<String> = pages.into_iter().map(|p| p.title).collect();
        info!(count = titles.len(), "fetched wiki page titles");
        Ok(titles)
    }

    /// Raw file contents at `git_ref`; `None` when the path does not exist there.
    pub async fn file_at_ref(
        &self,
        repo_relative_path: &str,
        git_ref: &str,
    ) -> GitContextEngineResult<Option<String>> {
        if repo_relative_path.starts_with('/') || repo_relative_path.split('/').any(|s| s == "..") {
            return Err(GitContextEngineError::Validation(format!(
                "refusing non-relative path '{repo_relative_path}'"
            )));
        }
        let encoded: Vec<String> = repo_relative_path
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        let url = self.repo_url(&format!("contents/{}", encoded.join("/")));
        debug!("GitHub file_at_ref: url={}, ref={}", url, git_ref);

        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!("GitHub file not found at given ref");
            return Ok(None);
        }

        let text = resp.error_for_status()?.text().await?;
        Ok(Some(text))
    }

    /// Posts a markdown comment on an issue or pull request.
    pub async fn post_issue_comment(&self, number: u64, body: &str) -> GitContextEngineResult<()> {
        let url = self.repo_url(&format!("issues/{number}/comments"));
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&CommentBody { body })
            .send()
            .await?;
        ensure_success(resp.status())?;
        info!(number, chars = body.len(), "posted PR comment");
        Ok(())
    }

    /// Adds labels to an issue or pull request.
    pub async fn add_labels(&self, number: u64, labels: &[&str]) -> GitContextEngineResult<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let url = self.repo_url(&format!("issues/{number}/labels"));
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&LabelsBody { labels })
            .send()
            .await?;
        if let Err(e) = ensure_success(resp.status()) {
            warn!(number, ?labels, error = %e, "adding labels failed");
            return Err(e);
        }
        info!(number, ?labels, "labels added");
        Ok(())
    }
}

fn ensure_success(status: StatusCode) -> GitContextEngineResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(GitContextEngineProviderError::from_status(status.as_u16()).into())
    }
}

/// Splits `owner/repo`.
fn split_owner_repo(project: &str) -> GitContextEngineResult<(String, String)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitContextEngineConfigError::InvalidRepository(project.to_string()).into());
    }

    Ok((owner.to_string(), repo.to_string()))
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    title: String,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct LabelsBody<'a> {
    labels: &'a [&'a str],
}
