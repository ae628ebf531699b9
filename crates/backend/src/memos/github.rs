use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mapmemo_shared::models::CityMemos;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{default_memos, MemoStore, MemoStoreError};
use crate::config::GitHubConfig;

const USER_AGENT: &str = "mapmemo-backend";

/// Memo document committed to a GitHub repository through the contents API.
pub struct GitHubStore {
    http: reqwest::Client,
    config: GitHubConfig,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

fn commit_message(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("Update memos ({})", now.format("%Y-%m-%dT%H:%M"))
}

/// The contents API wraps base64 at 60 columns.
fn decode_content(content: &str) -> Result<CityMemos, MemoStoreError> {
    let compact: String = content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| MemoStoreError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| MemoStoreError::Decode(e.to_string()))
}

impl GitHubStore {
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn token(&self) -> Result<&str, MemoStoreError> {
        self.config
            .token
            .as_deref()
            .ok_or(MemoStoreError::NotConfigured)
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.file_path
        )
    }

    /// Current file, or `None` when the request is rejected (usually because
    /// the file does not exist yet).
    async fn fetch(&self, token: &str) -> Result<Option<ContentsResponse>, MemoStoreError> {
        let response = self
            .http
            .get(format!("{}?ref={}", self.contents_url(), self.config.branch))
            .header("Authorization", format!("token {token}"))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "memo file not readable");
            return Ok(None);
        }
        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|e| MemoStoreError::Decode(e.to_string()))?;
        Ok(Some(contents))
    }
}

#[async_trait]
impl MemoStore for GitHubStore {
    #[instrument(skip(self), fields(repo = %self.config.repo))]
    async fn load(&self) -> Result<CityMemos, MemoStoreError> {
        let token = self.token()?;
        match self.fetch(token).await? {
            Some(file) => decode_content(&file.content),
            None => Ok(default_memos()),
        }
    }

    #[instrument(skip(self, memos), fields(repo = %self.config.repo))]
    async fn save(&self, memos: &CityMemos) -> Result<(), MemoStoreError> {
        let token = self.token()?;
        let sha = self.fetch(token).await?.map(|f| f.sha);

        let json = serde_json::to_string_pretty(memos)
            .map_err(|e| MemoStoreError::Decode(e.to_string()))?;
        let body = PutContents {
            message: commit_message(chrono::Utc::now()),
            content: STANDARD.encode(json),
            branch: &self.config.branch,
            sha,
        };

        let response = self
            .http
            .put(self.contents_url())
            .header("Authorization", format!("token {token}"))
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("memo file committed");
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(MemoStoreError::Conflict);
        }
        Err(MemoStoreError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}
