use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoBackend {
    GitHub,
    Redb,
}

/// Where the GitHub-backed memo store commits its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
    pub file_path: String,
    pub branch: String,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub assets_dir: PathBuf,
    pub db_path: PathBuf,
    pub memo_backend: MemoBackend,
    pub github: GitHubConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = match get("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "invalid PORT, using 3000");
                3000
            }
            None => 3000,
        };

        let memo_backend = match get("MEMO_BACKEND").as_deref() {
            Some("redb") => MemoBackend::Redb,
            Some("github") | None => MemoBackend::GitHub,
            Some(other) => {
                tracing::warn!(backend = other, "unknown MEMO_BACKEND, using github");
                MemoBackend::GitHub
            }
        };

        Config {
            port,
            assets_dir: PathBuf::from(or("ASSETS_DIR", "assets")),
            db_path: PathBuf::from(or("DB_PATH", "data/memos.redb")),
            memo_backend,
            github: GitHubConfig {
                token: get("GITHUB_TOKEN").filter(|t| !t.is_empty()),
                owner: or("REPO_OWNER", ""),
                repo: or("REPO_NAME", ""),
                file_path: or("MEMO_FILE_PATH", "data/memos.json"),
                branch: or("MEMO_BRANCH", "master"),
                api_url: or("GITHUB_API_URL", "https://api.github.com"),
            },
        }
    }
}
