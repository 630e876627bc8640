//! Configuration loading (.env + story.yml)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.storyscript.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const STORY_YML: &str = "story.yml";

/// Project directory (where .env and story.yml are)
pub fn project_dir() -> PathBuf {
    // Check STORY_PROJECT_DIR env first
    if let Ok(dir) = std::env::var("STORY_PROJECT_DIR") {
        return PathBuf::from(dir);
    }
    // Default to current directory
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Load .env file if the project has one
pub fn load_env() -> Result<()> {
    let env_path = project_dir().join(".env");
    if !env_path.is_file() {
        return Ok(());
    }
    dotenvy::from_path(&env_path)
        .with_context(|| format!("Failed to load .env from {:?}", env_path))?;
    Ok(())
}

/// Connection settings for the Storyscript Cloud API
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Settings {
    /// Read settings from the process environment (after `load_env`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("STORY_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let access_token = lookup("STORY_ACCESS_TOKEN").filter(|v| !v.trim().is_empty());

        let timeout_secs = match lookup("STORY_HTTP_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("STORY_HTTP_TIMEOUT must be a number of seconds, got {:?}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            access_token,
            timeout_secs,
        })
    }
}

// ============ story.yml ============

/// Find story.yml in `start` or any of its ancestors
pub fn find_story_yml(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(STORY_YML))
        .find(|candidate| candidate.is_file())
}

/// Extract `app_name` from story.yml contents
pub fn parse_app_name(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let value = line.trim().strip_prefix("app_name:")?;
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// App name from the story.yml nearest to the project directory
pub fn app_from_story_yml() -> Result<Option<String>> {
    let Some(path) = find_story_yml(&project_dir()) else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read story.yml from {:?}", path))?;
    Ok(parse_app_name(&content))
}

/// Save story.yml for a freshly created app
pub fn write_story_yml(dir: &Path, app_name: &str) -> Result<PathBuf> {
    let path = dir.join(STORY_YML);
    std::fs::write(&path, format!("app_name: {}\n", app_name))
        .with_context(|| format!("Failed to write story.yml to {:?}", path))?;
    Ok(path)
}
