//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::DEFAULT_BASE_URL;

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "DHAKIRA_API_URL";

/// Top-level dhakira configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhakiraConfig {
    /// Backend root URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Where the signed-in profile is kept.
    #[serde(default = "default_profile_path")]
    pub profile_path: PathBuf,
    /// Per-request timeout. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Multiple-choice questions per attempt.
    #[serde(default = "default_questions_per_quiz")]
    pub questions_per_quiz: u32,
    /// Date/event questions per attempt.
    #[serde(default = "default_events_questions")]
    pub events_questions: u32,
    /// Personalities per matching board.
    #[serde(default = "default_personality_questions")]
    pub personality_questions: u32,
    /// Delay before a multiple-choice question moves on.
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_ms: u64,
    /// Delay between revealed answer characters.
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
    /// Session list refresh period.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_profile_path() -> PathBuf {
    dirs_path()
        .map(|d| d.join("profile.json"))
        .unwrap_or_else(|| PathBuf::from("dhakira-profile.json"))
}
fn default_questions_per_quiz() -> u32 {
    5
}
fn default_events_questions() -> u32 {
    3
}
fn default_personality_questions() -> u32 {
    4
}
fn default_auto_advance_ms() -> u64 {
    2000
}
fn default_reveal_interval_ms() -> u64 {
    30
}
fn default_poll_interval_secs() -> u64 {
    30
}

impl Default for DhakiraConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            profile_path: default_profile_path(),
            request_timeout_secs: None,
            questions_per_quiz: default_questions_per_quiz(),
            events_questions: default_events_questions(),
            personality_questions: default_personality_questions(),
            auto_advance_ms: default_auto_advance_ms(),
            reveal_interval_ms: default_reveal_interval_ms(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl DhakiraConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn auto_advance(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `dhakira.toml` in the current directory
/// 2. `~/.config/dhakira/config.toml`
///
/// `DHAKIRA_API_URL` overrides the backend URL from any source.
pub fn load_config() -> Result<DhakiraConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DhakiraConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("dhakira.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DhakiraConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DhakiraConfig::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
        config.api_base_url = url;
    }

    config.api_base_url = resolve_env_vars(&config.api_base_url);
    let profile_path = config.profile_path.to_string_lossy().into_owned();
    if profile_path.contains("${") {
        config.profile_path = PathBuf::from(resolve_env_vars(&profile_path));
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("dhakira"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_DHAKIRA_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_DHAKIRA_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_DHAKIRA_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${brace"), "no_close_${brace");
        std::env::remove_var("_DHAKIRA_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = DhakiraConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.questions_per_quiz, 5);
        assert_eq!(config.events_questions, 3);
        assert_eq!(config.personality_questions, 4);
        assert_eq!(config.auto_advance(), Duration::from_millis(2000));
        assert_eq!(config.reveal_interval(), Duration::from_millis(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
api_base_url = "https://dhakira.example.dz"
request_timeout_secs = 20
questions_per_quiz = 10
"#;
        let config: DhakiraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_base_url, "https://dhakira.example.dz");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.questions_per_quiz, 10);
        assert_eq!(config.events_questions, 3);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config_from(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded_and_resolved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dhakira.toml");
        std::env::set_var("_DHAKIRA_TEST_DIR", dir.path());
        std::fs::write(
            &path,
            "profile_path = \"${_DHAKIRA_TEST_DIR}/profile.json\"\npoll_interval_secs = 5\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.profile_path, dir.path().join("profile.json"));
        assert_eq!(config.poll_interval_secs, 5);
        std::env::remove_var("_DHAKIRA_TEST_DIR");
    }

    #[test]
    fn bad_toml_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dhakira.toml");
        std::fs::write(&path, "questions_per_quiz = \"many\"").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
