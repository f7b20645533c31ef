use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "student";

/// How a write is made visible to the searches that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Visibility {
    /// `refresh=true` on every write.
    Refresh,
    /// `refresh=wait_for` on every write.
    WaitFor,
    /// No refresh parameter; sleep after each write.
    Delay { millis: u64 },
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Refresh
    }
}

impl Visibility {
    /// Value of the `refresh` query parameter for writes, if any.
    pub fn refresh_param(&self) -> Option<&'static str> {
        match self {
            Visibility::Refresh => Some("true"),
            Visibility::WaitFor => Some("wait_for"),
            Visibility::Delay { .. } => None,
        }
    }

    pub fn delay(&self) -> Option<Duration> {
        match self {
            Visibility::Delay { millis } => Some(Duration::from_millis(*millis)),
            _ => None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: default_base_url(),
            index: default_index(),
            timeout_secs: default_timeout_secs(),
            visibility: Visibility::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load `{dir}/search.json` if present, otherwise defaults, then apply
    /// `STUDENT_SEARCH_URL` / `STUDENT_SEARCH_INDEX` overrides.
    pub fn load_or_default(dir: &Path) -> Self {
        let config_json = dir.join("search.json");
        let mut config = ClientConfig::default();

        if config_json.exists() {
            match std::fs::read_to_string(&config_json) {
                Ok(content) => match serde_json::from_str::<ClientConfig>(&content) {
                    Ok(loaded) => {
                        tracing::info!(
                            "Loaded client config: base_url={}, index={}",
                            loaded.base_url,
                            loaded.index
                        );
                        config = loaded;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse search.json: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read search.json: {}, using defaults", e);
                }
            }
        }

        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Some(url) = std::env::var("STUDENT_SEARCH_URL")
            .ok()
            .filter(|v| !v.is_empty())
        {
            self.base_url = url;
        }
        if let Some(index) = std::env::var("STUDENT_SEARCH_INDEX")
            .ok()
            .filter(|v| !v.is_empty())
        {
            self.index = index;
        }
    }
}
