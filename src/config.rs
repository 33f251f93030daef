use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LANGUAGE: &str = "en_US";
pub const DEFAULT_AI_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_AI_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,

    /// Directory holding `<language>.dic` and `<language>.aff`.
    #[serde(default)]
    pub dictionary_dir: Option<PathBuf>,

    /// Extra accepted words, one per line.
    #[serde(default)]
    pub personal_dictionary: Option<PathBuf>,

    /// Rule ids to skip (see `grammarchk --list-rules`).
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_max_suggestions() -> usize {
    5
}

fn default_history_limit() -> usize {
    50
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_cache_capacity() -> usize {
    100
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_endpoint() -> String {
    DEFAULT_AI_ENDPOINT.to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            model: default_ai_model(),
            endpoint: default_ai_endpoint(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            dictionary_dir: None,
            personal_dictionary: None,
            disabled_rules: Vec::new(),
            max_suggestions: default_max_suggestions(),
            cache: CacheConfig::default(),
            history_limit: default_history_limit(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        dictionary_dir: Option<PathBuf>,
        disabled_rules: Vec<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                debug!("Loading global config from {}", global_path.display());
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".grammarchk.toml");
        if local_path.exists() {
            debug!("Loading local config from {}", local_path.display());
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        // Apply CLI overrides
        if let Some(language) = language {
            config.language = language;
        }
        if let Some(dir) = dictionary_dir {
            config.dictionary_dir = Some(dir);
        }
        config.disabled_rules.extend(disabled_rules);

        if config.dictionary_dir.is_none() {
            config.dictionary_dir = Self::default_dictionary_dir();
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.language != DEFAULT_LANGUAGE {
            self.language = other.language;
        }
        if other.dictionary_dir.is_some() {
            self.dictionary_dir = other.dictionary_dir;
        }
        if other.personal_dictionary.is_some() {
            self.personal_dictionary = other.personal_dictionary;
        }
        if !other.disabled_rules.is_empty() {
            self.disabled_rules = other.disabled_rules;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        if other.cache != CacheConfig::default() {
            self.cache = other.cache;
        }
        if other.history_limit != default_history_limit() {
            self.history_limit = other.history_limit;
        }
        if other.ai.api_key.is_some() {
            self.ai.api_key = other.ai.api_key;
        }
        if other.ai.api_key_file.is_some() {
            self.ai.api_key_file = other.ai.api_key_file;
        }
        if other.ai.model != DEFAULT_AI_MODEL {
            self.ai.model = other.ai.model;
        }
        if other.ai.endpoint != DEFAULT_AI_ENDPOINT {
            self.ai.endpoint = other.ai.endpoint;
        }
        if other.ai.timeout_secs != default_ai_timeout() {
            self.ai.timeout_secs = other.ai.timeout_secs;
        }
        self
    }

    /// The AI credential: the configured key, else the contents of the key file.
    /// Blank keys count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.ai.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }

        let key_file = self.ai.api_key_file.clone().or_else(Self::default_api_key_path)?;
        if !key_file.exists() {
            return None;
        }
        match fs::read_to_string(&key_file) {
            Ok(contents) => {
                let key = contents.trim();
                (!key.is_empty()).then(|| key.to_string())
            }
            Err(e) => {
                warn!("Could not read API key file {}: {}", key_file.display(), e);
                None
            }
        }
    }

    /// Words from the personal dictionary file, lowercased. Lines starting with
    /// `#` are comments.
    pub fn personal_words(&self) -> Result<Vec<String>> {
        let Some(path) = &self.personal_dictionary else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read personal dictionary: {}", path.display()))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|word| !word.is_empty() && !word.starts_with('#'))
            .map(str::to_lowercase)
            .collect())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn default_api_key_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("api-key.txt"))
    }

    pub fn default_dictionary_dir() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join("dictionaries"))
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "grammarchk").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "grammarchk").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "en_US");
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.ai.model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let override_config = Config {
            language: "en_GB".to_string(),
            history_limit: 10,
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.language, "en_GB");
        assert_eq!(merged.history_limit, 10);
        assert_eq!(merged.max_suggestions, 5);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            language = "en_GB"
            disabled_rules = ["multiple-spaces"]

            [cache]
            capacity = 10

            [ai]
            model = "openai/gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(config.language, "en_GB");
        assert_eq!(config.disabled_rules, vec!["multiple-spaces"]);
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.ai.model, "openai/gpt-4o");
        assert_eq!(config.ai.endpoint, DEFAULT_AI_ENDPOINT);
    }

    #[test]
    fn test_api_key_resolution() {
        let dir = tempdir().unwrap();
        let key_file = dir.path().join("api-key.txt");

        let mut config = Config::default();
        config.ai.api_key = Some("   ".to_string());
        config.ai.api_key_file = Some(key_file.clone());
        assert_eq!(config.resolve_api_key(), None);

        fs::write(&key_file, "  sk-from-file\n").unwrap();
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-from-file"));

        config.ai.api_key = Some("sk-inline".to_string());
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_personal_words_skip_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal.txt");
        fs::write(&path, "# project words\nRustacean\n\ngrammarchk\n").unwrap();

        let config = Config {
            personal_dictionary: Some(path),
            ..Default::default()
        };
        assert_eq!(config.personal_words().unwrap(), vec!["rustacean", "grammarchk"]);
    }
}
