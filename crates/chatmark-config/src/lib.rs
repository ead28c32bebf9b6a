use chatmark_engine::config::{
    DEFAULT_CUSTOM_SCHEMES, DEFAULT_MAX_INPUT_LEN, DEFAULT_QUOTE_DEPTH,
};
use chatmark_engine::scan::url::DEFAULT_PEAR_SCHEME;
use chatmark_engine::{PipelineConfig, PipelineError, StaticEmojiRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid pipeline settings: {0}")]
    InvalidPipeline(#[from] PipelineError),
}

/// Shortcodes available without any `[emoji]` table.
const DEFAULT_UNICODE_EMOJI: &[(&str, &str)] = &[
    ("+1", "👍\u{fe0f}"),
    ("-1", "👎\u{fe0f}"),
    ("smile", "😄"),
    ("joy", "😂"),
    ("heart", "❤\u{fe0f}"),
    ("fire", "🔥"),
    ("tada", "🎉"),
    ("eyes", "👀"),
    ("wave", "👋"),
    ("sunglasses", "😎"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// Shortcode to glyph.
    pub unicode: BTreeMap<String, String>,
    /// Shortcodes of app-drawn emoji.
    pub custom: Vec<String>,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            unicode: DEFAULT_UNICODE_EMOJI
                .iter()
                .map(|(code, glyph)| (code.to_string(), glyph.to_string()))
                .collect(),
            custom: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pear_scheme: String,
    pub custom_schemes: Vec<String>,
    pub quote_depth: usize,
    pub max_input_len: usize,
    pub emoji: EmojiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pear_scheme: DEFAULT_PEAR_SCHEME.to_string(),
            custom_schemes: DEFAULT_CUSTOM_SCHEMES.iter().map(|s| s.to_string()).collect(),
            quote_depth: DEFAULT_QUOTE_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            emoji: EmojiConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            log::debug!("no config at {}", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Loads the file at `config_path`, falling back to defaults when it
    /// does not exist.
    pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/chatmark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expands `~` and `$VAR` in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Engine settings. Schemes are validated here, so a bad config file
    /// fails at start-up rather than on the first message.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let config = PipelineConfig::builder()
            .pear_scheme(&self.pear_scheme)
            .custom_schemes(&self.custom_schemes)
            .quote_depth(self.quote_depth)
            .max_input_len(self.max_input_len)
            .build()?;
        Ok(config)
    }

    pub fn emoji_registry(&self) -> StaticEmojiRegistry {
        let mut registry = StaticEmojiRegistry::new();
        for (code, glyph) in &self.emoji.unicode {
            registry.insert_unicode(code, glyph);
        }
        for code in &self.emoji.custom {
            registry.insert_custom(code);
        }
        registry
    }
}
