//! Configuration management for docgraph.
//!
//! Parses `docgraph.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `content.root` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content root directory.
    pub content_root: Option<PathBuf>,
    /// Override active category.
    pub category: Option<String>,
    /// Override the list of versions to aggregate.
    pub versions: Option<Vec<String>>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docgraph.toml";

/// Category names accepted in `site.category`.
const CATEGORIES: &[&str] = &["docs", "user"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration.
    pub site: SiteConfig,
    /// Content configuration (root is a relative string from TOML).
    content: ContentConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Active category (`docs` or `user`).
    pub category: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            category: "docs".to_owned(),
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root: Option<String>,
    docs_dir: Option<String>,
    user_dir: Option<String>,
    versions: Option<Vec<String>>,
    features_dir: Option<String>,
    legacy_dir: Option<String>,
    deprecated_features: Option<Vec<String>>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Root directory holding one subdirectory per category.
    pub root: PathBuf,
    /// Directory of the `docs` category, relative to `root`.
    pub docs_dir: String,
    /// Directory of the `user` category, relative to `root`.
    pub user_dir: String,
    /// Major versions to aggregate, in display order.
    pub versions: Vec<String>,
    /// Name of the per-version optional features directory.
    pub features_dir: String,
    /// Name of the legacy directory excluded from `docs` main trees.
    pub legacy_dir: String,
    /// Feature folder names dropped from the `docs` category.
    pub deprecated_features: Vec<String>,
}

impl ContentConfig {
    fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            docs_dir: "docs".to_owned(),
            user_dir: "user".to_owned(),
            versions: ["3", "4", "5", "6"].map(str::to_owned).to_vec(),
            features_dir: "optional_features".to_owned(),
            legacy_dir: "legacy".to_owned(),
            deprecated_features: Vec::new(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self::with_root(PathBuf::from("content"))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.root`").
        field: String,
        /// Error message (e.g., "${`CONTENT_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a directory name to be a single plain path segment.
fn require_dir_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{field} must be a single directory name"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docgraph.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.content_root {
            self.content_resolved.root.clone_from(root);
        }
        if let Some(category) = &settings.category {
            self.site.category.clone_from(category);
        }
        if let Some(versions) = &settings.versions {
            self.content_resolved.versions.clone_from(versions);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            content: ContentConfigRaw::default(),
            content_resolved: ContentConfig::with_root(base.join("content")),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&text)?;

        // Expand environment variables before path resolution
        config.expand_env_vars(expand::process_env)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_content()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        if !CATEGORIES.contains(&self.site.category.as_str()) {
            return Err(ConfigError::Validation(format!(
                "site.category must be one of {}, got '{}'",
                CATEGORIES.join(", "),
                self.site.category
            )));
        }
        Ok(())
    }

    /// Validate content configuration.
    fn validate_content(&self) -> Result<(), ConfigError> {
        let content = &self.content_resolved;
        require_dir_name(&content.docs_dir, "content.docs_dir")?;
        require_dir_name(&content.user_dir, "content.user_dir")?;
        require_dir_name(&content.features_dir, "content.features_dir")?;
        require_dir_name(&content.legacy_dir, "content.legacy_dir")?;

        if content.versions.is_empty() {
            return Err(ConfigError::Validation(
                "content.versions cannot be empty".to_owned(),
            ));
        }
        for version in &content.versions {
            let digits = version.strip_prefix('v').unwrap_or(version);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Validation(format!(
                    "content.versions entry '{version}' is not a major version number"
                )));
            }
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref root) = self.content.root {
            self.content.root = Some(expand::expand_vars(root, "content.root", lookup)?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.content;
        let root = config_dir.join(raw.root.as_deref().unwrap_or("content"));
        let defaults = ContentConfig::with_root(root);
        let pick =
            |value: Option<&String>, default: String| value.cloned().unwrap_or(default);

        self.content_resolved = ContentConfig {
            docs_dir: pick(raw.docs_dir.as_ref(), defaults.docs_dir),
            user_dir: pick(raw.user_dir.as_ref(), defaults.user_dir),
            versions: raw.versions.clone().unwrap_or(defaults.versions),
            features_dir: pick(raw.features_dir.as_ref(), defaults.features_dir),
            legacy_dir: pick(raw.legacy_dir.as_ref(), defaults.legacy_dir),
            deprecated_features: raw
                .deprecated_features
                .clone()
                .unwrap_or(defaults.deprecated_features),
            root: defaults.root,
        };
    }
}
