//! Configuration management for mdsync.
//!
//! Parses `mdsync.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.space_key`
//! - `confluence.username`
//! - `confluence.api_token`

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the directory holding the Markdown files to upload.
    pub input_dir: Option<PathBuf>,
    /// Override the directory exported pages are written to.
    pub output_dir: Option<PathBuf>,
    /// Override where new sections go in the page body.
    pub position: Option<InsertPosition>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsync.toml";

/// Longest digest prefix a SHA-256 hex string can provide.
const MAX_HASH_LEN: usize = 64;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings.
    pub confluence: Option<ConfluenceConfig>,
    /// Upload settings (paths are relative strings from TOML).
    upload: UploadConfigRaw,
    /// Export settings (paths are relative strings from TOML).
    export: ExportConfigRaw,

    /// Resolved upload configuration (set after loading).
    #[serde(skip)]
    pub upload_resolved: UploadConfig,
    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Where newly rendered sections are placed in the existing page body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// After the existing body.
    #[default]
    Append,
    /// Before the existing body.
    Prepend,
    /// Instead of the existing body.
    Replace,
}

impl FromStr for InsertPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            "replace" => Ok(Self::Replace),
            other => Err(ConfigError::Validation(format!(
                "unknown insert position '{other}' (expected append, prepend or replace)"
            ))),
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Replace => "replace",
        })
    }
}

/// Raw upload configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct UploadConfigRaw {
    input_dir: Option<String>,
    position: Option<InsertPosition>,
    heading_level: Option<i64>,
    separator: Option<bool>,
    anchor_prefix: Option<String>,
    hash_len: Option<usize>,
    strict_tables: Option<bool>,
}

/// Resolved upload configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Directory holding the `*.md` files to insert.
    pub input_dir: PathBuf,
    /// Placement of new sections relative to the existing body.
    pub position: InsertPosition,
    /// Heading level of each section title, always within 1..=6.
    pub heading_level: u8,
    /// Whether each section starts with a horizontal rule.
    pub separator: bool,
    /// Namespace prefix of the anchor marker names.
    pub anchor_prefix: String,
    /// Number of hex digest characters kept in a marker name.
    pub hash_len: usize,
    /// Require table continuation rows to look like table rows.
    pub strict_tables: bool,
}

impl UploadConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            input_dir: base.join("Input"),
            position: InsertPosition::Append,
            heading_level: 2,
            separator: true,
            anchor_prefix: "mdfile".to_owned(),
            hash_len: 12,
            strict_tables: false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Raw export configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    output_dir: Option<String>,
}

/// Resolved export configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Directory exported Markdown files are written to.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Confluence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence base URL (for Cloud this includes the `/wiki` suffix).
    pub base_url: String,
    /// Key of the space the target page lives in.
    pub space_key: String,
    /// Account name for Basic auth. Without it the token is sent as a Bearer token.
    #[serde(default)]
    pub username: Option<String>,
    /// API token (Cloud) or personal access token (Server/Data Center).
    pub api_token: String,
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.space_key, "confluence.space_key")?;
        require_non_empty(&self.api_token, "confluence.api_token")?;
        if let Some(username) = &self.username {
            require_non_empty(username, "confluence.username")?;
        }
        Ok(())
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
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_API_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Clamp a configured heading level into the valid HTML range.
fn clamp_heading_level(level: i64) -> u8 {
    // Lossless: the value is within 1..=6 after clamping.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let level = level.clamp(1, 6) as u8;
    level
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdsync.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(input_dir) = &settings.input_dir {
            self.upload_resolved.input_dir.clone_from(input_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.export_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(position) = settings.position {
            self.upload_resolved.position = position;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Returns the Confluence config if the `[confluence]` section is present
    /// and all fields are valid. Commands that talk to the server call this
    /// instead of reading the `confluence` field directly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
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
            confluence: None,
            upload: UploadConfigRaw::default(),
            export: ExportConfigRaw::default(),
            upload_resolved: UploadConfig::with_base(base),
            export_resolved: ExportConfig {
                output_dir: base.join("output"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[confluence]` section is not checked here; see
    /// [`require_confluence`](Self::require_confluence).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_upload()
    }

    fn validate_upload(&self) -> Result<(), ConfigError> {
        let upload = &self.upload_resolved;

        require_non_empty(&upload.anchor_prefix, "upload.anchor_prefix")?;
        if !upload
            .anchor_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(
                "upload.anchor_prefix may only contain ASCII letters, digits, '-' and '_'"
                    .to_owned(),
            ));
        }

        if upload.hash_len == 0 || upload.hash_len > MAX_HASH_LEN {
            return Err(ConfigError::Validation(format!(
                "upload.hash_len must be between 1 and {MAX_HASH_LEN}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url =
                expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.space_key =
                expand::expand_env(&confluence.space_key, "confluence.space_key")?;
            confluence.username =
                expand::expand_env_opt(confluence.username.as_ref(), "confluence.username")?;
            confluence.api_token =
                expand::expand_env(&confluence.api_token, "confluence.api_token")?;
        }
        Ok(())
    }

    /// Resolve raw values: relative paths against the config directory, defaults
    /// for missing keys, heading level clamped.
    fn resolve(&mut self, config_dir: &Path) {
        let defaults = UploadConfig::with_base(config_dir);
        let upload = &self.upload;

        self.upload_resolved = UploadConfig {
            input_dir: upload
                .input_dir
                .as_deref()
                .map_or(defaults.input_dir, |dir| config_dir.join(dir)),
            position: upload.position.unwrap_or(defaults.position),
            heading_level: upload
                .heading_level
                .map_or(defaults.heading_level, clamp_heading_level),
            separator: upload.separator.unwrap_or(defaults.separator),
            anchor_prefix: upload
                .anchor_prefix
                .clone()
                .unwrap_or(defaults.anchor_prefix),
            hash_len: upload.hash_len.unwrap_or(defaults.hash_len),
            strict_tables: upload.strict_tables.unwrap_or(defaults.strict_tables),
        };

        self.export_resolved = ExportConfig {
            output_dir: config_dir.join(self.export.output_dir.as_deref().unwrap_or("output")),
        };
    }
}
