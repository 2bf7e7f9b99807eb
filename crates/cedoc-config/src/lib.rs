//! Configuration management for cedoc.
//!
//! Parses `cedoc.toml` configuration files with serde and provides
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
//! - `site.origin`
//! - `explorer.url`
//! - `explorer.favicon_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default Compiler Explorer instance.
pub const DEFAULT_EXPLORER_URL: &str = "https://godbolt.org";

/// highlight.js class of preprocessor keywords such as `include`.
pub const DEFAULT_META_KEYWORD_CLASS: &str = "hljs-meta-keyword";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the site origin used for include links.
    pub origin: Option<String>,
    /// Override the trigger mode.
    pub trigger: Option<TriggerMode>,
    /// Override processed-block marking.
    pub mark_processed: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cedoc.toml";

/// When the annotation runs relative to page load.
///
/// Both modes append Compiler Explorer links and center tooltips. Only
/// `PageReady` rewrites `#include "..."` references, since that needs the
/// fully rendered highlighting markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMode {
    /// Run as soon as the page is available.
    #[default]
    Immediate,
    /// Run once the page is fully rendered.
    PageReady,
}

impl TriggerMode {
    /// Parse a trigger mode from its kebab-case name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "immediate" => Some(Self::Immediate),
            "page-ready" => Some(Self::PageReady),
            _ => None,
        }
    }

    /// Whether include references are rewritten in this mode.
    #[must_use]
    pub fn rewrites_includes(self) -> bool {
        matches!(self, Self::PageReady)
    }
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Annotation behavior.
    pub annotate: AnnotateConfig,
    /// Compiler Explorer link settings.
    pub explorer: ExplorerConfig,
    /// Tooltip width estimation.
    pub tooltip: TooltipConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    dir: Option<String>,
    origin: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Directory holding the rendered HTML pages.
    pub dir: PathBuf,
    /// Origin the site is served from (e.g. `https://docs.example.com`).
    pub origin: Option<String>,
}

/// Annotation behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Trigger mode.
    pub trigger: TriggerMode,
    /// Mark annotated blocks so repeated runs skip them.
    pub mark_processed: bool,
    /// Class of highlighted tokens that may hold the `include` keyword.
    pub meta_keyword_class: String,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerMode::default(),
            mark_processed: true,
            meta_keyword_class: DEFAULT_META_KEYWORD_CLASS.to_owned(),
        }
    }
}

/// Compiler Explorer link settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Base URL of the Compiler Explorer instance.
    pub url: String,
    /// Icon shown inside the link.
    pub favicon_url: String,
    /// Tooltip text next to the icon.
    pub tooltip_text: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EXPLORER_URL.to_owned(),
            favicon_url: format!("{DEFAULT_EXPLORER_URL}/favicon.ico?v=1"),
            tooltip_text: "View in Compiler Explorer".to_owned(),
        }
    }
}

impl ExplorerConfig {
    /// Prefix every client-state link starts with.
    #[must_use]
    pub fn clientstate_base(&self) -> String {
        format!("{}/clientstate/", self.url.trim_end_matches('/'))
    }
}

/// Tooltip width estimation.
///
/// Pages are not laid out here, so a tooltip's rendered width is estimated
/// from its text length.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Average glyph advance in pixels.
    pub char_width: u32,
    /// Horizontal padding plus borders in pixels.
    pub padding: u32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            char_width: 7,
            padding: 10,
        }
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
        /// Config field path (e.g., "`site.origin`").
        field: String,
        /// Error message (e.g., "${`DOCS_ORIGIN`} not set").
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

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cedoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and validated together with
    /// the file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the combined configuration is invalid.
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
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(origin) = &settings.origin {
            self.site_resolved.origin = Some(origin.trim_end_matches('/').to_owned());
        }
        if let Some(trigger) = settings.trigger {
            self.annotate.trigger = trigger;
        }
        if let Some(mark_processed) = settings.mark_processed {
            self.annotate.mark_processed = mark_processed;
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
            site: SiteConfigRaw::default(),
            annotate: AnnotateConfig::default(),
            explorer: ExplorerConfig::default(),
            tooltip: TooltipConfig::default(),
            site_resolved: SiteConfig {
                dir: base.join("site"),
                origin: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`load`](Self::load) after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_explorer()?;
        self.validate_annotate()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        if let Some(ref origin) = self.site_resolved.origin {
            require_non_empty(origin, "site.origin")?;
            require_http_url(origin, "site.origin")?;
        }
        Ok(())
    }

    /// Validate explorer configuration.
    fn validate_explorer(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.explorer.url, "explorer.url")?;
        require_http_url(&self.explorer.url, "explorer.url")?;
        require_non_empty(&self.explorer.favicon_url, "explorer.favicon_url")?;
        Ok(())
    }

    /// Validate annotation configuration.
    fn validate_annotate(&self) -> Result<(), ConfigError> {
        if self.annotate.trigger.rewrites_includes() {
            if self.site_resolved.origin.is_none() {
                return Err(ConfigError::Validation(
                    "site.origin is required when annotate.trigger is page-ready".to_owned(),
                ));
            }
            require_non_empty(
                &self.annotate.meta_keyword_class,
                "annotate.meta_keyword_class",
            )?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref origin) = self.site.origin {
            self.site.origin = Some(expand::expand_env(origin, "site.origin")?);
        }
        self.explorer.url = expand::expand_env(&self.explorer.url, "explorer.url")?;
        self.explorer.favicon_url =
            expand::expand_env(&self.explorer.favicon_url, "explorer.favicon_url")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.site_resolved = SiteConfig {
            dir: config_dir.join(self.site.dir.as_deref().unwrap_or("site")),
            origin: self
                .site
                .origin
                .as_deref()
                .map(|origin| origin.trim_end_matches('/').to_owned()),
        };
    }
}
