//! Configuration management for promptctl.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.promptctl/config.yaml` or `PROMPTCTL_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: template files and the config
//! file live under `<workspace>/.promptctl/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default hosted prompt engine endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.jigsawstack.com/v1";

/// Default environment variable holding the engine API key.
pub const DEFAULT_API_KEY_ENV: &str = "JIGSAWSTACK_API_KEY";

/// Providers the engine factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["jigsawstack", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .promptctl/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Remote engine settings
    pub engine: EngineConfig,

    /// Explicit API key (`PROMPTCTL_API_KEY`), wins over `engine.api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Remote prompt engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine provider ("jigsawstack" or "mock")
    pub provider: String,

    /// Base URL of the engine REST API
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    /// Name of the environment variable that holds the API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: "jigsawstack".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout: 60,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    engine: Option<EngineSection>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

/// `engine:` section; every key is optional so partial files merge cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EngineSection {
    provider: Option<String>,
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            engine: EngineConfig::default(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

/// Load `<dir>/.env` into the process environment.
///
/// Variables already set are left alone. Returns the path that was loaded,
/// or `None` when there is no `.env` file.
pub fn load_dotenv(dir: &Path) -> AppResult<Option<PathBuf>> {
    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(None);
    }

    dotenvy::from_path(&path)
        .map_err(|e| AppError::Config(format!("Failed to load {:?}: {}", path, e)))?;

    Ok(Some(path))
}

impl AppConfig {
    /// Load configuration from environment variables, config file and defaults.
    ///
    /// Environment variables:
    /// - `PROMPTCTL_WORKSPACE`: Override workspace path
    /// - `PROMPTCTL_CONFIG`: Path to config file
    /// - `PROMPTCTL_PROVIDER`: Engine provider
    /// - `PROMPTCTL_BASE_URL`: Engine base URL
    /// - `PROMPTCTL_API_KEY`: API key (wins over `engine.apiKeyEnv`)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// The API key itself is not required here; it is checked when an engine
    /// client is built, so commands that never dispatch work without one.
    ///
    /// # Example
    /// ```no_run
    /// use promptctl_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// Explicit paths win over `PROMPTCTL_WORKSPACE` / `PROMPTCTL_CONFIG`
    /// and decide which YAML file is read. An explicit workspace also wins
    /// over `workspace.path` in that file.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match workspace.clone() {
            Some(workspace) => config.workspace = workspace,
            None => {
                if let Ok(workspace) = std::env::var("PROMPTCTL_WORKSPACE") {
                    config.workspace = PathBuf::from(workspace);
                }
            }
        }

        config.config_file = match config_file {
            Some(config_file) => Some(config_file),
            None => std::env::var("PROMPTCTL_CONFIG").ok().map(PathBuf::from),
        };

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".promptctl/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("PROMPTCTL_PROVIDER") {
            config.engine.provider = provider;
        }

        if let Ok(base_url) = std::env::var("PROMPTCTL_BASE_URL") {
            config.engine.base_url = base_url;
        }

        config.api_key = std::env::var("PROMPTCTL_API_KEY").ok();

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(mut self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            self.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        if let Some(engine) = config_file.engine {
            if let Some(provider) = engine.provider {
                self.engine.provider = provider;
            }
            if let Some(base_url) = engine.base_url {
                self.engine.base_url = base_url;
            }
            if let Some(api_key_env) = engine.api_key_env {
                self.engine.api_key_env = api_key_env;
            }
            if let Some(timeout) = engine.timeout {
                self.engine.timeout = timeout;
            }
        }

        Ok(self)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        base_url: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.engine.provider = provider;
        }

        if let Some(base_url) = base_url {
            self.engine.base_url = base_url;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .promptctl directory.
    pub fn promptctl_dir(&self) -> PathBuf {
        self.workspace.join(".promptctl")
    }

    /// Get the directory holding template definitions.
    pub fn templates_dir(&self) -> PathBuf {
        self.promptctl_dir().join("templates")
    }

    /// Resolve the engine API key.
    ///
    /// `PROMPTCTL_API_KEY` wins; otherwise the variable named by
    /// `engine.api_key_env` is read. A missing or blank key is a
    /// configuration error.
    pub fn resolve_api_key(&self) -> AppResult<String> {
        if let Some(ref key) = self.api_key {
            if !key.trim().is_empty() {
                return Ok(key.clone());
            }
        }

        match std::env::var(&self.engine.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.engine.api_key_env
            ))),
        }
    }

    /// Validate configuration for the active provider.
    ///
    /// Provider names are matched case-insensitively.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.engine.provider.to_lowercase();
        let provider = provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.engine.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.engine.timeout == 0 {
            return Err(AppError::Config(
                "Engine timeout must be at least one second".to_string(),
            ));
        }

        if provider == "jigsawstack" && self.engine.base_url.trim().is_empty() {
            return Err(AppError::Config("Engine base URL cannot be empty".to_string()));
        }

        Ok(())
    }
}
