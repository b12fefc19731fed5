//! Configuration types, defaults, loading, and validation.

use super::secrets::SecretString;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend REST API
    #[serde(default)]
    pub api: ApiConfig,

    /// Payment-provider handoff settings
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Where persisted console state lives
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (default: "http://127.0.0.1:3000/api")
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Bearer token, loaded from keys.toml or the environment only.
    /// Not serialized to config file
    #[serde(skip)]
    pub token: Option<SecretString>,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout(),
            token: None,
        }
    }
}

/// Payment-provider (Stripe Connect) handoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    /// Query parameter marking a successful provider return; added to the
    /// `returnUrl` sent to create-account
    #[serde(default = "default_success_param")]
    pub success_param: String,

    /// Value of `success_param` that marks success (default: "true")
    #[serde(default = "default_success_value")]
    pub success_value: String,

    /// Bind address of the local return listener (default: "127.0.0.1")
    #[serde(default = "default_return_bind")]
    pub return_bind: String,

    /// Port of the local return listener (default: 18795)
    #[serde(default = "default_return_port")]
    pub return_port: u16,

    /// Give up waiting for the provider after this many seconds. Unset = wait forever.
    #[serde(default)]
    pub return_timeout_secs: Option<u64>,

    /// Launch the system browser for the provider URL (default: true)
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

fn default_success_param() -> String {
    "stripe_success".to_string()
}

fn default_success_value() -> String {
    "true".to_string()
}

fn default_return_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_return_port() -> u16 {
    18795
}

fn default_true() -> bool {
    true
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            success_param: default_success_param(),
            success_value: default_success_value(),
            return_bind: default_return_bind(),
            return_port: default_return_port(),
            return_timeout_secs: None,
            open_browser: true,
        }
    }
}

impl PaymentsConfig {
    /// URL the provider sends the browser back to.
    pub fn return_url(&self) -> String {
        format!(
            "http://{}:{}/setup/return",
            self.return_bind, self.return_port
        )
    }
}

/// Persisted state locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Profile-scoped store (onboarding flag, organization/user ids)
    #[serde(default = "default_profile_path")]
    pub profile_path: PathBuf,

    /// Session-scoped store (pending handoff snapshot)
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,

    /// Prefix for every key this crate writes
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_profile_path() -> PathBuf {
    console_home().join("profile.json")
}

fn default_session_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tenant-console")
        .join("session.json")
}

fn default_namespace() -> String {
    "tenant-console".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            profile_path: default_profile_path(),
            session_path: default_session_path(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Expand leading `~` or `~/` in a path to the actual home directory.
fn expand_tilde(p: &Path) -> PathBuf {
    if let Ok(rest) = p.strip_prefix("~") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        p.to_path_buf()
    }
}

/// Canonical base directory: `~/.tenant-console/`
pub fn console_home() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".tenant-console")
}

/// Get path to keys.toml - separate file for the API token
pub fn keys_path() -> PathBuf {
    console_home().join("keys.toml")
}

/// Keys file structure (keys.toml)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeysFile {
    #[serde(default)]
    pub api: Option<KeysApi>,
}

/// `[api]` section in keys.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeysApi {
    pub token: Option<String>,
}

/// Load secrets from keys.toml
/// This file should be chmod 600 for security
fn load_keys_from_file(path: &Path) -> Result<KeysFile> {
    if !path.exists() {
        return Ok(KeysFile::default());
    }

    tracing::debug!("Loading keys from: {:?}", path);
    let content = fs::read_to_string(path)?;
    let keys: KeysFile = toml::from_str(&content)?;
    Ok(keys)
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.tenant-console/config.toml
    /// 3. Local config: ./tenant-console.toml
    /// 4. keys.toml
    /// 5. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        let system_config_path = Self::system_config_path();
        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(&system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(&local_config_path)?;
        }

        config.finish_loading(&keys_path())
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. keys.toml
    /// 4. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::merge_from_file(path)?;

        config.finish_loading(&keys_path())
    }

    fn finish_loading(mut self, keys_path: &Path) -> Result<Self> {
        if let Ok(keys) = load_keys_from_file(keys_path)
            && let Some(api) = keys.api
            && let Some(token) = api.token
            && !token.trim().is_empty()
        {
            self.api.token = Some(SecretString::new(token.trim().to_string()));
        }

        self = Self::apply_env_overrides(self);

        // TOML doesn't expand ~
        self.storage.profile_path = expand_tilde(&self.storage.profile_path);
        self.storage.session_path = expand_tilde(&self.storage.session_path);
        if let Some(file) = self.logging.file.take() {
            self.logging.file = Some(expand_tilde(&file));
        }

        tracing::debug!("Configuration loaded successfully");
        Ok(self)
    }

    /// Get the system config path: ~/.tenant-console/config.toml
    pub fn system_config_path() -> PathBuf {
        console_home().join("config.toml")
    }

    /// Get the local config path: ./tenant-console.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./tenant-console.toml")
    }

    /// Load a TOML file; the file replaces the defaults section by section.
    fn merge_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Self) -> Self {
        if let Ok(url) = std::env::var("TENANT_CONSOLE_API_URL") {
            config.api.base_url = url;
        }

        if let Ok(token) = std::env::var("TENANT_CONSOLE_API_TOKEN")
            && !token.trim().is_empty()
        {
            config.api.token = Some(SecretString::new(token.trim().to_string()));
        }

        if let Ok(log_level) = std::env::var("TENANT_CONSOLE_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Ok(log_file) = std::env::var("TENANT_CONSOLE_LOG_FILE") {
            config.logging.file = Some(PathBuf::from(log_file));
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let base = reqwest::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!("api.base_url must be http or https, got {}", base.scheme());
        }

        if self.payments.return_port == 0 {
            anyhow::bail!("payments.return_port must be non-zero");
        }

        if self.payments.success_param.trim().is_empty() {
            anyhow::bail!("payments.success_param is empty");
        }

        if self.storage.namespace.trim().is_empty() {
            anyhow::bail!("storage.namespace is empty");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Rotate config backups before writing.
    ///
    /// Keeps up to `max_backups` copies named `config.toml.backup1` (newest)
    /// through `config.toml.backupN` (oldest). Backup failure never blocks a
    /// config write.
    fn backup_config(path: &Path, max_backups: usize) {
        if !path.exists() {
            return;
        }

        let Some(parent) = path.parent() else {
            return;
        };
        let stem = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        for i in (1..=max_backups).rev() {
            let src = parent.join(format!("{stem}.backup{i}"));
            if i == max_backups {
                let _ = fs::remove_file(&src);
            } else {
                let dst = parent.join(format!("{stem}.backup{}", i + 1));
                if src.exists() {
                    let _ = fs::rename(&src, &dst);
                }
            }
        }

        let backup1 = parent.join(format!("{stem}.backup1"));
        if let Err(e) = fs::copy(path, &backup1) {
            tracing::warn!("Failed to back up config before write: {e}");
        } else {
            tracing::debug!("Config backed up to {}", backup1.display());
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        Self::backup_config(path, 5);

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}
