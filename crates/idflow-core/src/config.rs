//! Configuration management for idflow.
//!
//! Loads configuration from ${IDFLOW_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::address::CallbackAddress;
use crate::selection::SelectionPolicy;

/// Default identity service base URL.
pub const DEFAULT_SERVICE_URL: &str = "https://service.oreid.io";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
pub fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for idflow configuration and data.
    //!
    //! IDFLOW_HOME resolution order:
    //! 1. IDFLOW_HOME environment variable (if set)
    //! 2. ~/.config/idflow (default)

    use std::path::PathBuf;

    /// Returns the idflow home directory.
    pub fn idflow_home() -> PathBuf {
        if let Ok(home) = std::env::var("IDFLOW_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".idflow"),
            |h| h.join(".config").join("idflow"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        idflow_home().join("config.toml")
    }

    /// Returns the path to the session store.
    pub fn session_store_path() -> PathBuf {
        idflow_home().join("session.json")
    }
}

/// How a signing account is picked when several permissions match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountSelection {
    #[default]
    First,
    PreferPermission,
}

/// Signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Chain network used to select the signing account.
    pub network: String,
    pub broadcast: bool,
    pub return_signed_transaction: bool,
    pub prevent_auto_sign: bool,
    pub account_selection: AccountSelection,
    pub preferred_permission: Option<String>,
    /// Caller state echoed back by the signing service.
    pub state: Option<String>,
    /// Contract of the sample action.
    pub contract: String,
    /// Action name of the sample action.
    pub action: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            network: "eos_kylin".to_string(),
            broadcast: true,
            return_signed_transaction: false,
            prevent_auto_sign: true,
            account_selection: AccountSelection::First,
            preferred_permission: None,
            state: None,
            contract: "demoapphello".to_string(),
            action: "hi".to_string(),
        }
    }
}

impl SigningConfig {
    /// Selection policy for this config.
    ///
    /// `prefer_permission` without a `preferred_permission` falls back to first match.
    pub fn selection_policy(&self) -> SelectionPolicy {
        match (self.account_selection, self.preferred_permission.as_deref()) {
            (AccountSelection::PreferPermission, Some(name)) if !name.trim().is_empty() => {
                SelectionPolicy::PreferPermission(name.trim().to_string())
            }
            _ => SelectionPolicy::FirstMatch,
        }
    }

    /// Non-blank `state` to send with sign requests.
    pub fn sign_state(&self) -> Option<String> {
        self.state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    }

    pub fn sign_options(&self) -> idflow_types::SignOptions {
        idflow_types::SignOptions {
            broadcast: self.broadcast,
            return_signed_transaction: self.return_signed_transaction,
            prevent_auto_sign: self.prevent_auto_sign,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub service_url: Option<String>,
    /// Registered callback address.
    pub callback_url: String,
    pub signing: SigningConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "My app".to_string(),
            app_id: None,
            api_key: None,
            service_url: None,
            callback_url: Self::DEFAULT_CALLBACK_URL.to_string(),
            signing: SigningConfig::default(),
        }
    }
}

/// Resolved connection settings for the identity service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub app_name: String,
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub service_url: Url,
    pub callback: CallbackAddress,
}

impl Config {
    const DEFAULT_CALLBACK_URL: &str = "http://localhost:8455/authcallback";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves service settings with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if a URL (service or callback) is malformed.
    pub fn service_settings(&self) -> Result<ServiceSettings> {
        let service_url = resolve_url(
            env_value("IDFLOW_SERVICE_URL"),
            self.service_url.as_deref(),
            DEFAULT_SERVICE_URL,
            "service",
        )?;
        let callback = CallbackAddress::parse(&self.callback_url)?;

        Ok(ServiceSettings {
            app_name: self.app_name.clone(),
            app_id: resolve_value(env_value("IDFLOW_APP_ID"), self.app_id.as_deref()),
            api_key: resolve_value(env_value("IDFLOW_API_KEY"), self.api_key.as_deref()),
            service_url,
            callback,
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Picks the first non-blank of env and config.
fn resolve_value(env: Option<String>, config: Option<&str>) -> Option<String> {
    env.as_deref()
        .into_iter()
        .chain(config)
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn resolve_url(
    env: Option<String>,
    config: Option<&str>,
    default: &str,
    name: &str,
) -> Result<Url> {
    let raw = resolve_value(env, config).unwrap_or_else(|| default.to_string());
    let mut url = Url::parse(&raw).with_context(|| format!("Invalid {name} URL: {raw}"))?;
    // Endpoints are joined as relative paths, so the base must end in `/`.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.callback_url, "http://localhost:8455/authcallback");
        assert_eq!(config.signing.network, "eos_kylin");
        assert!(config.signing.broadcast);
        assert!(config.signing.prevent_auto_sign);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config.app_name, "My app");
        assert_eq!(config.signing.account_selection, AccountSelection::First);
        assert_eq!(config.signing.contract, "demoapphello");
    }

    #[test]
    fn test_partial_config_keeps_signing_defaults() {
        let config: Config = toml::from_str(
            r#"
            callback_url = "http://127.0.0.1:9000/cb"
            [signing]
            network = "eos_main"
            "#,
        )
        .unwrap();
        assert_eq!(config.callback_url, "http://127.0.0.1:9000/cb");
        assert_eq!(config.signing.network, "eos_main");
        assert!(!config.signing.return_signed_transaction);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::init(&path).unwrap();
        assert!(path.exists());
        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_selection_policy_from_config() {
        let mut signing = SigningConfig::default();
        assert_eq!(signing.selection_policy(), SelectionPolicy::FirstMatch);

        signing.account_selection = AccountSelection::PreferPermission;
        assert_eq!(signing.selection_policy(), SelectionPolicy::FirstMatch);

        signing.preferred_permission = Some(" owner ".to_string());
        assert_eq!(
            signing.selection_policy(),
            SelectionPolicy::PreferPermission("owner".to_string())
        );
    }

    #[test]
    fn test_sign_state_ignores_blank_values() {
        let mut signing = SigningConfig::default();
        assert_eq!(signing.sign_state(), None);

        signing.state = Some("  ".to_string());
        assert_eq!(signing.sign_state(), None);

        let config: Config = toml::from_str("[signing]\nstate = \"yourstate\"").unwrap();
        assert_eq!(config.signing.sign_state().as_deref(), Some("yourstate"));
    }

    #[test]
    fn test_resolve_value_precedence() {
        assert_eq!(
            resolve_value(Some("env".to_string()), Some("cfg")),
            Some("env".to_string())
        );
        assert_eq!(
            resolve_value(Some("  ".to_string()), Some("cfg")),
            Some("cfg".to_string())
        );
        assert_eq!(resolve_value(None, Some("")), None);
    }

    #[test]
    fn test_resolve_url_rejects_garbage() {
        let err = resolve_url(None, Some("not a url"), DEFAULT_SERVICE_URL, "service").unwrap_err();
        assert!(err.to_string().contains("Invalid service URL"));
        let url = resolve_url(None, None, DEFAULT_SERVICE_URL, "service").unwrap();
        assert_eq!(url.as_str(), "https://service.oreid.io/");
    }

    #[test]
    fn test_resolve_url_keeps_base_path_for_endpoints() {
        let url = resolve_url(
            None,
            Some("https://host.example/oreid"),
            DEFAULT_SERVICE_URL,
            "service",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://host.example/oreid/");
        assert_eq!(
            url.join("api/app-token").unwrap().as_str(),
            "https://host.example/oreid/api/app-token"
        );

        let url = resolve_url(
            None,
            Some("https://host.example/oreid/"),
            DEFAULT_SERVICE_URL,
            "service",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://host.example/oreid/");
    }
}
