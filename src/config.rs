use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wizard::{AccessGate, StepId, StepRegistry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Holds the flow record, workspace file, assignment log and logs
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
}

/// Wizard behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Step order used for back navigation. Steps left out are unreachable.
    #[serde(default = "default_steps")]
    pub steps: Vec<StepId>,
}

fn default_steps() -> Vec<StepId> {
    StepId::all().to_vec()
}

impl WizardConfig {
    pub fn registry(&self) -> StepRegistry {
        StepRegistry::new(self.steps.iter().copied())
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
        }
    }
}

/// Signed-in account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Email of the account being acted on behalf of, when copiloting
    #[serde(default)]
    pub delegate: Option<String>,
}

impl AccessGate for AccountConfig {
    fn is_restricted_access(&self) -> bool {
        self.delegate.as_deref().is_some_and(|d| !d.trim().is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".cardwizard/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the wizard works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/cardwizard/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cardwizard").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with CARDWIZARD_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("CARDWIZARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.state_path().join("workspace.json")
    }

    pub fn assignments_path(&self) -> PathBuf {
        self.state_path().join("assignments.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                state: ".cardwizard".to_string(), // Relative to cwd
            },
            ui: UiConfig {
                refresh_rate_ms: 250,
            },
            logging: LoggingConfig::default(),
            wizard: WizardConfig::default(),
            account: AccountConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_registry_covers_all_steps() {
        let config = Config::default();
        assert_eq!(config.wizard.registry(), StepRegistry::default());
    }

    #[test]
    fn test_paths_derive_from_state_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        assert!(config.logs_path().starts_with(temp_dir.path()));
        assert!(config.logs_path().ends_with("logs"));
        assert!(config.workspace_path().ends_with("workspace.json"));
        assert!(config.assignments_path().ends_with("assignments.json"));
    }

    #[test]
    fn test_delegate_restricts_access() {
        let mut account = AccountConfig::default();
        assert!(!account.is_restricted_access());
        account.delegate = Some("   ".to_string());
        assert!(!account.is_restricted_access());
        account.delegate = Some("owner@example.com".to_string());
        assert!(account.is_restricted_access());
    }

    #[test]
    fn test_load_reads_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[wizard]\nsteps = [\"ASSIGNEE\", \"CARD\", \"CONFIRMATION\"]\n\n[account]\ndelegate = \"boss@example.com\"\n",
        )
        .unwrap();

        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(
            config.wizard.steps,
            vec![StepId::Assignee, StepId::Card, StepId::Confirmation]
        );
        assert!(config.account.is_restricted_access());
        assert_eq!(config.ui.refresh_rate_ms, 250);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.wizard.steps, config.wizard.steps);
        assert_eq!(parsed.paths.state, ".cardwizard");
    }
}
