// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Overlay Configuration
//
// YAML-backed settings for the client role overlay:
// - Role identity (name, display label)
// - Blog toggle
// - Companion extension capability lists
// - Trigger markers (reset parameter, listing page, upgrade payload types)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::capability::CapabilitySet;
use super::provider::CompanionExtension;
use super::role::{RoleName, ADMINISTRATOR_ROLE, CLIENT_ROLE};

pub const CONFIG_PATH_ENV: &str = "CLIENT_ROLE_CONFIG_PATH";
pub const BLOG_ENABLED_ENV: &str = "CLIENT_ROLE_BLOG_ENABLED";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub role: RoleSettings,

    #[serde(default)]
    pub blog: BlogSettings,

    /// Capability lists contributed by companion extensions
    #[serde(default)]
    pub companions: Vec<CompanionConfig>,

    #[serde(default)]
    pub triggers: TriggerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSettings {
    pub name: String,
    pub display_name: String,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            name: CLIENT_ROLE.to_string(),
            display_name: "Client".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSettings {
    pub enabled: bool,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    pub extension: CompanionExtension,

    /// Disabled entries are treated as not installed
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl CompanionConfig {
    pub fn capability_set(&self) -> CapabilitySet {
        self.capabilities.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// Query parameter that requests a manual reset
    pub reset_parameter: String,

    /// Page on which activation markers are honoured
    pub listing_page: String,

    /// Upgrade payload types that cause a reconciliation
    pub upgrade_types: Vec<String>,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            reset_parameter: "reset-client-role".to_string(),
            listing_page: "plugins.php".to_string(),
            upgrade_types: vec!["plugin".to_string(), "theme".to_string()],
        }
    }
}

fn default_true() -> bool {
    true
}

impl OverlayConfig {
    pub fn role_name(&self) -> RoleName {
        RoleName::new(self.role.name.clone())
    }

    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate locations, in precedence order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./client-role.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".client-role").join("config.yaml"));
        }
        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/client-role/config.yaml"));
        #[cfg(windows)]
        paths.push(PathBuf::from("C:\\ProgramData\\ClientRole\\config.yaml"));
        paths
    }

    /// First existing file from [`Self::search_paths`]
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // 1. Explicit CLI path (Fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        // 2. Discovery (Env -> Cwd -> Home -> System)
        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(BLOG_ENABLED_ENV) {
            self.apply_blog_override(&val);
        }
    }

    fn apply_blog_override(&mut self, val: &str) {
        match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => {
                tracing::info!("Environment override: {}=true", BLOG_ENABLED_ENV);
                self.blog.enabled = true;
            }
            "false" | "0" | "no" | "off" => {
                tracing::info!("Environment override: {}=false", BLOG_ENABLED_ENV);
                self.blog.enabled = false;
            }
            _ => {
                tracing::warn!(
                    "Invalid value for {}: '{}'. Expected true/false. Ignoring.",
                    BLOG_ENABLED_ENV,
                    val
                );
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.role.name.trim().is_empty() {
            anyhow::bail!("role.name cannot be empty");
        }

        if self.role.name == ADMINISTRATOR_ROLE {
            anyhow::bail!("role.name cannot be '{}'", ADMINISTRATOR_ROLE);
        }

        if self.triggers.reset_parameter.trim().is_empty() {
            anyhow::bail!("triggers.reset_parameter cannot be empty");
        }

        if self.triggers.listing_page.trim().is_empty() {
            anyhow::bail!("triggers.listing_page cannot be empty");
        }

        if self.triggers.upgrade_types.is_empty() {
            anyhow::bail!("triggers.upgrade_types cannot be empty");
        }

        if self.triggers.upgrade_types.iter().any(|t| t.trim().is_empty()) {
            anyhow::bail!("Empty entry in triggers.upgrade_types");
        }

        let mut seen = BTreeSet::new();
        for companion in &self.companions {
            if !seen.insert(companion.extension) {
                anyhow::bail!("Duplicate companion entry: {}", companion.extension);
            }

            if companion.capabilities.iter().any(|cap| cap.trim().is_empty()) {
                anyhow::bail!("Empty capability name in companion: {}", companion.extension);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.role_name(), RoleName::client());
        assert!(config.blog.enabled);
        assert!(config.companions.is_empty());
        assert_eq!(config.triggers.listing_page, "plugins.php");
        assert_eq!(config.triggers.upgrade_types, vec!["plugin", "theme"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
role:
  name: client
  display_name: Klant
blog:
  enabled: false
companions:
  - extension: gravity_forms
    capabilities: [gform_full_access]
  - extension: wordpress_seo
    enabled: false
    capabilities: [wpseo_bulk_edit]
"#;
        let config = OverlayConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.role.display_name, "Klant");
        assert!(!config.blog.enabled);
        assert_eq!(config.companions.len(), 2);
        assert!(config.companions[0].enabled);
        assert!(!config.companions[1].enabled);
        assert!(config.companions[0].capability_set().contains("gform_full_access"));
        // Omitted sections fall back to defaults
        assert_eq!(config.triggers.reset_parameter, "reset-client-role");
    }

    #[test]
    fn test_validation() {
        let mut config = OverlayConfig::default();

        config.role.name = String::new();
        assert!(config.validate().is_err());

        config.role.name = ADMINISTRATOR_ROLE.to_string();
        assert!(config.validate().is_err());

        config.role.name = CLIENT_ROLE.to_string();
        config.companions = vec![
            CompanionConfig {
                extension: CompanionExtension::GravityForms,
                enabled: true,
                capabilities: vec![],
            },
            CompanionConfig {
                extension: CompanionExtension::GravityForms,
                enabled: false,
                capabilities: vec![],
            },
        ];
        assert!(config.validate().is_err());

        config.companions.pop();
        config.companions[0].capabilities = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_disabled_triggers() {
        let mut config = OverlayConfig::default();
        config.triggers.listing_page = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = OverlayConfig::default();
        config.triggers.upgrade_types.clear();
        assert!(config.validate().is_err());

        let mut config = OverlayConfig::default();
        config.triggers.upgrade_types.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blog_override_values() {
        let mut config = OverlayConfig::default();
        config.apply_blog_override("off");
        assert!(!config.blog.enabled);
        config.apply_blog_override("maybe");
        assert!(!config.blog.enabled);
        config.apply_blog_override("YES");
        assert!(config.blog.enabled);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client-role.yaml");

        let mut config = OverlayConfig::default();
        config.blog.enabled = false;
        config.to_yaml_file(&path).unwrap();

        let loaded = OverlayConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.role.name, CLIENT_ROLE);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OverlayConfig::load_or_default(Some(dir.path().join("absent.yaml"))).is_err());
    }
}
