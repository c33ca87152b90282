//! Configuration handling for the intake TUI

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default registration service address
pub const DEFAULT_SERVICE_ADDRESS: &str = "http://127.0.0.1:50061";

/// Environment variable that overrides the configured service address
pub const SERVICE_ADDRESS_ENV: &str = "INTAKE_SERVICE_ADDRESS";

const DEFAULT_ROUTE_PREFIX: &str = "patients";

/// The signed-in user whose details prefill the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntakeConfig {
    /// Registration service address
    pub service_address: Option<String>,
    /// First path segment of the post-registration route
    pub patient_route_prefix: Option<String>,
    /// Profile used to prefill personal details
    pub user: Option<UserProfile>,
}

impl IntakeConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "intake", "intake-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Service address: environment, then config file, then the default
    pub fn service_address(&self) -> String {
        self.resolve_address(std::env::var(SERVICE_ADDRESS_ENV).ok())
    }

    fn resolve_address(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|addr| !addr.trim().is_empty())
            .or_else(|| self.service_address.clone())
            .unwrap_or_else(|| DEFAULT_SERVICE_ADDRESS.to_string())
    }

    pub fn patient_route_prefix(&self) -> &str {
        self.patient_route_prefix
            .as_deref()
            .unwrap_or(DEFAULT_ROUTE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};
    use uuid::Uuid;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("intake-tui-{}", Uuid::new_v4()))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = IntakeConfig::default();
        assert!(config.service_address.is_none());
        assert!(config.user.is_none());
        assert_eq!(config.patient_route_prefix(), "patients");
    }

    #[test]
    fn test_resolve_address_precedence() {
        let config = IntakeConfig {
            service_address: Some("http://file:1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_address(Some("http://env:2".to_string())),
            "http://env:2"
        );
        assert_eq!(config.resolve_address(Some("  ".to_string())), "http://file:1");
        assert_eq!(config.resolve_address(None), "http://file:1");
        assert_eq!(
            IntakeConfig::default().resolve_address(None),
            DEFAULT_SERVICE_ADDRESS
        );
    }

    #[test]
    fn test_deserialize_with_user() {
        let json = r#"{
            "service_address": "http://localhost:6000",
            "user": {"id": "u-1", "name": "Jane Doe", "email": null, "phone": "+15551234567"}
        }"#;
        let parsed: IntakeConfig = serde_json::from_str(json).unwrap();
        let user = parsed.user.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.name.as_deref(), Some("Jane Doe"));
        assert!(user.email.is_none());
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: IntakeConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.service_address.is_none());
        assert!(parsed.patient_route_prefix.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{"patient_route_prefix": "clients", "unknown_field": "value"}"#;
        let parsed: IntakeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.patient_route_prefix(), "clients");
    }

    #[test]
    fn test_load_from_written_file() {
        let path = temp_config_path();
        let config = IntakeConfig {
            service_address: Some("http://localhost:6000".to_string()),
            patient_route_prefix: None,
            user: Some(UserProfile {
                id: "u-2".to_string(),
                name: None,
                email: Some("a@b.co".to_string()),
                phone: None,
            }),
        };
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = assert_ok!(IntakeConfig::load_from(&path));
        assert_eq!(loaded.service_address, config.service_address);
        assert_eq!(loaded.user, config.user);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_from_invalid_json_fails() {
        let path = temp_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert_err!(IntakeConfig::load_from(&path));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_config_path_returns_option() {
        // Just test that the function doesn't panic
        let _path = IntakeConfig::config_path();
    }
}
