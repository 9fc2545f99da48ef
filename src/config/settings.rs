//! User settings for the budget ledger

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;

/// Persisted preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Spent percentage at which a budget is reported as near its limit
    #[serde(default = "default_near_limit_percent")]
    pub near_limit_percent: u8,

    /// Run the expiration sweep for the selected user before each command
    #[serde(default = "default_true")]
    pub sweep_on_start: bool,

    /// Append mutations to the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Username used when `--user` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_near_limit_percent() -> u8 {
    80
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            near_limit_percent: default_near_limit_percent(),
            sweep_on_start: true,
            audit_enabled: true,
            default_user: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.near_limit_percent == 0 || self.near_limit_percent > 100 {
            return Err(LedgerError::Config(format!(
                "near_limit_percent must be between 1 and 100, got {}",
                self.near_limit_percent
            )));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.near_limit_percent, 80);
        assert!(settings.sweep_on_start);
        assert!(settings.audit_enabled);
        assert!(settings.default_user.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.near_limit_percent = 90;
        settings.default_user = Some("alice".into());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.near_limit_percent, 90);
        assert_eq!(loaded.default_user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str("{\"sweep_on_start\": false}").unwrap();
        assert!(!settings.sweep_on_start);
        assert_eq!(settings.near_limit_percent, 80);
        assert!(settings.audit_enabled);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{\"near_limit_percent\": 0}").unwrap();

        assert!(matches!(
            Settings::load_or_create(&paths),
            Err(LedgerError::Config(_))
        ));
    }
}
