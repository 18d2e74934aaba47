use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings validation errors
#[derive(Debug, Clone)]
pub struct SettingsValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for SettingsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of settings validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<SettingsValidationError>,
    pub warnings: Vec<SettingsValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(SettingsValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(SettingsValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Application settings.
///
/// Passed by construction to the credential store and the calendar client;
/// there is no process-wide settings singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the Google client-secrets file used for first-time authorization
    pub credentials_file: PathBuf,

    /// Path to the persisted OAuth token
    pub token_file: PathBuf,

    /// Target calendar identifier
    pub calendar_id: String,

    /// IANA timezone name used to stamp outgoing timestamps
    pub timezone: String,

    /// Model identifier handed to the intent-parsing collaborator
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        let dir = default_dir();
        Self {
            credentials_file: dir.join("credentials.json"),
            token_file: dir.join("token.json"),
            calendar_id: "primary".to_string(),
            timezone: "Europe/Athens".to_string(),
            model: "gpt-5-mini".to_string(),
        }
    }
}

fn default_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempo")
}

impl Settings {
    /// Load settings from file, creating defaults if no file exists.
    ///
    /// Environment variables (`TEMPO_CREDENTIALS_FILE`, `TEMPO_TOKEN_FILE`,
    /// `TEMPO_CALENDAR_ID`, `TEMPO_TIMEZONE`, `TEMPO_MODEL`) override file
    /// values.
    pub fn load() -> Result<Self> {
        let path = Self::settings_path()?;

        let mut settings = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read settings file")?;
            toml::from_str(&contents).context("Failed to parse settings file")?
        } else {
            let settings = Self::default();
            settings.save()?;
            settings
        };

        settings.apply_env();
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, contents).context("Failed to write settings file")?;

        Ok(())
    }

    fn settings_path() -> Result<PathBuf> {
        Ok(default_dir().join("config.toml"))
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("TEMPO_CREDENTIALS_FILE") {
            self.credentials_file = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("TEMPO_TOKEN_FILE") {
            self.token_file = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("TEMPO_CALENDAR_ID") {
            self.calendar_id = value;
        }
        if let Ok(value) = std::env::var("TEMPO_TIMEZONE") {
            self.timezone = value;
        }
        if let Ok(value) = std::env::var("TEMPO_MODEL") {
            self.model = value;
        }
    }

    /// Parse the configured IANA timezone name.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown IANA timezone: {}", self.timezone))
    }

    /// Validate the settings.
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.timezone.parse::<Tz>().is_err() {
            result.add_error(
                "timezone",
                format!("Unknown IANA timezone: {}", self.timezone),
            );
        }

        if self.calendar_id.trim().is_empty() {
            result.add_error("calendar_id", "Calendar identifier must not be empty");
        }

        if !self.credentials_file.exists() {
            result.add_warning(
                "credentials_file",
                format!(
                    "File does not exist: {} (only needed for first-time authorization)",
                    self.credentials_file.display()
                ),
            );
        }

        if self.model.trim().is_empty() {
            result.add_warning("model", "No model configured for the agent collaborator");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        let result = settings.validate();
        assert!(
            result.is_valid(),
            "default settings should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_unknown_timezone_is_an_error() {
        let settings = Settings {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Settings::default()
        };
        let result = settings.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "timezone"));
        assert!(settings.tz().is_err());
    }

    #[test]
    fn test_empty_calendar_id_is_an_error() {
        let settings = Settings {
            calendar_id: "  ".to_string(),
            ..Settings::default()
        };
        let result = settings.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "calendar_id"));
    }

    #[test]
    fn test_missing_credentials_file_is_a_warning() {
        let settings = Settings {
            credentials_file: PathBuf::from("/nonexistent/credentials.json"),
            ..Settings::default()
        };
        let result = settings.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "credentials_file"));
    }

    #[test]
    fn test_tz_parses_configured_zone() {
        let settings = Settings::default();
        assert_eq!(settings.tz().ok(), Some(chrono_tz::Europe::Athens));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_settings_toml_round_trip() {
        let settings = Settings::default();
        let serialized = toml::to_string_pretty(&settings).ok();
        assert!(serialized.is_some());
        let parsed: Option<Settings> = serialized.and_then(|s| toml::from_str(&s).ok());
        assert_eq!(parsed.map(|p| p.calendar_id), Some("primary".to_string()));
    }
}
