//! Configuration loading for .goanalyze.toml

use std::collections::HashMap;

use garde::Validate;
use goanalyze_abi::Severity;
use serde::{Deserialize, Serialize};

use crate::pass::MAX_INFERENCE_DEPTH;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".goanalyze.toml";

/// Root configuration from .goanalyze.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub inspection: HashMap<String, InspectionSettings>,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Settings for one inspection, keyed by inspection name.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[garde(context(()))]
pub struct InspectionSettings {
    #[garde(skip)]
    pub enabled: Option<bool>,
    #[garde(custom(validate_severity))]
    pub severity: Option<String>,

    // Printf inspection settings
    #[garde(custom(validate_format_positions))]
    pub extra_formatting_functions: Option<HashMap<String, usize>>,
    #[garde(skip)]
    pub extra_printing_functions: Option<Vec<String>>,
    #[garde(skip)]
    pub check_argument_types: Option<bool>,
}

impl InspectionSettings {
    /// Configured severity, if any and valid.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity.as_deref().and_then(Severity::parse)
    }
}

/// Engine-wide knobs.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[garde(context(()))]
pub struct AnalysisSettings {
    #[garde(custom(validate_max_inference_depth))]
    pub max_inference_depth: Option<usize>,
}

// ============================================================================
// Custom Validators
// Note: garde requires `&Option<T>` and `&()` signatures - clippy lints suppressed
// ============================================================================

#[allow(
    clippy::ref_option,
    clippy::trivially_copy_pass_by_ref,
    clippy::option_if_let_else
)]
fn validate_severity(value: &Option<String>, _ctx: &()) -> garde::Result {
    if let Some(v) = value {
        match Severity::parse(v) {
            Some(_) => Ok(()),
            None => Err(garde::Error::new(format!(
                "'{v}' is not a valid severity - use 'error', 'warning', 'weak-warning', or 'info'"
            ))),
        }
    } else {
        Ok(())
    }
}

#[allow(
    clippy::ref_option,
    clippy::trivially_copy_pass_by_ref,
    clippy::option_if_let_else
)]
fn validate_format_positions(value: &Option<HashMap<String, usize>>, _ctx: &()) -> garde::Result {
    if let Some(functions) = value {
        for (name, position) in functions {
            if name.is_empty() {
                return Err(garde::Error::new("function name must not be empty"));
            }
            if *position > 8 {
                return Err(garde::Error::new(format!(
                    "format position {position} of '{name}' is outside the range 0-8"
                )));
            }
        }
        Ok(())
    } else {
        Ok(())
    }
}

#[allow(
    clippy::ref_option,
    clippy::trivially_copy_pass_by_ref,
    clippy::option_if_let_else
)]
fn validate_max_inference_depth(value: &Option<usize>, _ctx: &()) -> garde::Result {
    if let Some(v) = value {
        if (16..=MAX_INFERENCE_DEPTH).contains(v) {
            Ok(())
        } else {
            Err(garde::Error::new(format!(
                "{v} is outside the range 16-{MAX_INFERENCE_DEPTH} - the default is 256"
            )))
        }
    } else {
        Ok(())
    }
}

// ============================================================================
// Config Error
// ============================================================================

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Config Loading
// ============================================================================

impl AnalyzerConfig {
    /// Parse and validate configuration text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML content is invalid.
    /// Returns `ConfigError::Validation` if settings fail validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        for (name, settings) in &config.inspection {
            settings
                .validate()
                .map_err(|e| ConfigError::Validation(format!("inspection.{name}: {e}")))?;
        }
        config
            .analysis
            .validate()
            .map_err(|e| ConfigError::Validation(format!("analysis: {e}")))?;

        Ok(config)
    }

    /// Load configuration from a TOML file with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read.
    /// Returns `ConfigError::Parse` if the TOML content is invalid.
    /// Returns `ConfigError::Validation` if settings fail validation.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load from default location (.goanalyze.toml in current directory)
    #[must_use]
    pub fn load_default() -> Option<Self> {
        let cwd = std::env::current_dir().ok()?;
        let config_path = cwd.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return None;
        }

        match Self::from_file(&config_path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring {}: {e}", config_path.display());
                None
            }
        }
    }

    /// Load from default location, returning error details on failure.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` with details if loading or validation fails.
    pub fn load_default_strict() -> Result<Option<Self>, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(e.to_string()))?;
        let config_path = cwd.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::from_file(&config_path).map(Some)
    }

    /// Settings of the named inspection, if configured.
    #[must_use]
    pub fn settings(&self, inspection: &str) -> Option<&InspectionSettings> {
        self.inspection.get(inspection)
    }

    /// Inspections are on unless explicitly disabled.
    #[must_use]
    pub fn is_enabled(&self, inspection: &str) -> bool {
        self.settings(inspection)
            .and_then(|s| s.enabled)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_config() {
        let toml = r#"
[inspection.assignment-count]
enabled = true
severity = "warning"

[inspection.printf]
extra_formatting_functions = { "myprintf" = 0, "logto" = 1 }
extra_printing_functions = ["logln"]
check_argument_types = false

[analysis]
max_inference_depth = 128
"#;

        let config = AnalyzerConfig::from_toml(toml).unwrap();

        let assign = config.settings("assignment-count").unwrap();
        assert_eq!(assign.severity(), Some(Severity::Warning));

        let printf = config.settings("printf").unwrap();
        let extra = printf.extra_formatting_functions.as_ref().unwrap();
        assert_eq!(extra.get("logto"), Some(&1));
        assert_eq!(printf.check_argument_types, Some(false));
        assert_eq!(config.analysis.max_inference_depth, Some(128));
    }

    #[test]
    fn missing_sections_default() {
        let config = AnalyzerConfig::from_toml("").unwrap();
        assert!(config.inspection.is_empty());
        assert!(config.is_enabled("printf"));
        assert_eq!(config.analysis.max_inference_depth, None);
    }

    #[test]
    fn disabled_inspection_is_reported() {
        let config = AnalyzerConfig::from_toml("[inspection.printf]\nenabled = false\n").unwrap();
        assert!(!config.is_enabled("printf"));
        assert!(config.is_enabled("assignment-count"));
    }

    #[test]
    fn rejects_invalid_severity() {
        let settings = InspectionSettings {
            severity: Some("fatal".to_string()),
            ..Default::default()
        };

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("weak-warning"));
    }

    #[test]
    fn rejects_depth_out_of_range() {
        let err = AnalyzerConfig::from_toml("[analysis]\nmax_inference_depth = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("16-1024"));
    }

    #[test]
    fn rejects_far_format_position() {
        let settings = InspectionSettings {
            extra_formatting_functions: Some(HashMap::from([("f".to_string(), 12)])),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_negative_depth_at_parse() {
        let result = AnalyzerConfig::from_toml("[analysis]\nmax_inference_depth = -1\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[inspection.printf]\nseverity = \"info\"\n").unwrap();

        let config = AnalyzerConfig::from_file(&path).unwrap();
        assert_eq!(
            config.settings("printf").and_then(InspectionSettings::severity),
            Some(Severity::Info)
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AnalyzerConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn accepts_none_values() {
        assert!(InspectionSettings::default().validate().is_ok());
        assert!(AnalysisSettings::default().validate().is_ok());
    }
}
