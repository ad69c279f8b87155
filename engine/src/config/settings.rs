// Engine settings, loaded from a JSON file and environment variables
use std::path::Path;

use serde::Deserialize;
use shared::number_format::{infer_format, NumberFormatSpec};

use crate::error::EngineError;

pub const CONFIG_PATH_VAR: &str = "SUPPLY_PLANNER_CONFIG";
pub const HOST_VAR: &str = "SUPPLY_PLANNER_HOST";
pub const PORT_VAR: &str = "SUPPLY_PLANNER_PORT";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    // Format descriptor the host UI renders numbers with, e.g. "#,###.##"
    pub number_format: String,
    pub csv_delimiter: char,
    // Days between today and the schedule date of drafted lines
    pub schedule_lead_days: u32,
    pub default_company: Option<String>,
    pub report_chunk_size: usize,
    // Optional data loaded at startup
    pub bins_path: Option<String>,
    pub items_path: Option<String>,
    pub suppliers_path: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50051,
            number_format: "#,###.##".to_string(),
            csv_delimiter: ';',
            schedule_lead_days: 7,
            default_company: None,
            report_chunk_size: 100,
            bins_path: None,
            items_path: None,
            suppliers_path: None,
        }
    }
}

impl EngineSettings {
    /// Reads settings from a JSON file; fields it leaves out keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, then the file named by `SUPPLY_PLANNER_CONFIG`, then the
    /// host/port environment overrides.
    pub fn load() -> Result<Self, EngineError> {
        let mut settings = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                tracing::info!(path = %path, "Loading engine settings from file");
                Self::from_file(path)?
            }
            Err(_) => EngineSettings::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_VAR) {
            self.host = host;
        }
        if let Some(port) = lookup(PORT_VAR) {
            self.port = port.parse().map_err(|_| {
                let message = format!("{} must be a port number, got '{}'", PORT_VAR, port);
                EngineError::ConfigError(message)
            })?;
        }
        Ok(())
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.report_chunk_size == 0 {
            return Err(EngineError::ConfigError(
                "report_chunk_size must be greater than 0".to_string(),
            ));
        }
        if !self.csv_delimiter.is_ascii() {
            return Err(EngineError::ConfigError(format!(
                "csv_delimiter must be an ASCII character, got '{}'",
                self.csv_delimiter
            )));
        }
        Ok(())
    }

    pub fn number_format_spec(&self) -> NumberFormatSpec {
        infer_format(&self.number_format)
    }

    pub fn delimiter(&self) -> u8 {
        // validate() guarantees ASCII
        self.csv_delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::number_format::Separator;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{ "port": 6000, "number_format": "#.###,##", "default_company": "Acme SP" }}"##
        )
        .unwrap();

        let settings = EngineSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.schedule_lead_days, 7);
        assert_eq!(settings.default_company.as_deref(), Some("Acme SP"));
        assert_eq!(settings.number_format_spec().decimal(), Separator::Comma);
        assert_eq!(settings.number_format_spec().thousands(), Separator::Period);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "report_chunk_size": 0 }}"#).unwrap();
        let err = EngineSettings::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("report_chunk_size"));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            EngineSettings::from_file(file.path()),
            Err(EngineError::ConfigFileError { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            [(HOST_VAR, "0.0.0.0"), (PORT_VAR, "7000")].into_iter().collect();
        let mut settings = EngineSettings::default();
        settings
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 7000);

        let mut settings = EngineSettings::default();
        let err = settings
            .apply_overrides(|key| (key == PORT_VAR).then(|| "seventy".to_string()))
            .unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }
}
