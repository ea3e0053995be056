use crate::error::{ExploreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tokens read as a missing value in addition to the empty field.
pub const DEFAULT_NULL_TOKENS: [&str; 9] = [
    "NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A", "n/a", "None",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReaderSettings {
    /// Field delimiter byte (default: `,`)
    pub delimiter: u8,
    pub null_tokens: Vec<String>,
    /// Rows scanned for type inference; `None` scans the whole file
    pub infer_schema_rows: Option<usize>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| (*t).to_owned()).collect(),
            infer_schema_rows: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    pub histogram_bins: usize,
    /// Evaluation points for every KDE curve (KDE plot, violins, scatter-matrix diagonal)
    pub kde_grid_points: usize,
    pub point_alpha: f32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            kde_grid_points: 200,
            point_alpha: 0.7,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// When set, a daily-rolling log file is written here as well
    pub log_dir: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    pub reader: ReaderSettings,
    pub charts: ChartSettings,
    pub logging: LoggingSettings,
    /// Rows shown in the raw-data preview (default: 10)
    pub preview_rows: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            reader: ReaderSettings::default(),
            charts: ChartSettings::default(),
            logging: LoggingSettings::default(),
            preview_rows: 10,
        }
    }
}

impl ExplorerConfig {
    /// Checks values that would make a stage misbehave rather than fail cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`ExploreError::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.charts.histogram_bins == 0 {
            return Err(ExploreError::Config(
                "charts.histogram_bins must be at least 1".to_owned(),
            ));
        }
        if self.charts.kde_grid_points < 2 {
            return Err(ExploreError::Config(
                "charts.kde_grid_points must be at least 2".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.charts.point_alpha) {
            return Err(ExploreError::Config(
                "charts.point_alpha must be between 0 and 1".to_owned(),
            ));
        }
        if matches!(self.reader.delimiter, b'"' | b'\n' | b'\r') {
            return Err(ExploreError::Config(format!(
                "reader.delimiter {:?} cannot be used as a field separator",
                char::from(self.reader.delimiter)
            )));
        }
        Ok(())
    }
}

/// Loads a JSON config file. Missing fields fall back to their defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or fails
/// [`ExplorerConfig::validate`].
pub fn load_config(path: &Path) -> Result<ExplorerConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ExplorerConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Writes the config as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config(config: &ExplorerConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExplorerConfig::default();
        assert_eq!(config.reader.delimiter, b',');
        assert_eq!(config.charts.histogram_bins, 20);
        assert_eq!(config.charts.kde_grid_points, 200);
        assert!(config.validate().is_ok(), "defaults should validate");
    }

    #[test]
    fn test_config_round_trip_through_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir()
            .join(format!("tablescope_config_{}", std::process::id()))
            .join("config.json");

        let mut config = ExplorerConfig::default();
        config.charts.histogram_bins = 12;
        config.preview_rows = 5;
        save_config(&config, &path)?;

        let loaded = load_config(&path)?;
        assert_eq!(loaded, config);

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    #[test]
    fn test_partial_json_uses_defaults() -> anyhow::Result<()> {
        let config: ExplorerConfig = serde_json::from_str(r#"{"charts": {"histogram_bins": 8}}"#)?;
        assert_eq!(config.charts.histogram_bins, 8);
        assert_eq!(config.charts.kde_grid_points, 200);
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.reader, ReaderSettings::default());
        Ok(())
    }

    #[test]
    fn test_rejects_zero_bins() {
        let mut config = ExplorerConfig::default();
        config.charts.histogram_bins = 0;
        let err = config.validate().expect_err("zero bins should be rejected");
        assert!(err.to_string().contains("histogram_bins"));
    }
}
