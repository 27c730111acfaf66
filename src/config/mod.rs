//! Application Configuration
//!
//! Analysis tuning stored in TOML format. Every section falls back to its
//! defaults, so a config file only needs the values it changes.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::GroupingConfig;
use crate::capture::CaptureConfig;
use crate::overlay::AnchorConfig;
use crate::pipeline::PipelineSettings;
use crate::vision::DetectionConfig;

/// Name of the config file inside [`config_dir`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Image loading settings
    pub capture: CaptureConfig,
    /// White label detection settings
    pub detection: DetectionConfig,
    /// Text block grouping settings
    pub grouping: GroupingConfig,
    /// Marker placement settings
    pub overlay: AnchorConfig,
    /// Pipeline execution settings
    pub pipeline: PipelineSettings,
}

/// Per-user configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "shelf-price", "shelf-price")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("Invalid config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check capture defaults
        assert_eq!(config.capture.max_dimension, Some(1920));

        // Check detection defaults
        assert_eq!(config.detection.block_size, 50);
        assert_eq!(config.detection.brightness_threshold, 200);
        assert!((config.detection.block_white_fraction - 0.7).abs() < 0.01);
        assert!((config.detection.edge_white_fraction - 0.6).abs() < 0.01);
        assert_eq!((config.detection.min_width, config.detection.max_width), (80, 500));
        assert_eq!((config.detection.min_height, config.detection.max_height), (60, 400));

        // Check grouping defaults
        assert!((config.grouping.region_overlap_ratio - 0.3).abs() < 0.01);
        assert!((config.grouping.proximity_distance - 200.0).abs() < 0.01);
        assert_eq!(config.grouping.column_distance, 150);
        assert_eq!(config.grouping.min_region_products, 2);

        // Check overlay defaults
        assert_eq!(config.overlay.lift, 40);
        assert_eq!(config.overlay.half_extent, 25);

        assert!(config.pipeline.parallel);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.detection.block_size, parsed.detection.block_size);
        assert_eq!(config.grouping.column_distance, parsed.grouping.column_distance);
        assert_eq!(config.overlay, parsed.overlay);
        assert_eq!(config.pipeline.parallel, parsed.pipeline.parallel);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [detection]
            brightness_threshold = 180

            [pipeline]
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(parsed.detection.brightness_threshold, 180);
        assert_eq!(parsed.detection.block_size, 50);
        assert!(!parsed.pipeline.parallel);
        assert_eq!(parsed.grouping.min_region_products, 2);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.grouping.proximity_distance = 120.0;
        config.capture.max_dimension = Some(800);

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert!((loaded.grouping.proximity_distance - 120.0).abs() < 0.01);
        assert_eq!(loaded.capture.max_dimension, Some(800));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
