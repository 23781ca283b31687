use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Map directory opened when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_map_dir: Option<PathBuf>,

    /// Show cursor coordinates in the info line
    #[serde(default = "default_true")]
    pub show_coordinates: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_map_dir: None,
            show_coordinates: true,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tilepick");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Drop an empty default dir rather than persisting ""
        let mut clean_config = self.clone();
        if clean_config
            .default_map_dir
            .as_ref()
            .map(|d| d.as_os_str().is_empty())
            .unwrap_or(false)
        {
            clean_config.default_map_dir = None;
        }

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            default_map_dir: Some(PathBuf::from("/srv/maps/overworld")),
            show_coordinates: false,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.default_map_dir, deserialized.default_map_dir);
        assert_eq!(config.show_coordinates, deserialized.show_coordinates);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.default_map_dir.is_none());
        assert!(config.show_coordinates, "Coordinates default to shown");
    }
}
