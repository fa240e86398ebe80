mod loader;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use loader::load_config;

use crate::MIN_LIGHT_MAGNITUDE;

/// Highest frame rate the viewer accepts
pub const MAX_FPS: u32 = 240;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub light: LightConfig,
}

/// Frame pacing and screen layout
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Frames per second of the interactive loop
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Keep the bottom row for a help/status line
    #[serde(default = "default_status_line")]
    pub status_line: bool,
}

fn default_fps() -> u32 {
    50
}

fn default_status_line() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            status_line: default_status_line(),
        }
    }
}

/// Initial light direction
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LightConfig {
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
}

fn default_light_direction() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
        }
    }
}

impl LightConfig {
    pub fn vector(&self) -> Vector3<f32> {
        Vector3::from(self.direction)
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load the given file, else the first default location that exists, else the
    /// built-in defaults
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let default_paths = ["boxy.yaml", "boxy.yml"];
                for p in default_paths {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fps = self.display.fps;
        if fps == 0 || fps > MAX_FPS {
            return Err(ConfigError::Validation(format!(
                "display.fps must be between 1 and {}, got {}",
                MAX_FPS, fps
            )));
        }

        let magnitude = self.light.vector().norm();
        if !(magnitude > MIN_LIGHT_MAGNITUDE) {
            return Err(ConfigError::Validation(format!(
                "light.direction {:?} is too short to normalize",
                self.light.direction
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.display.fps, 50);
        assert!(config.display.status_line);
        assert_eq!(config.light.direction, [0.0, 1.0, 0.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_light_vector() {
        let light = LightConfig {
            direction: [1.0, 2.0, 3.0],
        };
        assert_eq!(light.vector(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_validate_fps_range() {
        let mut config = AppConfig::default();
        config.display.fps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.display.fps = MAX_FPS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.display.fps = MAX_FPS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_light_magnitude() {
        let mut config = AppConfig::default();
        config.light.direction = [0.0, 0.0005, 0.0];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("light.direction"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound("boxy.yaml".to_string());
        assert!(err.to_string().contains("boxy.yaml"));

        let err = ConfigError::Parse(serde_yaml::from_str::<AppConfig>("display: 3").unwrap_err());
        assert!(err.to_string().contains("parse"));

        let err = ConfigError::Validation("fps".to_string());
        assert!(err.to_string().contains("fps"));
    }

    #[test]
    fn test_load_or_default_with_missing_path() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/boxy.yaml")));
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_config_serde_round_trip_yaml() {
        let mut config = AppConfig::default();
        config.display.fps = 25;
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.display.fps, 25);
        assert_eq!(parsed.light.direction, config.light.direction);
    }
}
