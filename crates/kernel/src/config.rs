//! Simulation configuration, loaded from YAML.
//!
//! Every section is optional in the file; missing ones take their defaults.
//! ```yaml
//! seed: 42
//! camera:
//!   viewport: [1280.0, 720.0]
//!   min_zoom: 1.0
//!   max_zoom: 2.0
//! stream:
//!   start_tags: [start]
//!   spawn_threshold: 400.0
//! hazard:
//!   wait_time: 3.0
//! pacing:
//!   intro:
//!     - { scale: 0.5, duration: 1.0 }
//! ```

use descent_camera::CameraConfig;
use descent_hazard::HazardConfig;
use descent_pacing::PacingConfig;
use descent_stream::StreamConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescentConfig {
    /// Seed for section selection.
    pub seed: u64,
    pub camera: CameraConfig,
    pub stream: StreamConfig,
    pub hazard: HazardConfig,
    pub pacing: PacingConfig,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            camera: CameraConfig::default(),
            stream: StreamConfig::default(),
            hazard: HazardConfig::default(),
            pacing: PacingConfig::default(),
        }
    }
}

impl DescentConfig {
    pub fn from_yaml_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&data)?;
        tracing::info!(path = %path.as_ref().display(), seed = config.seed, "config loaded");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use descent_pacing::TimeScaleTransition;
    use glam::Vec2;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = DescentConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DescentConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = concat!(
            "seed: 7\n",
            "camera:\n",
            "  viewport: [800.0, 600.0]\n",
            "  max_zoom: 3.0\n",
            "hazard:\n",
            "  wait_time: 0.5\n",
        );
        let config = DescentConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.camera.viewport, Vec2::new(800.0, 600.0));
        assert_eq!(config.camera.max_zoom, 3.0);
        assert_eq!(config.camera.min_zoom, CameraConfig::default().min_zoom);
        assert_eq!(config.hazard.wait_time, 0.5);
        assert_eq!(config.hazard.max_speed, HazardConfig::default().max_speed);
        assert_eq!(config.stream, StreamConfig::default());
    }

    #[test]
    fn pacing_intro_parses() {
        let yaml = concat!(
            "pacing:\n",
            "  intro:\n",
            "    - { scale: 0.5, duration: 1.0 }\n",
            "    - { duration: 2.0 }\n",
        );
        let config = DescentConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.pacing.intro,
            vec![
                TimeScaleTransition::to_scale(0.5, 1.0),
                TimeScaleTransition::wait(2.0)
            ]
        );
    }

    #[test]
    fn round_trips_through_file() {
        let mut config = DescentConfig::default();
        config.seed = 1234;
        config.stream.spawn_threshold = 900.0;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("descent.yaml");
        std::fs::write(&path, config.to_yaml_string().unwrap()).unwrap();

        let loaded = DescentConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DescentConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = DescentConfig::from_yaml_str("seed: [not, a, number]").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
