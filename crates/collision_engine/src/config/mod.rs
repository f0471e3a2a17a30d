//! Configuration system
//!
//! Every config type implements [`Config`], which picks TOML or RON by file
//! extension. [`CollisionConfig`] drives the broad-phase index and the
//! collision manager.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            Self::from_toml_str(&contents)
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Parse configuration from a TOML document
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed fine but is out of range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Default leaf occupancy of the broad-phase tree
pub const DEFAULT_MAX_LEAF_SIZE: usize = 8;

/// Collision subsystem configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Maximum number of shapes stored in one BVH leaf
    pub max_leaf_size: usize,

    /// Log per-frame statistics at debug level after every update
    pub log_frame_stats: bool,

    /// Debug visualization settings
    pub debug: DebugDrawConfig,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
            log_frame_stats: false,
            debug: DebugDrawConfig::default(),
        }
    }
}

impl CollisionConfig {
    /// Check that every field is within its supported range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_leaf_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_leaf_size",
                reason: "leaves must hold at least one shape".to_string(),
            });
        }
        self.debug.validate()
    }
}

impl Config for CollisionConfig {}

/// Debug drawing colors and toggles (RGBA, each channel in `0.0..=1.0`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugDrawConfig {
    /// Draw the broad-phase tree
    pub draw_bvh: bool,
    /// Draw collider shapes
    pub draw_colliders: bool,
    /// Color for BVH leaf nodes
    pub leaf_color: [f32; 4],
    /// Color for BVH internal nodes
    pub internal_color: [f32; 4],
    /// Color for colliders with no current overlaps
    pub collider_color: [f32; 4],
    /// Color for colliders that overlap something
    pub overlapping_color: [f32; 4],
}

impl Default for DebugDrawConfig {
    fn default() -> Self {
        Self {
            draw_bvh: true,
            draw_colliders: true,
            leaf_color: [1.0, 0.2, 0.0, 1.0],
            internal_color: [1.0, 0.8, 0.0, 1.0],
            collider_color: [0.0, 1.0, 0.0, 0.3],
            overlapping_color: [1.0, 0.0, 0.0, 0.5],
        }
    }
}

impl DebugDrawConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let colors = [
            ("debug.leaf_color", self.leaf_color),
            ("debug.internal_color", self.internal_color),
            ("debug.collider_color", self.collider_color),
            ("debug.overlapping_color", self.overlapping_color),
        ];
        for (field, color) in colors {
            if color.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("channels must be within 0..=1, got {color:?}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CollisionConfig::default();
        assert_eq!(config.max_leaf_size, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CollisionConfig::from_toml_str("max_leaf_size = 4\n").unwrap();
        assert_eq!(config.max_leaf_size, 4);
        assert!(!config.log_frame_stats);
        assert_eq!(config.debug, DebugDrawConfig::default());
    }

    #[test]
    fn test_zero_leaf_size_rejected() {
        let config = CollisionConfig::from_toml_str("max_leaf_size = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "max_leaf_size", .. })
        ));
    }

    #[test]
    fn test_bad_color_rejected() {
        let toml = "[debug]\nleaf_color = [2.0, 0.0, 0.0, 1.0]\n";
        let config = CollisionConfig::from_toml_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let config = CollisionConfig::default();
        assert!(matches!(
            config.save_to_file("collision.json"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join("collision_engine_config_test.ron");
        let path = path.to_string_lossy().to_string();
        let config = CollisionConfig {
            max_leaf_size: 3,
            log_frame_stats: true,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = CollisionConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
