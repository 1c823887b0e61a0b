use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_speed() -> f64 {
    1.0
}
const fn default_hover_height() -> f64 {
    0.25
}
const fn default_grasp_height() -> f64 {
    0.105
}
const fn default_lift_height() -> f64 {
    0.35
}
const fn default_release_clearance() -> f64 {
    0.02
}
const fn default_cell_pitch() -> f64 {
    0.09
}
const fn default_layer_height() -> f64 {
    0.06
}

// ---------------------------------------------------------------------------
// PlaceMode
// ---------------------------------------------------------------------------

/// How placed items are laid out in the drop zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceMode {
    /// Every item is released at the drop-zone origin.
    Fixed,
    /// Items fill a 3x3 grid, then stack upward layer by layer.
    #[default]
    Stack,
}

impl PlaceMode {
    /// Pacing multiplier applied to every phase duration in this mode.
    ///
    /// Stacking runs slightly slower: the release point sits on top of
    /// previously placed items, so trajectories get more settling time.
    #[must_use]
    pub const fn duration_multiplier(self) -> f64 {
        match self {
            Self::Fixed => 1.0,
            Self::Stack => 1.15,
        }
    }
}

// ---------------------------------------------------------------------------
// DropZoneConfig
// ---------------------------------------------------------------------------

/// Drop-zone placement geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropZoneConfig {
    /// World-space center of the placement grid (grid cell 4).
    pub origin: [f64; 3],
    /// Horizontal spacing between grid cells (meters).
    #[serde(default = "default_cell_pitch")]
    pub cell_pitch: f64,
    /// Vertical offset added per completed grid layer (meters).
    #[serde(default = "default_layer_height")]
    pub layer_height: f64,
}

// ---------------------------------------------------------------------------
// SequenceConfig
// ---------------------------------------------------------------------------

/// Configuration for one pick-and-place run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Global playback speed multiplier (>= 1). Scales elapsed-time
    /// accumulation; stored phase durations are never mutated.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Placement layout mode.
    #[serde(default)]
    pub place_mode: PlaceMode,

    /// Height above a pick target for the approach/hover phases (meters).
    #[serde(default = "default_hover_height")]
    pub hover_height: f64,

    /// Height above a pick target at which the gripper closes (meters).
    #[serde(default = "default_grasp_height")]
    pub grasp_height: f64,

    /// Height above pick/drop positions for transit phases (meters).
    #[serde(default = "default_lift_height")]
    pub lift_height: f64,

    /// Extra clearance above the computed drop slot at release (meters).
    #[serde(default = "default_release_clearance")]
    pub release_clearance: f64,

    /// Drop-zone geometry. `start()` is a no-op while this is unset.
    #[serde(default)]
    pub drop_zone: Option<DropZoneConfig>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            place_mode: PlaceMode::default(),
            hover_height: default_hover_height(),
            grasp_height: default_grasp_height(),
            lift_height: default_lift_height(),
            release_clearance: default_release_clearance(),
            drop_zone: None,
        }
    }
}

impl SequenceConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed < 1.0 {
            return Err(ConfigError::InvalidSpeed(self.speed));
        }
        for (field, value) in [
            ("hover_height", self.hover_height),
            ("grasp_height", self.grasp_height),
            ("lift_height", self.lift_height),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: "must be positive".into(),
                });
            }
        }
        if let Some(zone) = &self.drop_zone {
            if zone.cell_pitch <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "drop_zone.cell_pitch".into(),
                    message: "must be positive".into(),
                });
            }
            if zone.layer_height <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "drop_zone.layer_height".into(),
                    message: "must be positive".into(),
                });
            }
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = SequenceConfig::default();
        assert!((cfg.speed - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.place_mode, PlaceMode::Stack);
        assert!((cfg.hover_height - 0.25).abs() < f64::EPSILON);
        assert!((cfg.grasp_height - 0.105).abs() < f64::EPSILON);
        assert!((cfg.lift_height - 0.35).abs() < f64::EPSILON);
        assert!(cfg.drop_zone.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn speed_below_one_rejected() {
        let cfg = SequenceConfig {
            speed: 0.5,
            ..SequenceConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::InvalidSpeed(_)
        ));
    }

    #[test]
    fn negative_height_rejected() {
        let cfg = SequenceConfig {
            lift_height: -0.1,
            ..SequenceConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn bad_drop_zone_rejected() {
        let cfg = SequenceConfig {
            drop_zone: Some(DropZoneConfig {
                origin: [0.0, -0.5, 0.05],
                cell_pitch: 0.0,
                layer_height: 0.06,
            }),
            ..SequenceConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn mode_multipliers() {
        assert!((PlaceMode::Fixed.duration_multiplier() - 1.0).abs() < f64::EPSILON);
        assert!((PlaceMode::Stack.duration_multiplier() - 1.15).abs() < f64::EPSILON);
    }

    #[test]
    fn toml_deserialization() {
        let toml_str = r#"
            speed = 2.0
            place_mode = "stack"
            hover_height = 0.3

            [drop_zone]
            origin = [0.0, -0.5, 0.05]
            cell_pitch = 0.08
        "#;
        let cfg: SequenceConfig = toml::from_str(toml_str).unwrap();
        assert!((cfg.speed - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.place_mode, PlaceMode::Stack);
        assert!((cfg.hover_height - 0.3).abs() < f64::EPSILON);
        let zone = cfg.drop_zone.unwrap();
        assert!((zone.cell_pitch - 0.08).abs() < f64::EPSILON);
        // layer_height falls back to its serde default
        assert!((zone.layer_height - 0.06).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn toml_defaults() {
        let cfg: SequenceConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, SequenceConfig::default());
    }

    #[test]
    fn from_file_round_trip() {
        let dir = std::env::temp_dir().join("graspers_test_sequence_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sequence.toml");
        std::fs::write(
            &path,
            r#"
            speed = 4.0

            [drop_zone]
            origin = [0.1, -0.4, 0.0]
        "#,
        )
        .unwrap();

        let cfg = SequenceConfig::from_file(&path).unwrap();
        assert!((cfg.speed - 4.0).abs() < f64::EPSILON);
        assert!(cfg.drop_zone.is_some());

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn from_file_invalid_speed() {
        let dir = std::env::temp_dir().join("graspers_test_sequence_config_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "speed = 0.25").unwrap();

        assert!(SequenceConfig::from_file(&path).is_err());

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn from_file_not_found() {
        assert!(SequenceConfig::from_file("/nonexistent/graspers.toml").is_err());
    }
}
