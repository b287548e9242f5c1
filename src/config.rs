//! Configuration types for the particle backdrop.
//!
//! Every value has a default matching the stock look of the effect, and all
//! sections are `#[serde(default)]`, so a JSON file only needs the keys it
//! wants to change:
//!
//! ```json
//! { "field": { "particle_count": 500 }, "seed": 7 }
//! ```

use crate::error::ConfigError;
use crate::pointer::{
    MAX_DAMPING_PER_MASS, MAX_SAMPLE_RATE_HZ, MAX_STIFFNESS_PER_MASS, MIN_SAMPLE_RATE_HZ,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tuning for the particle field simulation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles. Fixed for the lifetime of a field.
    pub particle_count: u32,
    /// Half-extent of the box home positions are drawn from, per axis.
    pub home_extent: [f32; 3],
    /// Half-range of the initial velocity, per axis.
    pub initial_velocity: [f32; 3],
    /// Range the per-particle drift multiplier is drawn from.
    pub speed_range: (f32, f32),
    /// Gain of the pull back toward each particle's home position.
    pub home_strength: f32,
    /// Animation clock rate relative to wall time.
    pub time_rate: f32,
    /// Multiplier from NDC pointer coordinates to field units.
    pub pointer_scale: f32,
    /// Scale applied to the per-frame pointer displacement.
    pub pointer_velocity_scale: f32,
    /// Peak attraction toward the pointer.
    pub pointer_force: f32,
    /// How quickly attraction saturates with pointer speed.
    pub pointer_move_gain: f32,
    /// Distance falloff of the attraction.
    pub pointer_falloff: f32,
    /// How strongly particles follow the pointer's motion.
    pub pointer_trail: f32,
    /// Velocity retention per frame on x and y.
    pub planar_damping: f32,
    /// Velocity retention per frame on z.
    pub depth_damping: f32,
    /// Drift amplitude on x and y.
    pub flow_amplitude: f32,
    /// Drift amplitude on z.
    pub depth_flow_amplitude: f32,
    /// Velocity to position scale per second.
    pub integration_scale: f32,
    /// Half-width of the soft containment cube.
    pub bound: f32,
    /// Velocity correction applied per frame outside the bound.
    pub softness: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 200,
            home_extent: [7.5, 7.5, 5.0],
            initial_velocity: [0.005, 0.005, 0.0025],
            speed_range: (0.2, 0.5),
            home_strength: 0.001,
            time_rate: 0.8,
            pointer_scale: 1.0,
            pointer_velocity_scale: 3.0,
            pointer_force: 0.15,
            pointer_move_gain: 2.0,
            pointer_falloff: 0.4,
            pointer_trail: 0.04,
            planar_damping: 0.85,
            depth_damping: 0.9,
            flow_amplitude: 0.03,
            depth_flow_amplitude: 0.015,
            integration_scale: 5.0,
            bound: 25.0,
            softness: 0.08,
        }
    }
}

impl FieldConfig {
    /// Check that the values describe a field that can be simulated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid("particle_count must be > 0".into()));
        }
        if !self.bound.is_finite() || self.bound <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bound must be a positive finite number, got {}",
                self.bound
            )));
        }
        if !self.softness.is_finite() || self.softness < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "softness must be >= 0, got {}",
                self.softness
            )));
        }
        for (name, value) in [
            ("planar_damping", self.planar_damping),
            ("depth_damping", self.depth_damping),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        let (lo, hi) = self.speed_range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(ConfigError::Invalid(format!(
                "speed_range must be an ordered finite pair, got ({}, {})",
                lo, hi
            )));
        }
        if self
            .home_extent
            .iter()
            .chain(self.initial_velocity.iter())
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(ConfigError::Invalid(
                "home_extent and initial_velocity must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Spring and sampling settings for the pointer tracker.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Rate of the background sampling loop.
    pub sample_rate_hz: f32,
    /// Return the pointer to the centre when the cursor leaves the window.
    pub recenter_on_leave: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            stiffness: 50.0,
            damping: 12.0,
            mass: 1.0,
            sample_rate_hz: 120.0,
            recenter_on_leave: false,
        }
    }
}

impl PointerConfig {
    /// Check that the spring stays stable and the sampling rate is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pointer mass must be a positive finite number, got {}",
                self.mass
            )));
        }
        if !self.stiffness.is_finite()
            || self.stiffness <= 0.0
            || self.stiffness / self.mass > MAX_STIFFNESS_PER_MASS
        {
            return Err(ConfigError::Invalid(format!(
                "pointer stiffness must be within (0, {}] per unit mass, got {}",
                MAX_STIFFNESS_PER_MASS, self.stiffness
            )));
        }
        if !self.damping.is_finite()
            || self.damping < 0.0
            || self.damping / self.mass > MAX_DAMPING_PER_MASS
        {
            return Err(ConfigError::Invalid(format!(
                "pointer damping must be within [0, {}] per unit mass, got {}",
                MAX_DAMPING_PER_MASS, self.damping
            )));
        }
        if !(MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ).contains(&self.sample_rate_hz) {
            return Err(ConfigError::Invalid(format!(
                "sample_rate_hz must be within [{}, {}], got {}",
                MIN_SAMPLE_RATE_HZ, MAX_SAMPLE_RATE_HZ, self.sample_rate_hz
            )));
        }
        Ok(())
    }
}

/// How the points are drawn.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualsConfig {
    /// Sprite size in world units.
    pub point_size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
    pub background: [f32; 3],
    /// Camera distance from the origin along +z.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
}

impl Default for VisualsConfig {
    fn default() -> Self {
        Self {
            point_size: 0.12,
            color: [1.0, 1.0, 1.0],
            opacity: 0.9,
            background: [0.0, 0.0, 0.0],
            camera_distance: 5.0,
            fov_y_degrees: 75.0,
        }
    }
}

/// Complete backdrop configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackdropConfig {
    pub field: FieldConfig,
    pub pointer: PointerConfig,
    pub visuals: VisualsConfig,
    /// RNG seed for particle placement. `None` picks one from the clock.
    pub seed: Option<u64>,
}

impl BackdropConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.field.validate()?;
        config.pointer.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_effect() {
        let config = FieldConfig::default();
        assert_eq!(config.particle_count, 200);
        assert_eq!(config.bound, 25.0);
        assert_eq!(config.softness, 0.08);
        assert_eq!(config.speed_range, (0.2, 0.5));
        assert!(config.validate().is_ok());

        let pointer = PointerConfig::default();
        assert_eq!(pointer.stiffness, 50.0);
        assert_eq!(pointer.damping, 12.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BackdropConfig::from_json(r#"{ "field": { "particle_count": 12 }, "seed": 9 }"#)
            .unwrap();
        assert_eq!(config.field.particle_count, 12);
        assert_eq!(config.field.bound, 25.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.visuals, VisualsConfig::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let zero = BackdropConfig::from_json(r#"{ "field": { "particle_count": 0 } }"#);
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));

        let mut config = FieldConfig::default();
        config.bound = -1.0;
        assert!(config.validate().is_err());

        let mut config = FieldConfig::default();
        config.planar_damping = 1.5;
        assert!(config.validate().is_err());

        let mut config = FieldConfig::default();
        config.speed_range = (0.5, 0.2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unstable_pointer_spring() {
        assert!(PointerConfig::default().validate().is_ok());

        let stiff = BackdropConfig::from_json(r#"{ "pointer": { "stiffness": 1e7 } }"#);
        assert!(matches!(stiff, Err(ConfigError::Invalid(_))));

        for json in [
            r#"{ "pointer": { "stiffness": 0.0 } }"#,
            r#"{ "pointer": { "damping": -1.0 } }"#,
            r#"{ "pointer": { "damping": 1e6 } }"#,
            r#"{ "pointer": { "mass": 0.0 } }"#,
            r#"{ "pointer": { "sample_rate_hz": 0.25 } }"#,
            r#"{ "pointer": { "sample_rate_hz": 1e-39 } }"#,
            r#"{ "pointer": { "sample_rate_hz": 1e6 } }"#,
        ] {
            assert!(BackdropConfig::from_json(json).is_err(), "accepted {}", json);
        }

        // Heavier particles tolerate proportionally stiffer springs.
        let heavy = PointerConfig {
            stiffness: 1e6,
            damping: 100.0,
            mass: 10.0,
            ..Default::default()
        };
        assert!(heavy.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = BackdropConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("driftfield-config-{}.json", std::process::id()));
        let mut config = BackdropConfig::default();
        config.field.particle_count = 64;
        config.seed = Some(3);
        config.save(&path).unwrap();

        let loaded = BackdropConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
