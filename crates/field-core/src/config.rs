//! Component configuration for both fields.
//!
//! Options arrive from the hosting page as camelCase JSON; every option is
//! optional and falls back to the component default. Call `validate` (or
//! `from_json`, which validates) before building a field.

use crate::error::FieldError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanarConfig {
    pub node_count: usize,
    pub connection_distance: f32,
    /// Pointer attraction range in pixels.
    pub pointer_radius: f32,
    pub attraction: f32,
    /// Per-frame velocity multiplier.
    pub friction: f32,
    /// Pointer range for edge emphasis and enlarged nodes.
    pub highlight_radius: f32,
    pub glow_radius: f32,
    pub brightness_floor: f32,
    /// Fixed RNG seed; a fresh one is drawn by the host when absent.
    pub seed: Option<u64>,
}

impl Default for PlanarConfig {
    fn default() -> Self {
        Self {
            node_count: 80,
            connection_distance: 150.0,
            pointer_radius: 200.0,
            attraction: 0.02,
            friction: 0.99,
            highlight_radius: 100.0,
            glow_radius: 150.0,
            brightness_floor: 0.5,
            seed: None,
        }
    }
}

impl PlanarConfig {
    pub fn from_json(json: &str) -> Result<Self, FieldError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        positive("connectionDistance", self.connection_distance)?;
        positive("pointerRadius", self.pointer_radius)?;
        non_negative("attraction", self.attraction)?;
        positive("highlightRadius", self.highlight_radius)?;
        positive("glowRadius", self.glow_radius)?;
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(invalid("friction", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.brightness_floor) {
            return Err(invalid("brightnessFloor", "must be in [0, 1]"));
        }
        if self.node_count == 0 {
            log::warn!("planar field configured with zero nodes");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SphereConfig {
    pub count: usize,
    pub radius: f32,
    /// Attraction distance around the pointer target, in world units.
    pub mouse_influence: f32,
    /// Fraction of the displacement removed every frame.
    pub return_speed: f32,
    pub max_displacement: f32,
    /// Edge threshold as a fraction of `radius`.
    pub edge_fraction: f32,
    /// Radians per second around the vertical axis.
    pub rotation_speed: f32,
    pub camera_z: f32,
    pub fov_degrees: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            radius: 3.0,
            mouse_influence: 0.8,
            return_speed: 0.08,
            max_displacement: 0.5,
            edge_fraction: 0.25,
            rotation_speed: 0.15,
            camera_z: 8.0,
            fov_degrees: 60.0,
        }
    }
}

impl SphereConfig {
    /// Landing-page tuning: fewer, wider-reaching particles with a longer pull.
    pub fn hero() -> Self {
        Self {
            count: 1500,
            radius: 2.8,
            mouse_influence: 1.2,
            return_speed: 0.06,
            max_displacement: 1.2,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FieldError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        positive("radius", self.radius)?;
        positive("mouseInfluence", self.mouse_influence)?;
        positive("maxDisplacement", self.max_displacement)?;
        positive("edgeFraction", self.edge_fraction)?;
        non_negative("rotationSpeed", self.rotation_speed)?;
        if !(self.return_speed > 0.0 && self.return_speed < 1.0) {
            return Err(invalid("returnSpeed", "must be in (0, 1)"));
        }
        if !(self.camera_z > self.radius) {
            return Err(invalid("cameraZ", "camera must sit outside the sphere"));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fovDegrees", "must be in (0, 180)"));
        }
        if self.count == 0 {
            log::warn!("spherical field configured with zero particles");
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> FieldError {
    FieldError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), FieldError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite value > 0"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), FieldError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite value >= 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PlanarConfig::default().validate().unwrap();
        SphereConfig::default().validate().unwrap();
        SphereConfig::hero().validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = PlanarConfig::from_json(r#"{ "nodeCount": 40 }"#).unwrap();
        assert_eq!(cfg.node_count, 40);
        assert_eq!(cfg.connection_distance, 150.0);

        let cfg = SphereConfig::from_json(r#"{ "returnSpeed": 0.2, "radius": 2.0 }"#).unwrap();
        assert_eq!(cfg.return_speed, 0.2);
        assert_eq!(cfg.radius, 2.0);
        assert_eq!(cfg.count, 2000);
    }

    #[test]
    fn return_speed_must_be_open_unit_interval() {
        for bad in [0.0, 1.0, -0.5, f32::NAN] {
            let cfg = SphereConfig {
                return_speed: bad,
                ..SphereConfig::default()
            };
            match cfg.validate() {
                Err(FieldError::InvalidConfig { field, .. }) => assert_eq!(field, "returnSpeed"),
                other => panic!("expected returnSpeed rejection for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_positive_distances_are_rejected() {
        let cfg = PlanarConfig {
            connection_distance: 0.0,
            ..PlanarConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SphereConfig {
            max_displacement: -1.0,
            ..SphereConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_counts_are_accepted() {
        let cfg = PlanarConfig {
            node_count: 0,
            ..PlanarConfig::default()
        };
        assert!(cfg.validate().is_ok());
        let cfg = SphereConfig {
            count: 0,
            ..SphereConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            SphereConfig::from_json("{ count: }"),
            Err(FieldError::Config(_))
        ));
    }
}
