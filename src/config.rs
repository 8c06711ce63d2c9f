use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::path::CurveType;

/// Tunables for the whole scene. Every field falls back to the values the
/// effect was designed with, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub model_path: String,
    pub heading: String,
    pub seed: Option<u64>,
    pub path: PathConfig,
    pub tube: TubeConfig,
    pub cells: CellConfig,
    pub camera: CameraConfig,
    pub scroll: ScrollConfig,
    pub light: LightConfig,
    pub fog: FogConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: "models/blood_cell.obj".to_string(),
            heading: "BLOODSTREAM".to_string(),
            seed: None,
            path: PathConfig::default(),
            tube: TubeConfig::default(),
            cells: CellConfig::default(),
            camera: CameraConfig::default(),
            scroll: ScrollConfig::default(),
            light: LightConfig::default(),
            fog: FogConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values that would divide by zero or produce an empty scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| Err(ConfigError::Invalid(message.to_string()));
        if self.path.control_points.len() < 2 {
            return invalid("path.control_points needs at least 2 points");
        }
        if self.path.samples == 0 {
            return invalid("path.samples must be positive");
        }
        if self.path.arc_length_divisions == 0 {
            return invalid("path.arc_length_divisions must be positive");
        }
        if self.camera.loop_period <= 0.0 {
            return invalid("camera.loop_period must be positive");
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return invalid("camera.fov_degrees must be within (0, 180)");
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return invalid("camera clip planes must satisfy 0 < near < far");
        }
        if self.scroll.pin_distance <= 0.0 {
            return invalid("scroll.pin_distance must be positive");
        }
        if self.scroll.scrub_seconds < 0.0 {
            return invalid("scroll.scrub_seconds must not be negative");
        }
        if self.fog.far <= self.fog.near {
            return invalid("fog.far must exceed fog.near");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub control_points: Vec<Vec3>,
    pub curve_type: CurveType,
    pub tension: f32,
    /// Number of path divisions; one cell is spawned per sample point.
    pub samples: usize,
    pub arc_length_divisions: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        let control_points = [
            Vec3::new(163.0, 452.0, 56.0),
            Vec3::new(63.0, 471.0, 180.0),
            Vec3::new(-29.0, 470.0, 16.0),
            Vec3::new(-144.0, 465.0, 181.0),
            Vec3::new(-257.0, 471.0, 42.0),
        ]
        .into_iter()
        .map(|point| point / 1000.0)
        .collect();
        Self {
            control_points,
            curve_type: CurveType::CatmullRom,
            tension: 0.5,
            samples: 1000,
            arc_length_divisions: crate::path::DEFAULT_ARC_LENGTH_DIVISIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeConfig {
    pub tubular_segments: u32,
    pub radius: f32,
    pub radial_segments: u32,
    pub color: u32,
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            tubular_segments: 70,
            radius: 0.02,
            radial_segments: 30,
            color: 0x781002,
        }
    }
}

/// Ranges the per-cell random attributes are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    pub radius_min: f32,
    pub radius_range: f32,
    pub hue_base: f32,
    pub hue_range: f32,
    pub saturation_min: f32,
    pub saturation_range: f32,
    pub lightness: f32,
    pub speed_min: f32,
    pub speed_range: f32,
    /// Multiplier applied to each cell's speed per reference frame.
    pub speed_scale: f32,
    pub offset_spread: f32,
    /// Spin about x in radians per reference frame: `rand * range + base`.
    pub spin_x_base: f32,
    pub spin_x_range: f32,
    /// Spin about z in radians per reference frame: `rand * range`.
    pub spin_z_range: f32,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            radius_min: 0.0001,
            radius_range: 0.0002,
            hue_base: 350.0,
            hue_range: 10.0,
            saturation_min: 65.0,
            saturation_range: 20.0,
            lightness: 56.0,
            speed_min: 0.0002,
            speed_range: 0.0004,
            speed_scale: 0.5,
            offset_spread: 0.025,
            spin_x_base: 0.01,
            spin_x_range: -0.1,
            spin_z_range: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Window of path progress the scroll-driven camera loops over.
    pub loop_period: f32,
    pub look_ahead: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            near: 0.001,
            far: 1000.0,
            loop_period: 1.0,
            look_ahead: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub pin_distance: f32,
    pub scrub_seconds: f32,
    /// Scroll offset in pixels past which the heading hides.
    pub heading_threshold: f32,
    /// Virtual scroll distance of one wheel line on native windows.
    pub line_height: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pin_distance: 100_000.0,
            scrub_seconds: 2.0,
            heading_threshold: 1.0,
            line_height: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub sky: u32,
    pub ground: u32,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            sky: 0xe9eff2,
            ground: 0x01010f,
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: u32,
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: 0x000000,
            near: 0.05,
            far: 1.6,
        }
    }
}
