use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::CameraParams;
use crate::color::{hex_to_srgb, srgb_to_linear};
use crate::config::{FogConfig, LightConfig};
use crate::particle::Particle;

/// Per-frame values shared by every draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// Linear sky color, intensity in `w`.
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub fog_color: [f32; 4],
    /// Fog `near` and `far` view depths in `x` and `y`.
    pub fog_range: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: &CameraParams, light: &LightConfig, fog: &FogConfig) -> Self {
        Self {
            view_proj: camera.view_proj.to_cols_array_2d(),
            view: camera.view.to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
            sky_color: linear(light.sky).extend(light.intensity).into(),
            ground_color: linear(light.ground).extend(1.0).into(),
            fog_color: linear(fog.color).extend(1.0).into(),
            fog_range: [fog.near, fog.far, 0.0, 0.0],
        }
    }
}

/// One instanced draw: transform, linear color and shading flags.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// `x` is 1 for hemisphere lit instances and 0 for flat color.
    pub params: [f32; 4],
}

impl InstanceRaw {
    pub const LIT: f32 = 1.0;
    pub const UNLIT: f32 = 0.0;

    pub fn cell(particle: &Particle) -> Self {
        Self {
            model: particle.model_matrix().to_cols_array_2d(),
            color: srgb_to_linear(particle.color()).extend(1.0).into(),
            params: [Self::LIT, 0.0, 0.0, 0.0],
        }
    }

    /// Flat colored instance placed at the world origin.
    pub fn unlit(srgb: u32) -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color: linear(srgb).extend(1.0).into(),
            params: [Self::UNLIT, 0.0, 0.0, 0.0],
        }
    }
}

fn linear(hex: u32) -> Vec3 {
    srgb_to_linear(hex_to_srgb(hex))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::{CellConfig, PathConfig};
    use crate::path::CatmullRomPath;

    #[test]
    fn layouts_are_uniform_friendly() {
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
    }

    #[test]
    fn globals_carry_linear_colors_and_fog() {
        let camera = CameraParams {
            view_proj: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        let uniform = GlobalUniform::new(&camera, &LightConfig::default(), &FogConfig::default());
        assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.fog_range[..2], [0.05, 1.6]);
        assert_eq!(uniform.fog_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.sky_color[3], 1.0);
        // #e9eff2 is bright but converts below its sRGB value
        assert!(uniform.sky_color[0] < 0xe9 as f32 / 255.0);
        assert!(uniform.sky_color[0] > 0.7);
    }

    #[test]
    fn cell_instances_are_lit() {
        let config = PathConfig::default();
        let path =
            CatmullRomPath::new(config.control_points, config.curve_type, config.tension).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let particle = Particle::spawn(&mut rng, &CellConfig::default(), &path);
        let instance = InstanceRaw::cell(&particle);
        assert_eq!(instance.params[0], InstanceRaw::LIT);
        assert_eq!(instance.model, particle.model_matrix().to_cols_array_2d());
        // reddish hue dominates
        assert!(instance.color[0] > instance.color[1]);
        assert!(instance.color[0] > instance.color[2]);
    }

    #[test]
    fn unlit_instance_sits_at_origin() {
        let tube = InstanceRaw::unlit(0x781002);
        assert_eq!(tube.params[0], InstanceRaw::UNLIT);
        assert_eq!(tube.model, Mat4::IDENTITY.to_cols_array_2d());
        assert!(tube.color[0] > tube.color[1]);
    }
}
