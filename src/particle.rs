use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::color::hsl_to_srgb;
use crate::config::CellConfig;
use crate::path::CatmullRomPath;

/// Frame rate the per-frame speeds and spins were tuned for.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// A single cell drifting along the vessel.
///
/// Only `progress` and `rotation` evolve; `position` is derived from
/// `progress` every step and never integrated.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub radius: f32,
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub speed: f32,
    pub progress: f32,
    pub offset: Vec3,
    pub spin: Vec3,
    pub rotation: Vec3,
    pub position: Vec3,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, config: &CellConfig, path: &CatmullRomPath) -> Self {
        let radius = rng.gen::<f32>() * config.radius_range + config.radius_min;
        let saturation = (rng.gen::<f32>() * config.saturation_range + config.saturation_min).floor();
        let speed = rng.gen::<f32>() * config.speed_range + config.speed_min;
        let progress = wrap_progress(rng.gen::<f32>());
        let hue = rng.gen::<f32>() * config.hue_range + config.hue_base;
        let offset = Vec3::new(
            (rng.gen::<f32>() - 0.5) * config.offset_spread,
            (rng.gen::<f32>() - 0.5) * config.offset_spread,
            0.0,
        );
        let spin = Vec3::new(
            rng.gen::<f32>() * config.spin_x_range + config.spin_x_base,
            0.0,
            rng.gen::<f32>() * config.spin_z_range,
        );

        Self {
            radius,
            hue,
            saturation,
            lightness: config.lightness,
            speed,
            progress,
            offset,
            spin,
            rotation: Vec3::ZERO,
            position: place(path, progress, offset),
        }
    }

    /// Returns this cell moved forward by `frames` reference frames.
    ///
    /// Cells travel against the path direction, from its end toward its
    /// start, wrapping around when they reach it.
    pub fn advanced(&self, path: &CatmullRomPath, frames: f32, speed_scale: f32) -> Self {
        let progress = wrap_progress(self.progress + self.speed * speed_scale * frames);
        Self {
            progress,
            rotation: self.rotation + self.spin * frames,
            position: place(path, progress, self.offset),
            ..self.clone()
        }
    }

    /// sRGB color of the cell's material.
    pub fn color(&self) -> Vec3 {
        hsl_to_srgb(self.hue, self.saturation, self.lightness)
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.radius), rotation, self.position)
    }
}

fn place(path: &CatmullRomPath, progress: f32, offset: Vec3) -> Vec3 {
    path.point(1.0 - progress) + offset
}

/// Wraps any progress value into `[0, 1)`.
pub fn wrap_progress(value: f32) -> f32 {
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid rounds tiny negative inputs up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::PathConfig;

    fn path() -> CatmullRomPath {
        let config = PathConfig::default();
        CatmullRomPath::new(config.control_points, config.curve_type, config.tension).unwrap()
    }

    #[test]
    fn spawned_attributes_stay_in_range() {
        let path = path();
        let config = CellConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let cell = Particle::spawn(&mut rng, &config, &path);
            assert!((0.0001..=0.0003).contains(&cell.radius));
            assert!((350.0..=360.0).contains(&cell.hue));
            assert!((65.0..=84.0).contains(&cell.saturation));
            assert_eq!(cell.saturation.fract(), 0.0);
            assert!((0.0002..=0.0006).contains(&cell.speed));
            assert!((0.0..1.0).contains(&cell.progress));
            assert!(cell.offset.x.abs() <= 0.0125 && cell.offset.y.abs() <= 0.0125);
            assert_eq!(cell.offset.z, 0.0);
            assert!((-0.09..=0.01).contains(&cell.spin.x));
            assert_eq!(cell.spin.y, 0.0);
            assert!((0.0..=0.01).contains(&cell.spin.z));
        }
    }

    #[test]
    fn spin_ranges_come_from_config() {
        let path = path();
        let config = CellConfig {
            spin_x_base: 0.5,
            spin_x_range: 0.0,
            spin_z_range: 0.0,
            ..CellConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let cell = Particle::spawn(&mut rng, &config, &path);
        assert_eq!(cell.spin, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn progress_wraps_into_unit_interval() {
        assert_eq!(wrap_progress(1.25), 0.25);
        assert_eq!(wrap_progress(1.0), 0.0);
        assert!((wrap_progress(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(wrap_progress(-1e-9), 0.0);
    }

    #[test]
    fn position_follows_reversed_progress() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(11);
        let cell = Particle::spawn(&mut rng, &CellConfig::default(), &path);
        let next = cell.advanced(&path, 1.0, 0.5);
        assert!((next.progress - wrap_progress(cell.progress + cell.speed * 0.5)).abs() < 1e-7);
        let expected = path.point(1.0 - next.progress) + cell.offset;
        assert!(next.position.distance(expected) < 1e-6);
        assert_eq!(next.rotation, cell.spin);
    }

    #[test]
    fn motion_is_periodic_in_one_over_speed() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(5);
        let mut cell = Particle::spawn(&mut rng, &CellConfig::default(), &path);
        cell.speed = 0.25;
        cell.progress = 0.1;
        let mut stepped = cell.clone();
        // speed * scale = 0.125 per frame, so 8 frames is one lap
        for _ in 0..8 {
            stepped = stepped.advanced(&path, 1.0, 0.5);
            assert!((0.0..1.0).contains(&stepped.progress));
        }
        assert!((stepped.progress - cell.progress).abs() < 1e-5);
        assert!(stepped.position.distance(place(&path, cell.progress, cell.offset)) < 1e-4);
    }

    #[test]
    fn rotation_accumulates_without_wrapping() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(9);
        let cell = Particle::spawn(&mut rng, &CellConfig::default(), &path);
        let later = cell.advanced(&path, 10_000.0, 0.5);
        assert!((later.rotation - cell.spin * 10_000.0).length() < 1e-2);
    }

    #[test]
    fn model_matrix_places_and_scales() {
        let path = path();
        let mut rng = StdRng::seed_from_u64(1);
        let cell = Particle::spawn(&mut rng, &CellConfig::default(), &path);
        let (scale, _, translation) = cell.model_matrix().to_scale_rotation_translation();
        assert!((scale - Vec3::splat(cell.radius)).length() < 1e-7);
        assert!(translation.distance(cell.position) < 1e-6);
    }
}
