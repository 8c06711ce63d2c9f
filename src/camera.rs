use glam::{Mat4, Vec3};

use crate::config::CameraConfig;
use crate::path::CatmullRomPath;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub view: Mat4,
    pub position: Vec3,
}

/// Perspective camera that always looks at an explicit target.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }

    /// Matches the projection to a viewport of `width` x `height`.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.target = pose.target;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        )
    }

    pub fn params(&self) -> CameraParams {
        let view = self.view();
        CameraParams {
            view_proj: self.projection() * view,
            view,
            position: self.position,
        }
    }
}

/// Where the camera sits and what it faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Maps scroll progress to a camera pose riding the path.
///
/// Progress is stretched by the path length and folded into a repeating
/// window of `loop_period`, so scrolling keeps cycling through the vessel.
/// The target sits `look_ahead` further along the same window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathFollow {
    loop_period: f32,
    look_ahead: f32,
}

impl PathFollow {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            loop_period: config.loop_period,
            look_ahead: config.look_ahead,
        }
    }

    /// Normalized path positions of the camera and its target.
    pub fn parameters(&self, path: &CatmullRomPath, progress: f32) -> (f32, f32) {
        let time = progress * path.length();
        let t = time.rem_euclid(self.loop_period) / self.loop_period;
        let ahead = (time + self.look_ahead).rem_euclid(self.loop_period) / self.loop_period;
        (t.min(1.0), ahead.min(1.0))
    }

    pub fn pose(&self, path: &CatmullRomPath, progress: f32) -> CameraPose {
        let (t, ahead) = self.parameters(path, progress);
        CameraPose {
            position: path.point_at(t),
            target: path.point_at(ahead),
        }
    }

    /// Pose before any scrolling has happened.
    pub fn initial_pose(&self, path: &CatmullRomPath) -> CameraPose {
        self.pose(path, 0.0)
    }
}
