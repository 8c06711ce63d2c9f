use std::fmt;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::ModelResult;
use crate::camera::{CameraParams, PathFollow, PerspectiveCamera};
use crate::config::SceneConfig;
use crate::error::PathError;
use crate::flow::Flow;
use crate::heading::{HeadingReveal, HeadingState};
use crate::input::{InputState, ScrollKey};
use crate::mesh::MeshData;
use crate::path::CatmullRomPath;
use crate::render::{GlobalUniform, InstanceRaw};
use crate::scroll::ScrollTrack;
use crate::tube::tube_mesh;
use crate::viewport::Viewport;

/// Everything the animation needs between frames.
///
/// Hosts feed it window and page events and call [`Stage::advance`] once per
/// frame; rendering reads the resulting camera and instances.
pub struct Stage {
    config: SceneConfig,
    path: CatmullRomPath,
    samples: Vec<Vec3>,
    tube: MeshData,
    flow: Flow,
    model: Option<Arc<MeshData>>,
    model_error: Option<String>,
    camera: PerspectiveCamera,
    follow: PathFollow,
    scroll: ScrollTrack,
    reveal: HeadingReveal,
    viewport: Viewport,
    input: InputState,
    rng: StdRng,
}

/// What changed during one [`Stage::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    pub heading_changed: bool,
    /// Set once, on the frame the scroll track becomes active.
    pub scroll_activated: bool,
    pub camera_moved: bool,
}

impl Stage {
    pub fn new(config: SceneConfig, viewport: Viewport) -> Result<Self, PathError> {
        let path = CatmullRomPath::with_arc_length_divisions(
            config.path.control_points.clone(),
            config.path.curve_type,
            config.path.tension,
            config.path.arc_length_divisions,
        )?;
        let samples = path.points(config.path.samples);
        let tube = tube_mesh(
            &path,
            config.tube.tubular_segments,
            config.tube.radius,
            config.tube.radial_segments,
        );
        info!(
            "path length {:.4} with {} samples, tube of {} vertices",
            path.length(),
            samples.len(),
            tube.vertex_count()
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let follow = PathFollow::new(&config.camera);
        let mut camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        camera.set_pose(follow.initial_pose(&path));

        Ok(Self {
            flow: Flow::new(config.cells.speed_scale),
            scroll: ScrollTrack::new(&config.scroll),
            reveal: HeadingReveal::new(&config.heading, config.scroll.heading_threshold),
            config,
            path,
            samples,
            tube,
            model: None,
            model_error: None,
            camera,
            follow,
            viewport,
            input: InputState::new(),
            rng,
        })
    }

    /// Accepts the shared cell model and spawns one cell per path sample.
    /// A failed load is logged and leaves the flow empty.
    pub fn on_model_loaded(&mut self, result: ModelResult) -> bool {
        match result {
            Ok(mesh) => {
                if self.model.is_some() {
                    return false;
                }
                info!(
                    "cell model ready: {} vertices, {} triangles",
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
                self.flow.populate(
                    self.samples.len(),
                    &mut self.rng,
                    &self.config.cells,
                    &self.path,
                );
                self.model = Some(mesh);
                true
            }
            Err(err) => {
                error!("failed to load cell model: {err}");
                self.model_error = Some(err.to_string());
                false
            }
        }
    }

    /// Applies a new logical size. Returns the drawable size in physical
    /// pixels when it should be applied to the renderer.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Option<(u32, u32)> {
        if !self.viewport.resize(width, height, device_pixel_ratio) {
            return None;
        }
        self.camera
            .set_viewport(self.viewport.width() as f32, self.viewport.height() as f32);
        Some(self.viewport.drawable_size())
    }

    /// Records the cursor from client (logical) coordinates.
    pub fn on_pointer_moved(&mut self, client: Vec2) {
        let size = Vec2::new(self.viewport.width() as f32, self.viewport.height() as f32);
        self.input.set_pointer(client, size);
    }

    /// Reacts to the page having scrolled to `scroll_y` pixels.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.input.set_scroll(scroll_y);
        let scroll_y = self.input.scroll_y();
        self.reveal.on_scroll(scroll_y);
        self.scroll.set_scroll(scroll_y);
    }

    /// Farthest the virtual page can scroll right now.
    pub fn max_scroll(&self) -> f32 {
        if self.scroll.is_active() {
            self.scroll.pin_distance()
        } else {
            0.0
        }
    }

    /// Moves the virtual scroll by `delta` pixels within the page bounds.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        let target = (self.input.scroll_y() + delta).clamp(0.0, self.max_scroll());
        self.on_scroll(target);
        target
    }

    pub fn on_key(&mut self, key: ScrollKey) -> f32 {
        let target = key.apply(
            self.input.scroll_y(),
            self.config.scroll.line_height,
            self.viewport.height() as f32,
            self.max_scroll(),
        );
        self.on_scroll(target);
        target
    }

    /// Runs one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> FrameUpdate {
        let mut update = FrameUpdate::default();
        self.flow = self.flow.advance(&self.path, dt);

        let reveal = self.reveal.tick(dt);
        update.heading_changed = reveal.changed;
        if reveal.intro_completed {
            self.scroll.activate(self.input.scroll_y());
            update.scroll_activated = true;
        }

        if let Some(progress) = self.scroll.tick(dt) {
            self.camera.set_pose(self.follow.pose(&self.path, progress));
            update.camera_moved = true;
        }
        update
    }

    pub fn camera_params(&self) -> CameraParams {
        self.camera.params()
    }

    pub fn globals(&self) -> GlobalUniform {
        GlobalUniform::new(&self.camera_params(), &self.config.light, &self.config.fog)
    }

    pub fn cell_instances(&self) -> Vec<InstanceRaw> {
        self.flow.particles().iter().map(InstanceRaw::cell).collect()
    }

    pub fn tube_instance(&self) -> InstanceRaw {
        InstanceRaw::unlit(self.config.tube.color)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn path(&self) -> &CatmullRomPath {
        &self.path
    }

    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn tube(&self) -> &MeshData {
        &self.tube
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn model(&self) -> Option<&Arc<MeshData>> {
        self.model.as_ref()
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn scroll(&self) -> &ScrollTrack {
        &self.scroll
    }

    pub fn heading(&self) -> &HeadingState {
        self.reveal.state()
    }

    pub fn reveal(&self) -> &HeadingReveal {
        &self.reveal
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary { stage: self }
    }
}

/// Line oriented report of the stage, as printed by headless runs.
pub struct Summary<'a> {
    stage: &'a Stage,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = self.stage;
        writeln!(f, "Path length: {:.4}", stage.path.length())?;
        writeln!(f, "Path samples: {}", stage.samples.len())?;
        match (&stage.model, &stage.model_error) {
            (Some(mesh), _) => writeln!(
                f,
                "Loaded model with {} vertices ({} triangles)",
                mesh.vertex_count(),
                mesh.triangle_count()
            )?,
            (None, Some(reason)) => writeln!(f, "Model unavailable: {reason}")?,
            (None, None) => writeln!(f, "Model unavailable: not loaded")?,
        }
        writeln!(f, "Particles: {}", stage.flow.len())?;
        let camera = stage.camera();
        writeln!(
            f,
            "Camera pos=({:.3}, {:.3}, {:.3}) target=({:.3}, {:.3}, {:.3})",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z
        )?;
        writeln!(f, "Heading: {}", stage.reveal.revealed_text().trim_end())?;
        let pointer = stage.input.pointer();
        write!(f, "Cursor: ({:.3}, {:.3})", pointer.x, pointer.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetError;

    fn triangle() -> ModelResult {
        let mut mesh = MeshData::default();
        mesh.push_vertex(Vec3::ZERO, Vec3::Z);
        mesh.push_vertex(Vec3::X, Vec3::Z);
        mesh.push_vertex(Vec3::Y, Vec3::Z);
        mesh.indices = vec![0, 1, 2];
        Ok(Arc::new(mesh))
    }

    fn stage() -> Stage {
        let config = SceneConfig {
            seed: Some(42),
            ..SceneConfig::default()
        };
        Stage::new(config, Viewport::new(1280.0, 720.0, 1.0)).unwrap()
    }

    fn run(stage: &mut Stage, seconds: f32) -> Vec<FrameUpdate> {
        let frames = (seconds * 60.0).round() as usize;
        (0..frames).map(|_| stage.advance(1.0 / 60.0)).collect()
    }

    #[test]
    fn starts_without_cells_at_initial_pose() {
        let stage = stage();
        assert_eq!(stage.samples().len(), 1001);
        assert!(stage.flow().is_empty());
        let camera = stage.camera();
        assert!(camera.position.distance(stage.path().point_at(0.0)) < 1e-6);
        assert!(camera.target.distance(stage.path().point_at(0.1)) < 1e-6);
    }

    #[test]
    fn model_populates_one_cell_per_sample_once() {
        let mut stage = stage();
        assert!(stage.on_model_loaded(triangle()));
        assert_eq!(stage.flow().len(), 1001);
        assert!(!stage.on_model_loaded(triangle()));
        assert_eq!(stage.flow().len(), 1001);
        assert_eq!(stage.cell_instances().len(), 1001);
    }

    #[test]
    fn failed_model_leaves_flow_empty() {
        let mut stage = stage();
        assert!(!stage.on_model_loaded(Err(AssetError::NoMesh)));
        assert!(stage.flow().is_empty());
        let summary = stage.summary().to_string();
        assert!(summary.contains("Model unavailable: model does not contain any mesh"));
        assert!(summary.contains("Particles: 0"));
    }

    #[test]
    fn scrolling_is_locked_until_intro_completes() {
        let mut stage = stage();
        assert_eq!(stage.scroll_by(500.0), 0.0);

        let updates = run(&mut stage, 4.0);
        assert_eq!(updates.iter().filter(|u| u.scroll_activated).count(), 1);
        assert!(stage.scroll().is_active());
        assert_eq!(stage.scroll_by(500.0), 500.0);
        assert_eq!(stage.scroll_by(1e9), 100_000.0);
        assert_eq!(stage.on_key(ScrollKey::Home), 0.0);
    }

    #[test]
    fn scroll_moves_camera_along_the_path() {
        let mut stage = stage();
        run(&mut stage, 4.0);
        let before = stage.camera().position;

        stage.scroll_by(20_000.0);
        let updates = run(&mut stage, 3.0);
        assert!(updates.iter().any(|u| u.camera_moved));

        let expected = PathFollow::new(&stage.config().camera).pose(stage.path(), 0.2);
        assert!(stage.camera().position.distance(expected.position) < 1e-4);
        assert!(stage.camera().position.distance(before) > 1e-4);
    }

    #[test]
    fn scrolling_past_threshold_hides_heading() {
        let mut stage = stage();
        run(&mut stage, 4.0);
        assert_eq!(stage.reveal().revealed_text(), "BLOODSTREAM");
        stage.scroll_by(50.0);
        run(&mut stage, 4.0);
        assert_eq!(stage.reveal().revealed_text().trim(), "");
        stage.on_key(ScrollKey::Home);
        run(&mut stage, 4.0);
        assert_eq!(stage.reveal().revealed_text(), "BLOODSTREAM");
    }

    #[test]
    fn scrolling_during_intro_keeps_heading_hidden() {
        let mut stage = stage();
        stage.on_scroll(20_000.0);
        run(&mut stage, 400.0 / 60.0);

        assert!(stage.scroll().is_active());
        assert_eq!(stage.reveal().revealed_text().trim(), "");
        assert!(stage
            .heading()
            .letters
            .iter()
            .all(|offset| *offset == crate::heading::HIDDEN_OFFSET));
        assert_eq!(stage.heading().bar_width, 100.0);
    }

    #[test]
    fn resize_tracks_exact_aspect_and_capped_ratio() {
        let mut stage = stage();
        assert_eq!(stage.resize(1000.0, 500.0, 3.0), Some((2000, 1000)));
        assert_eq!(stage.camera().aspect, 2.0);
        assert_eq!(stage.resize(0.0, 500.0, 1.0), None);
        assert_eq!(stage.camera().aspect, 2.0);
    }

    #[test]
    fn summary_lists_every_fact() {
        let mut stage = stage();
        stage.on_model_loaded(triangle());
        stage.on_pointer_moved(Vec2::new(640.0, 180.0));
        run(&mut stage, 4.0);
        let summary = stage.summary().to_string();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("Path length: "));
        assert_eq!(lines[1], "Path samples: 1001");
        assert_eq!(lines[2], "Loaded model with 3 vertices (1 triangles)");
        assert_eq!(lines[3], "Particles: 1001");
        assert!(lines[4].starts_with("Camera pos=("));
        assert_eq!(lines[5], "Heading: BLOODSTREAM");
        assert_eq!(lines[6], "Cursor: (0.000, 0.250)");
    }
}
