use std::any::Any;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{debug, info, warn};
use web_time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::ModelResult;
use crate::heading::HeadingState;
use crate::input::ScrollKey;
use crate::render::Renderer;
use crate::stage::Stage;

/// Frame deltas longer than this are treated as a stall and clamped.
const MAX_FRAME_SECONDS: f32 = 0.1;

/// Events posted to the loop from outside winit.
#[derive(Debug)]
pub enum UserEvent {
    ModelLoaded(ModelResult),
    /// The page scrolled to this offset in CSS pixels.
    Scroll(f32),
    /// The host page resized; the surface should follow this logical size.
    Resize { width: f64, height: f64 },
}

impl UserEvent {
    /// Resize request for a logical size, or `None` when the size is empty
    /// or not finite.
    pub fn resize(width: f64, height: f64) -> Option<Self> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        (valid(width) && valid(height)).then_some(Self::Resize { width, height })
    }
}

/// Where the heading and the page pin are shown.
pub trait PageSurface {
    fn show_heading(&mut self, window: &Window, heading: &HeadingState, revealed: &str);
    fn pin(&mut self, window: &Window, distance: f32);
}

/// Shows the revealed heading in the window title.
pub struct TitleHeading {
    fallback: String,
}

impl TitleHeading {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }
}

impl PageSurface for TitleHeading {
    fn show_heading(&mut self, window: &Window, _heading: &HeadingState, revealed: &str) {
        let revealed = revealed.trim();
        if revealed.is_empty() {
            window.set_title(&self.fallback);
        } else {
            window.set_title(revealed);
        }
    }

    fn pin(&mut self, _window: &Window, distance: f32) {
        debug!("virtual page extended by {distance} px");
    }
}

/// Window creation failed; callers may fall back to a headless run.
#[derive(Debug)]
pub struct WindowInitError {
    message: String,
}

impl WindowInitError {
    pub fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    pub fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// winit driver around a [`Stage`].
pub struct App {
    stage: Stage,
    renderer: Option<Renderer>,
    page: Box<dyn PageSurface>,
    attributes: Option<WindowAttributes>,
    virtual_scroll: bool,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    /// App that opens its own window on resume and scrolls a virtual page
    /// with the wheel and keyboard.
    pub fn windowed(stage: Stage, attributes: WindowAttributes, page: Box<dyn PageSurface>) -> Self {
        Self {
            stage,
            renderer: None,
            page,
            attributes: Some(attributes),
            virtual_scroll: true,
            last_frame: Instant::now(),
            error: None,
        }
    }

    /// App around an already initialized renderer whose page scrolls on
    /// its own and reports offsets through [`UserEvent::Scroll`].
    pub fn embedded(stage: Stage, renderer: Renderer, page: Box<dyn PageSurface>) -> Self {
        let mut app = Self {
            stage,
            renderer: None,
            page,
            attributes: None,
            virtual_scroll: false,
            last_frame: Instant::now(),
            error: None,
        };
        app.attach_renderer(renderer);
        app
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Ends the run, returning the error that stopped the loop, if any.
    pub fn finish(self) -> Result<Stage> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.stage),
        }
    }

    fn attach_renderer(&mut self, mut renderer: Renderer) {
        renderer.set_tube(self.stage.tube(), self.stage.tube_instance());
        if let Some(mesh) = self.stage.model() {
            renderer.set_cell_mesh(mesh);
        }
        let inner = renderer.window().inner_size();
        let (width, height, ratio) = logical_size(renderer.window(), inner);
        if let Some(drawable) = self.stage.resize(width, height, ratio) {
            let (width, height) = surface_size(drawable, inner);
            renderer.resize(width, height);
        }
        let window = renderer.window();
        self.page.show_heading(
            window,
            self.stage.heading(),
            &self.stage.reveal().revealed_text(),
        );
        window.request_redraw();
        self.renderer = Some(renderer);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(attributes) = self.attributes.take() else {
            return Ok(());
        };
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );
        let size = window.inner_size();
        let renderer = pollster::block_on(Renderer::new(window, size.width, size.height))?;
        self.attach_renderer(renderer);
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn create_renderer(&mut self, _event_loop: &ActiveEventLoop) -> Result<()> {
        if self.attributes.take().is_some() {
            return Err(anyhow!("web builds must provide a renderer up front"));
        }
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn on_model_loaded(&mut self, result: ModelResult) {
        if !self.stage.on_model_loaded(result) {
            return;
        }
        if let (Some(renderer), Some(mesh)) = (self.renderer.as_mut(), self.stage.model()) {
            renderer.set_cell_mesh(mesh);
        }
    }

    fn on_resize(&mut self, size: PhysicalSize<u32>) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let (width, height, ratio) = logical_size(renderer.window(), size);
        if let Some(drawable) = self.stage.resize(width, height, ratio) {
            let (width, height) = surface_size(drawable, size);
            renderer.resize(width, height);
        }
    }

    /// Asks the window for a new logical size. Hosts that resize
    /// asynchronously report the result through `WindowEvent::Resized`.
    fn request_size(&mut self, width: f64, height: f64) {
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let applied = renderer
            .window()
            .request_inner_size(LogicalSize::new(width, height));
        if let Some(size) = applied {
            self.on_resize(size);
        }
    }

    fn on_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }
        if event.logical_key == Key::Named(NamedKey::Escape) {
            event_loop.exit();
            return;
        }
        if !self.virtual_scroll {
            return;
        }
        if let Some(key) = map_scroll_key(&event.logical_key) {
            self.stage.on_key(key);
        }
    }

    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        if !self.virtual_scroll {
            return;
        }
        let scale = self
            .renderer
            .as_ref()
            .map_or(1.0, |renderer| renderer.window().scale_factor());
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, lines) => lines * self.stage.config().scroll.line_height,
            MouseScrollDelta::PixelDelta(position) => (position.y / scale) as f32,
        };
        // wheel up reports positive deltas and scrolls the page back
        self.stage.scroll_by(-pixels);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_SECONDS);
        self.last_frame = now;

        let update = self.stage.advance(dt);
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if update.heading_changed {
            self.page.show_heading(
                renderer.window(),
                self.stage.heading(),
                &self.stage.reveal().revealed_text(),
            );
        }
        if update.scroll_activated {
            self.page
                .pin(renderer.window(), self.stage.scroll().pin_distance());
        }

        renderer.update_globals(&self.stage.globals());
        renderer.update_cells(&self.stage.cell_instances());
        match renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU is out of memory"));
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
            }
            Err(wgpu::SurfaceError::Other) => {
                warn!("Surface reported an unknown error; retrying next frame");
            }
        }
        renderer.window().request_redraw();
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.create_renderer(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::ModelLoaded(result) => self.on_model_loaded(result),
            UserEvent::Scroll(offset) => self.stage.on_scroll(offset),
            UserEvent::Resize { width, height } => self.request_size(width, height),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.on_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.renderer.as_ref().map(|r| r.window().inner_size()) {
                    self.on_resize(size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(renderer) = self.renderer.as_ref() {
                    let logical: LogicalPosition<f32> =
                        position.to_logical(renderer.window().scale_factor());
                    self.stage
                        .on_pointer_moved(Vec2::new(logical.x, logical.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(delta),
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event, event_loop),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn logical_size(window: &Window, size: PhysicalSize<u32>) -> (f64, f64, f64) {
    let ratio = window.scale_factor();
    let logical = size.to_logical::<f64>(ratio);
    (logical.width, logical.height, ratio)
}

/// The web canvas takes the capped drawable size; native swap chains must
/// match the window.
#[cfg(target_arch = "wasm32")]
fn surface_size(drawable: (u32, u32), _window: PhysicalSize<u32>) -> (u32, u32) {
    drawable
}

#[cfg(not(target_arch = "wasm32"))]
fn surface_size(_drawable: (u32, u32), window: PhysicalSize<u32>) -> (u32, u32) {
    (window.width, window.height)
}

fn map_scroll_key(key: &Key) -> Option<ScrollKey> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some(ScrollKey::LineUp),
        Key::Named(NamedKey::ArrowDown) => Some(ScrollKey::LineDown),
        Key::Named(NamedKey::PageUp) => Some(ScrollKey::PageUp),
        Key::Named(NamedKey::PageDown) | Key::Named(NamedKey::Space) => Some(ScrollKey::PageDown),
        Key::Named(NamedKey::Home) => Some(ScrollKey::Home),
        Key::Named(NamedKey::End) => Some(ScrollKey::End),
        Key::Character(text) => ScrollKey::from_name(text.as_str()),
        _ => None,
    }
}
