//! Scroll-driven flight through a blood vessel.
//!
//! A Catmull-Rom centerline is swept into a tube, a thousand cells drift
//! along it and the camera rides the curve as the page scrolls. Scene
//! state lives in [`Stage`], which has no GPU or window dependencies so
//! it can be driven headless; [`app::App`] wires it to winit and wgpu on
//! the desktop and in the browser.

pub mod app;
pub mod assets;
pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod flow;
pub mod heading;
pub mod input;
pub mod mesh;
pub mod obj;
pub mod particle;
pub mod path;
pub mod render;
pub mod scroll;
pub mod stage;
pub mod tube;
pub mod tween;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use camera::{CameraParams, CameraPose, PathFollow, PerspectiveCamera};
pub use config::SceneConfig;
pub use error::{AssetError, ConfigError, ObjError, PathError};
pub use flow::Flow;
pub use heading::{HeadingReveal, HeadingState};
pub use input::{InputState, ScrollKey};
pub use mesh::MeshData;
pub use obj::{load_obj_from_str, ObjModel};
pub use particle::Particle;
pub use path::{CatmullRomPath, CurveType};
pub use render::Renderer;
pub use scroll::ScrollTrack;
pub use stage::{FrameUpdate, Stage};
pub use viewport::Viewport;
