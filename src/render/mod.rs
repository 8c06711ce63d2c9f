pub mod common;
mod gpu;
mod shared;

pub use common::{GlobalUniform, InstanceRaw};
pub use gpu::Renderer;
