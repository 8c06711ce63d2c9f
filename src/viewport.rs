/// Largest device pixel ratio the renderer honours.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical size of the drawing area and the display's pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let mut viewport = Self {
            width: 1.0,
            height: 1.0,
            device_pixel_ratio: 1.0,
        };
        viewport.resize(width, height, device_pixel_ratio);
        viewport
    }

    /// Applies a new logical size. Returns `false` and keeps the previous
    /// size when either dimension is zero.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> bool {
        if device_pixel_ratio > 0.0 {
            self.device_pixel_ratio = device_pixel_ratio;
        }
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Size of the render target in physical pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            ((self.width * ratio).round() as u32).max(1),
            ((self.height * ratio).round() as u32).max(1),
        )
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }
}
