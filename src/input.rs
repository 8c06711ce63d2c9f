use glam::Vec2;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

/// Keys that move the virtual page scroll on native windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollKey {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Home,
    End,
}

impl ScrollKey {
    pub fn from_name(name: &str) -> Option<Self> {
        use ScrollKey::*;
        let key = match name {
            "Up" | "ArrowUp" => LineUp,
            "Down" | "ArrowDown" => LineDown,
            "PageUp" => PageUp,
            "PageDown" | "Space" | " " => PageDown,
            "Home" => Home,
            "End" => End,
            _ => return None,
        };
        Some(key)
    }

    /// Scroll offset after pressing this key at `current`.
    pub fn apply(self, current: f32, line: f32, page: f32, max: f32) -> f32 {
        let target = match self {
            ScrollKey::LineUp => current - line,
            ScrollKey::LineDown => current + line,
            ScrollKey::PageUp => current - page,
            ScrollKey::PageDown => current + page,
            ScrollKey::Home => 0.0,
            ScrollKey::End => max,
        };
        target.clamp(0.0, max.max(0.0))
    }
}

/// Pointer and scroll snapshot fed by the host's event handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pointer: Vec2,
    scroll_y: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the cursor in centered coordinates: `x` grows to the right and
    /// `y` grows upward, both in `[-0.5, 0.5]` across the viewport.
    pub fn set_pointer(&mut self, client: Vec2, size: Vec2) {
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        self.pointer = Vec2::new(client.x / size.x - 0.5, -(client.y / size.y - 0.5));
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Returns true when the offset changed.
    pub fn set_scroll(&mut self, scroll_y: f32) -> bool {
        let scroll_y = scroll_y.max(0.0);
        if scroll_y == self.scroll_y {
            return false;
        }
        self.scroll_y = scroll_y;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_is_centered_and_flipped() {
        let mut input = InputState::new();
        let size = Vec2::new(800.0, 400.0);
        input.set_pointer(Vec2::new(400.0, 200.0), size);
        assert_eq!(input.pointer(), Vec2::ZERO);
        input.set_pointer(Vec2::new(0.0, 0.0), size);
        assert_eq!(input.pointer(), Vec2::new(-0.5, 0.5));
        input.set_pointer(Vec2::new(800.0, 400.0), size);
        assert_eq!(input.pointer(), Vec2::new(0.5, -0.5));
    }

    #[test]
    fn zero_sized_viewport_keeps_pointer() {
        let mut input = InputState::new();
        input.set_pointer(Vec2::new(200.0, 100.0), Vec2::new(400.0, 400.0));
        let before = input.pointer();
        input.set_pointer(Vec2::new(10.0, 10.0), Vec2::new(0.0, 400.0));
        assert_eq!(input.pointer(), before);
    }

    #[test]
    fn keys_move_within_bounds() {
        assert_eq!(ScrollKey::from_name("ArrowDown"), Some(ScrollKey::LineDown));
        assert_eq!(ScrollKey::from_name("Tab"), None);
        assert_eq!(ScrollKey::LineUp.apply(50.0, 100.0, 600.0, 1000.0), 0.0);
        assert_eq!(ScrollKey::PageDown.apply(50.0, 100.0, 600.0, 1000.0), 650.0);
        assert_eq!(ScrollKey::PageDown.apply(900.0, 100.0, 600.0, 1000.0), 1000.0);
        assert_eq!(ScrollKey::End.apply(0.0, 100.0, 600.0, 1000.0), 1000.0);
        assert_eq!(ScrollKey::Home.apply(700.0, 100.0, 600.0, 1000.0), 0.0);
    }

    #[test]
    fn scroll_reports_changes_only() {
        let mut input = InputState::new();
        assert!(input.set_scroll(120.0));
        assert!(!input.set_scroll(120.0));
        assert!(input.set_scroll(-5.0));
        assert_eq!(input.scroll_y(), 0.0);
    }
}
