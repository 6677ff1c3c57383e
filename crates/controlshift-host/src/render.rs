use glam::Vec2;

use controlshift_core::geometry::Rect;
use controlshift_core::render::{Color, Renderer};

/// Headless renderer: counts what would have been drawn.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountingRenderer {
    /// Primitives since the last present.
    pub pending: u64,
    pub total_primitives: u64,
    pub frames: u64,
    /// Primitive count of the last presented frame.
    pub last_frame: u64,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&mut self) {
        self.pending += 1;
        self.total_primitives += 1;
    }
}

impl Renderer for CountingRenderer {
    fn clear(&mut self, _color: Color) {
        self.count();
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {
        self.count();
    }

    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Color) {
        self.count();
    }

    fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _color: Color) {
        self.count();
    }

    fn text(&mut self, _text: &str, _pos: Vec2, _size: f32, _color: Color) {
        self.count();
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames += 1;
    }
}
