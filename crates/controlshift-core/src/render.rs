use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const PURPLE: Color = Color::rgb(128, 0, 128);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color::rgb(200, 200, 200);
    pub const DARK_GRAY: Color = Color::rgb(50, 50, 50);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Add `delta` to every color channel, saturating at 0 and 255.
    pub fn shade(self, delta: i16) -> Self {
        let adjust = |c: u8| (c as i16 + delta).clamp(0, 255) as u8;
        Self {
            r: adjust(self.r),
            g: adjust(self.g),
            b: adjust(self.b),
            a: self.a,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Drawing surface the game renders onto each frame.
///
/// Coordinates are screen-space pixels with the origin at the top-left.
pub trait Renderer {
    /// Fill the whole frame with a color.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Blit a line of text with its top-left corner at `pos`.
    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color);

    /// Present the finished frame.
    fn present(&mut self);
}

/// A single recorded draw primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
    },
}

/// Renderer that records primitives instead of rasterizing them.
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    pub frames_presented: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// All text blitted since the last clear of the list.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    pub fn rects(&self) -> impl Iterator<Item = (&Rect, &Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Rect { rect, color } => Some((rect, color)),
            _ => None,
        })
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for DrawList {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            size,
            color,
        });
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}
