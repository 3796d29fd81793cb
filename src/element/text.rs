use serde::{Deserialize, Serialize};

use super::common::{Color, Point};

/// Block of typed text anchored at its top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    content: String,
    origin: Point,
    font_size: f32,
    color: Color,
}

impl Text {
    pub fn new(content: impl Into<String>, origin: Point, font_size: f32, color: Color) -> Self {
        Self {
            content: content.into(),
            origin,
            font_size,
            color,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn color(&self) -> Color {
        self.color
    }
}
