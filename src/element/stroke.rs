use serde::{Deserialize, Serialize};

use super::common::{Color, Point};

/// Freehand ink stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    color: Color,
    thickness: f32,
}

impl Stroke {
    pub fn new(points: Vec<Point>, thickness: f32, color: Color) -> Self {
        Self {
            points,
            color,
            thickness,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

/// Stroke under construction, committed to an immutable [`Stroke`] when the
/// gesture ends
#[derive(Debug, Clone)]
pub struct MutableStroke {
    points: Vec<Point>,
    color: Color,
    thickness: f32,
}

impl MutableStroke {
    pub fn new(color: Color, thickness: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            thickness,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    // Convert to an immutable Stroke
    pub fn finish(self) -> Stroke {
        Stroke::new(self.points, self.thickness, self.color)
    }
}
