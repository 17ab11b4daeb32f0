//! Rigid transformations for reference placement.

use serde::{Deserialize, Serialize};

use super::{wrap_angle, Point, Polygon, Shape};

/// A rigid placement transform: an optional reflection about the x-axis,
/// followed by a counterclockwise rotation, followed by a translation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// Translation applied last.
    pub translation: Point,
    /// Counterclockwise rotation in degrees.
    pub rotation: f64,
    /// Reflect `y -> -y` before rotating.
    pub reflect_vert: bool,
}

impl Transformation {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            translation: Point::new(dx, dy),
            ..Default::default()
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        Self {
            rotation: wrap_angle(degrees),
            ..Default::default()
        }
    }

    pub fn reflect_vert() -> Self {
        Self {
            reflect_vert: true,
            ..Default::default()
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        let y = if self.reflect_vert { -p.y } else { p.y };
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Point::new(
            p.x * cos - y * sin + self.translation.x,
            p.x * sin + y * cos + self.translation.y,
        )
    }

    /// Transforms a direction angle, in degrees.
    pub fn apply_angle(&self, angle: f64) -> f64 {
        let angle = if self.reflect_vert { -angle } else { angle };
        wrap_angle(angle + self.rotation)
    }

    /// Composes `self` (outer placement) with `other` (inner placement), so
    /// that `cascade(a, b).apply(p) == a.apply(b.apply(p))`.
    pub fn cascade(&self, other: &Transformation) -> Transformation {
        let rotation = if self.reflect_vert {
            self.rotation - other.rotation
        } else {
            self.rotation + other.rotation
        };
        Transformation {
            translation: self.apply(other.translation),
            rotation: wrap_angle(rotation),
            reflect_vert: self.reflect_vert ^ other.reflect_vert,
        }
    }

    pub fn apply_polygon(&self, poly: &Polygon) -> Polygon {
        Polygon::with_holes(
            poly.outer().iter().map(|&p| self.apply(p)).collect(),
            poly.holes()
                .iter()
                .map(|h| h.iter().map(|&p| self.apply(p)).collect())
                .collect(),
        )
    }

    pub fn apply_shape(&self, shape: &Shape) -> Shape {
        Shape::new(
            shape.layer,
            shape.polygons.iter().map(|p| self.apply_polygon(p)).collect(),
        )
    }
}
