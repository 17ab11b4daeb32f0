//! 2-D geometric primitives for mask layout, in micrometers.

use serde::{Deserialize, Serialize};

pub mod boolean;
pub mod transform;

/// Fixed sub-micrometer coordinate grid (1 nm).
///
/// All synthesized waypoints are snapped to this grid to avoid
/// floating-point seam artifacts when corners are rasterized.
pub const GRID: f64 = 1e-3;

/// Rounds `v` to the nearest multiple of [`GRID`].
#[inline]
pub fn snap(v: f64) -> f64 {
    (v / GRID).round() * GRID
}

/// Wraps the given angle to the interval `[0, 360)` degrees.
pub fn wrap_angle(angle: f64) -> f64 {
    ((angle % 360.) + 360.) % 360.
}

/// A point in two-dimensional space, in micrometers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0., y: 0. }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Snaps both coordinates to the layout grid.
    #[inline]
    pub fn snap_to_grid(&self) -> Self {
        Self::new(snap(self.x), snap(self.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A mask layer, GDS-style `(layer, datatype)`.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Layer(pub u16, pub u16);

impl Layer {
    /// Negative-mask (ground-plane cutout) geometry.
    pub const MASK: Layer = Layer(1, 0);
    /// Chip boundary.
    pub const CHIP: Layer = Layer(2, 0);
    /// Annotations and labels.
    pub const LABEL: Layer = Layer(66, 0);
}

/// A closed polygon contour with optional holes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    outer: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

impl Polygon {
    /// Creates a polygon with the given outer contour and no holes.
    pub fn from_verts(outer: Vec<Point>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { outer, holes }
    }

    pub fn outer(&self) -> &[Point] {
        &self.outer
    }

    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    /// Signed area of the outer contour minus holes (shoelace formula).
    pub fn area(&self) -> f64 {
        fn ring_area(pts: &[Point]) -> f64 {
            if pts.len() < 3 {
                return 0.;
            }
            let mut acc = 0.;
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                acc += a.x * b.y - b.x * a.y;
            }
            acc / 2.
        }
        ring_area(&self.outer).abs() - self.holes.iter().map(|h| ring_area(h).abs()).sum::<f64>()
    }

    pub fn is_finite(&self) -> bool {
        self.outer.iter().all(Point::is_finite)
            && self.holes.iter().flatten().all(Point::is_finite)
    }

    pub fn bbox(&self) -> Option<Bbox> {
        Bbox::from_points(self.outer.iter().copied())
    }
}

/// One or more closed contours on a single mask layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub layer: Layer,
    pub polygons: Vec<Polygon>,
}

impl Shape {
    pub fn new(layer: Layer, polygons: Vec<Polygon>) -> Self {
        Self { layer, polygons }
    }

    pub fn empty(layer: Layer) -> Self {
        Self {
            layer,
            polygons: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Total enclosed area over all contours.
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    pub fn bbox(&self) -> Option<Bbox> {
        self.polygons
            .iter()
            .filter_map(Polygon::bbox)
            .reduce(|a, b| a.union(&b))
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Bbox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bbox {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Bbox {
            x0: first.x,
            y0: first.y,
            x1: first.x,
            y1: first.y,
        };
        for p in iter {
            bbox.x0 = bbox.x0.min(p.x);
            bbox.y0 = bbox.y0.min(p.y);
            bbox.x1 = bbox.x1.max(p.x);
            bbox.y1 = bbox.y1.max(p.y);
        }
        Some(bbox)
    }

    pub fn union(&self, other: &Bbox) -> Bbox {
        Bbox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2., (self.y0 + self.y1) / 2.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(10.), 10.);
        assert_eq!(wrap_angle(-10.), 350.);
        assert_eq!(wrap_angle(725.), 5.);
        assert_eq!(wrap_angle(360.), 0.);
        assert_eq!(wrap_angle(-360.), 0.);
    }

    #[test]
    fn test_snap_to_grid() {
        assert_abs_diff_eq!(snap(1.23456), 1.235, epsilon = 1e-12);
        assert_abs_diff_eq!(snap(-0.0004), 0.0, epsilon = 1e-12);
        let p = Point::new(3.14159, -2.71828).snap_to_grid();
        assert_abs_diff_eq!(p.x, 3.142, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, -2.718, epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_area() {
        let square = Polygon::from_verts(vec![
            Point::new(0., 0.),
            Point::new(2., 0.),
            Point::new(2., 2.),
            Point::new(0., 2.),
        ]);
        assert_abs_diff_eq!(square.area(), 4., epsilon = 1e-12);

        let with_hole = Polygon::with_holes(
            square.outer().to_vec(),
            vec![vec![
                Point::new(0.5, 0.5),
                Point::new(1.5, 0.5),
                Point::new(1.5, 1.5),
                Point::new(0.5, 1.5),
            ]],
        );
        assert_abs_diff_eq!(with_hole.area(), 3., epsilon = 1e-12);
    }

    #[test]
    fn test_bbox_union() {
        let a = Bbox::from_points([Point::new(0., 0.), Point::new(1., 2.)]).unwrap();
        let b = Bbox::from_points([Point::new(-1., 1.), Point::new(0.5, 3.)]).unwrap();
        let u = a.union(&b);
        assert_eq!((u.x0, u.y0, u.x1, u.y1), (-1., 0., 1., 3.));
        assert_abs_diff_eq!(u.width(), 2.);
        assert_abs_diff_eq!(u.height(), 3.);
    }
}
