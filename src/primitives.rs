//! Primitive cells: straight and tapered strips, rectangles, the rounded
//! 90-degree bend, and stroke-font text.

use std::sync::Arc;

use crate::component::{Component, ComponentBuilder, Port};
use crate::error::{CpwgenError, Result};
use crate::geometry::{Layer, Point, Polygon, Shape};

/// Default sampling resolution for curved outlines, degrees per vertex.
pub const ANGLE_RESOLUTION: f64 = 0.5;

/// Fillet radius of the rounded-miter bend, as a fraction of the bend
/// radius.
const MITER_FILLET_FRAC: f64 = 0.1;

fn check_width(width: f64) -> Result<()> {
    if width > 0. {
        Ok(())
    } else {
        Err(CpwgenError::invalid_dimension(
            "width",
            format!("width={width} must be > 0"),
        ))
    }
}

/// A straight strip of the given length and width, centered on the x-axis.
///
/// Ports `o1` at the origin facing 180 and `o2` at `(length, 0)` facing 0.
pub fn straight(length: f64, width: f64) -> Result<Component> {
    check_width(width)?;
    if length < 0. {
        return Err(CpwgenError::invalid_dimension(
            "length",
            format!("length={length} must be >= 0"),
        ));
    }
    let w2 = width / 2.;
    let mut b = ComponentBuilder::new("straight");
    b.add_shape(Shape::new(
        Layer::MASK,
        vec![Polygon::from_verts(vec![
            Point::new(0., -w2),
            Point::new(length, -w2),
            Point::new(length, w2),
            Point::new(0., w2),
        ])],
    ));
    b.add_port(Port::new("o1", Point::zero(), 180., width));
    b.add_port(Port::new("o2", Point::new(length, 0.), 0., width));
    b.set_info("length", length);
    b.set_info("width", width);
    Ok(b.finish())
}

/// A linear taper from `width1` at the origin to `width2` at `(length, 0)`.
pub fn taper(length: f64, width1: f64, width2: f64) -> Result<Component> {
    check_width(width1)?;
    check_width(width2)?;
    let mut b = ComponentBuilder::new("taper");
    b.add_shape(Shape::new(
        Layer::MASK,
        vec![Polygon::from_verts(vec![
            Point::new(0., -width1 / 2.),
            Point::new(length, -width2 / 2.),
            Point::new(length, width2 / 2.),
            Point::new(0., width1 / 2.),
        ])],
    ));
    b.add_port(Port::new("o1", Point::zero(), 180., width1));
    b.add_port(Port::new("o2", Point::new(length, 0.), 0., width2));
    b.set_info("length", length);
    Ok(b.finish())
}

/// An axis-aligned rectangle with its lower-left corner at the origin.
///
/// Edge-midpoint ports `e1` (west), `e2` (north), `e3` (east), `e4` (south).
pub fn rectangle(size: (f64, f64), layer: Layer) -> Result<Component> {
    let (w, h) = size;
    if w <= 0. || h <= 0. {
        return Err(CpwgenError::invalid_dimension(
            "size",
            format!("rectangle size {size:?} must be positive"),
        ));
    }
    let mut b = ComponentBuilder::new("rectangle");
    b.add_shape(Shape::new(
        layer,
        vec![Polygon::from_verts(vec![
            Point::zero(),
            Point::new(w, 0.),
            Point::new(w, h),
            Point::new(0., h),
        ])],
    ));
    b.add_port(Port::new("e1", Point::new(0., h / 2.), 180., h));
    b.add_port(Port::new("e2", Point::new(w / 2., h), 90., w));
    b.add_port(Port::new("e3", Point::new(w, h / 2.), 0., h));
    b.add_port(Port::new("e4", Point::new(w / 2., 0.), 270., w));
    Ok(b.finish())
}

/// A rounded-miter 90-degree bend inscribed in the quarter-circle floorplan
/// of the given radius.
///
/// The centerline enters at the origin heading +x and exits at
/// `(radius, radius)` heading +y: a 45-degree entry fillet, a diagonal run,
/// and a 45-degree exit fillet. Cutting the corner this way makes the traced
/// arc strictly shorter than the ideal quarter circle; the true arc length is
/// reported in the cell's `length` metadata and must be read from there, not
/// assumed as `pi * r / 2`.
#[derive(Debug, Clone)]
pub struct Bend90 {
    radius: f64,
    width: f64,
    fillet: f64,
    length: f64,
    cell: Arc<Component>,
}

impl Bend90 {
    pub fn new(radius: f64, width: f64) -> Result<Self> {
        check_width(width)?;
        if radius <= 0. {
            return Err(CpwgenError::invalid_dimension(
                "radius",
                format!("bend radius={radius} must be > 0"),
            ));
        }
        let fillet = radius * MITER_FILLET_FRAC;
        // Both fillets plus the diagonal run between them.
        let length = std::f64::consts::FRAC_PI_2 * fillet
            + std::f64::consts::SQRT_2 * (radius - fillet);

        let center = Self::centerline(radius, fillet, ANGLE_RESOLUTION);
        let w2 = width / 2.;
        let mut left = Vec::with_capacity(center.len());
        let mut right = Vec::with_capacity(center.len());
        for &(p, heading) in &center {
            let normal = (heading + 90.).to_radians();
            let (sin, cos) = normal.sin_cos();
            left.push(Point::new(p.x + w2 * cos, p.y + w2 * sin));
            right.push(Point::new(p.x - w2 * cos, p.y - w2 * sin));
        }
        right.reverse();
        left.extend(right);

        let mut b = ComponentBuilder::new("bend90");
        b.add_shape(Shape::new(Layer::MASK, vec![Polygon::from_verts(left)]));
        b.add_port(Port::new("o1", Point::zero(), 180., width));
        b.add_port(Port::new("o2", Point::new(radius, radius), 90., width));
        b.set_info("length", length);
        b.set_info("radius", radius);
        Ok(Self {
            radius,
            width,
            fillet,
            length,
            cell: Arc::new(b.finish()),
        })
    }

    /// Sampled centerline points with their headings in degrees.
    fn centerline(radius: f64, fillet: f64, step_deg: f64) -> Vec<(Point, f64)> {
        let steps = (45. / step_deg).ceil() as usize;
        let mut pts = Vec::with_capacity(2 * steps + 2);
        // Entry fillet, center (0, fillet).
        for i in 0..=steps {
            let phi = -90. + 45. * i as f64 / steps as f64;
            let (sin, cos) = phi.to_radians().sin_cos();
            pts.push((
                Point::new(fillet * cos, fillet + fillet * sin),
                phi + 90.,
            ));
        }
        // Exit fillet, center (radius - fillet, radius). The diagonal run is
        // implied between the last entry sample and the first exit sample.
        for i in 0..=steps {
            let phi = -45. + 45. * i as f64 / steps as f64;
            let (sin, cos) = phi.to_radians().sin_cos();
            pts.push((
                Point::new(radius - fillet + fillet * cos, radius + fillet * sin),
                phi + 90.,
            ));
        }
        pts
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn fillet(&self) -> f64 {
        self.fillet
    }

    /// The arc length actually traced by the bend.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn cell(&self) -> &Arc<Component> {
        &self.cell
    }
}

/// Stroke segments per glyph on a 4 x 6 grid.
fn glyph(c: char) -> Option<&'static [[f64; 4]]> {
    let strokes: &'static [[f64; 4]] = match c {
        '0' | 'O' | 'D' => &[[0., 0., 0., 6.], [0., 6., 4., 6.], [4., 6., 4., 0.], [4., 0., 0., 0.]],
        '1' => &[[2., 0., 2., 6.], [2., 6., 1., 5.], [1., 0., 3., 0.]],
        '2' => &[[0., 6., 4., 6.], [4., 6., 4., 3.], [4., 3., 0., 3.], [0., 3., 0., 0.], [0., 0., 4., 0.]],
        '3' => &[[0., 6., 4., 6.], [4., 6., 4., 0.], [0., 3., 4., 3.], [0., 0., 4., 0.]],
        '4' => &[[0., 6., 0., 3.], [0., 3., 4., 3.], [4., 6., 4., 0.]],
        '5' | 'S' => &[[4., 6., 0., 6.], [0., 6., 0., 3.], [0., 3., 4., 3.], [4., 3., 4., 0.], [4., 0., 0., 0.]],
        '6' => &[[4., 6., 0., 6.], [0., 6., 0., 0.], [0., 0., 4., 0.], [4., 0., 4., 3.], [4., 3., 0., 3.]],
        '7' => &[[0., 6., 4., 6.], [4., 6., 2., 0.]],
        '8' | 'B' => &[[0., 0., 0., 6.], [0., 6., 4., 6.], [4., 6., 4., 0.], [4., 0., 0., 0.], [0., 3., 4., 3.]],
        '9' => &[[4., 0., 4., 6.], [4., 6., 0., 6.], [0., 6., 0., 3.], [0., 3., 4., 3.], [0., 0., 4., 0.]],
        'A' => &[[0., 0., 0., 6.], [0., 6., 4., 6.], [4., 6., 4., 0.], [0., 3., 4., 3.]],
        'C' => &[[4., 6., 0., 6.], [0., 6., 0., 0.], [0., 0., 4., 0.]],
        'E' => &[[4., 6., 0., 6.], [0., 6., 0., 0.], [0., 0., 4., 0.], [0., 3., 3., 3.]],
        'F' => &[[4., 6., 0., 6.], [0., 6., 0., 0.], [0., 3., 3., 3.]],
        'G' => &[[4., 6., 0., 6.], [0., 6., 0., 0.], [0., 0., 4., 0.], [4., 0., 4., 3.], [4., 3., 2., 3.]],
        'H' => &[[0., 0., 0., 6.], [4., 0., 4., 6.], [0., 3., 4., 3.]],
        'I' => &[[2., 0., 2., 6.], [0., 6., 4., 6.], [0., 0., 4., 0.]],
        'J' => &[[4., 6., 4., 0.], [4., 0., 0., 0.], [0., 0., 0., 2.]],
        'K' => &[[0., 0., 0., 6.], [0., 3., 4., 6.], [0., 3., 4., 0.]],
        'L' => &[[0., 6., 0., 0.], [0., 0., 4., 0.]],
        'M' => &[[0., 0., 0., 6.], [0., 6., 2., 3.], [2., 3., 4., 6.], [4., 6., 4., 0.]],
        'N' => &[[0., 0., 0., 6.], [0., 6., 4., 0.], [4., 0., 4., 6.]],
        'P' => &[[0., 0., 0., 6.], [0., 6., 4., 6.], [4., 6., 4., 3.], [4., 3., 0., 3.]],
        'Q' => &[[0., 0., 0., 6.], [0., 6., 4., 6.], [4., 6., 4., 0.], [4., 0., 0., 0.], [2., 2., 4., 0.]],
        'R' => &[[0., 0., 0., 6.], [0., 6., 4., 6.], [4., 6., 4., 3.], [4., 3., 0., 3.], [2., 3., 4., 0.]],
        'T' => &[[0., 6., 4., 6.], [2., 6., 2., 0.]],
        'U' => &[[0., 6., 0., 0.], [0., 0., 4., 0.], [4., 0., 4., 6.]],
        'V' => &[[0., 6., 2., 0.], [2., 0., 4., 6.]],
        'W' => &[[0., 6., 1., 0.], [1., 0., 2., 3.], [2., 3., 3., 0.], [3., 0., 4., 6.]],
        'X' => &[[0., 0., 4., 6.], [0., 6., 4., 0.]],
        'Y' => &[[0., 6., 2., 3.], [4., 6., 2., 3.], [2., 3., 2., 0.]],
        'Z' => &[[0., 6., 4., 6.], [4., 6., 0., 0.], [0., 0., 4., 0.]],
        _ => return None,
    };
    Some(strokes)
}

/// Renders one stroke as a quad with square end caps.
fn stroke_quad(seg: [f64; 4], scale: f64, hw: f64) -> Polygon {
    let (x0, y0, x1, y1) = (seg[0] * scale, seg[1] * scale, seg[2] * scale, seg[3] * scale);
    let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
    let (dx, dy) = if len > 0. {
        ((x1 - x0) / len, (y1 - y0) / len)
    } else {
        (1., 0.)
    };
    let (nx, ny) = (-dy, dx);
    // Extend by half the stroke width so abutting strokes join cleanly.
    let (ax, ay) = (x0 - dx * hw, y0 - dy * hw);
    let (bx, by) = (x1 + dx * hw, y1 + dy * hw);
    Polygon::from_verts(vec![
        Point::new(ax + nx * hw, ay + ny * hw),
        Point::new(ax - nx * hw, ay - ny * hw),
        Point::new(bx - nx * hw, by - ny * hw),
        Point::new(bx + nx * hw, by + ny * hw),
    ])
}

/// Stroke-font text with its baseline-left corner at the origin.
///
/// `size` is the capital height. Lowercase input is rendered uppercase;
/// characters without a glyph advance the cursor without drawing.
pub fn text(content: &str, size: f64, layer: Layer) -> Result<Component> {
    if size <= 0. {
        return Err(CpwgenError::invalid_dimension(
            "size",
            format!("text size={size} must be > 0"),
        ));
    }
    let scale = size / 6.;
    let hw = 0.4 * scale;
    let advance = 5.5 * scale;
    let mut polygons = Vec::new();
    let mut x = 0.;
    for c in content.chars() {
        if let Some(strokes) = glyph(c.to_ascii_uppercase()) {
            for &seg in strokes {
                let mut quad = stroke_quad(seg, scale, hw);
                quad = crate::geometry::transform::Transformation::translate(x, 0.)
                    .apply_polygon(&quad);
                polygons.push(quad);
            }
        }
        x += advance;
    }
    let mut b = ComponentBuilder::new("text");
    b.add_shape(Shape::new(layer, polygons));
    b.set_info("size", size);
    Ok(b.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_straight_ports_and_length() {
        let c = straight(100., 6.).unwrap();
        assert_eq!(c.info().get("length"), Some(100.));
        let o2 = c.port("o2").unwrap();
        assert_abs_diff_eq!(o2.center.x, 100.);
        assert_abs_diff_eq!(o2.orientation, 0.);
        assert_abs_diff_eq!(c.bbox().unwrap().height(), 6.);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(straight(10., 0.).is_err());
        assert!(taper(10., -1., 4.).is_err());
    }

    #[test]
    fn test_bend_length_is_between_chamfer_and_arc() {
        let bend = Bend90::new(10., 2.).unwrap();
        // Shorter than the quarter circle, longer than the straight diagonal.
        assert!(bend.length() < std::f64::consts::FRAC_PI_2 * 10.);
        assert!(bend.length() > std::f64::consts::SQRT_2 * 10.);
        // Footprint matches the quarter-circle floorplan.
        let o2 = bend.cell().port("o2").unwrap();
        assert_abs_diff_eq!(o2.center.x, 10.);
        assert_abs_diff_eq!(o2.center.y, 10.);
        assert_abs_diff_eq!(o2.orientation, 90.);
    }

    #[test]
    fn test_bend_length_report() {
        // r = 10 with the default fillet: ~14.3, matching the recorded cell
        // metadata.
        let bend = Bend90::new(10., 2.).unwrap();
        assert_abs_diff_eq!(bend.length(), 14.2987, epsilon = 1e-3);
        assert_abs_diff_eq!(
            bend.cell().info().get("length").unwrap(),
            bend.length()
        );
    }

    #[test]
    fn test_text_renders_known_glyphs() {
        let t = text("R0", 50., Layer::LABEL).unwrap();
        assert!(!t.shapes()[0].polygons.is_empty());
        let bbox = t.bbox().unwrap();
        assert!(bbox.height() <= 50. * 1.2);
        assert!(bbox.width() > 50.);
    }
}
