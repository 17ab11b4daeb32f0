//! Chip boundary and title blocks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentBuilder};
use crate::error::{CpwgenError, Result};
use crate::geometry::boolean::subtract;
use crate::geometry::transform::Transformation;
use crate::geometry::{Layer, Point, Polygon, Shape};
use crate::primitives::{rectangle, straight, text};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CenteredChipParams {
    pub size: (f64, f64),
    /// Emit the chip outline minus the centered content instead of both.
    pub negative: bool,
}

impl Default for CenteredChipParams {
    fn default() -> Self {
        Self {
            size: (2e4, 2e4),
            negative: false,
        }
    }
}

/// Places `center` in the middle of a chip rectangle.
///
/// With `negative` set, the output carries a single shape: the chip outline
/// with the centered content cut out of it.
pub fn centered_chip(center: Arc<Component>, params: &CenteredChipParams) -> Result<Component> {
    let (w, h) = params.size;
    let chip = Arc::new(rectangle((w, h), Layer::CHIP)?);
    let bbox = center.bbox().ok_or_else(|| {
        CpwgenError::Geometry("cannot center a component without geometry".to_string())
    })?;
    let c = bbox.center();
    let shift = Transformation::translate(w / 2. - c.x, h / 2. - c.y);

    let mut b = ComponentBuilder::new("centered_chip");
    if params.negative {
        let mut moved = Shape::new(
            Layer::CHIP,
            center
                .flatten()
                .into_iter()
                .flat_map(|s| s.polygons)
                .collect(),
        );
        moved = shift.apply_shape(&moved);
        b.add_shape(subtract(&chip.merged(Layer::CHIP), &moved)?);
    } else {
        b.place(Arc::clone(&chip), Transformation::identity());
        b.place(center, shift);
    }
    b.add_ports(chip.ports().iter().cloned());
    Ok(b.finish())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SquaresAtCornerChipParams {
    pub size: (f64, f64),
    /// Side length of the corner marker squares.
    pub square_size: f64,
}

impl Default for SquaresAtCornerChipParams {
    fn default() -> Self {
        Self {
            size: (2e4, 2e4),
            square_size: 500.,
        }
    }
}

/// Places `center` in the middle of a chip extent marked by three corner
/// squares.
///
/// Markers sit at the lower-left, upper-left, and upper-right corners; the
/// missing fourth disambiguates chip orientation after dicing.
pub fn squares_at_corner_chip(
    center: Arc<Component>,
    params: &SquaresAtCornerChipParams,
) -> Result<Component> {
    let (w, h) = params.size;
    let s = params.square_size;
    if s <= 0. || 2. * s > w.min(h) {
        return Err(CpwgenError::invalid_dimension(
            "square_size",
            format!("markers of side {s} do not fit a {w} x {h} chip"),
        ));
    }
    let square = Arc::new(rectangle((s, s), Layer::CHIP)?);
    let bbox = center.bbox().ok_or_else(|| {
        CpwgenError::Geometry("cannot center a component without geometry".to_string())
    })?;
    let c = bbox.center();

    let mut b = ComponentBuilder::new("squares_at_corner_chip");
    b.place(Arc::clone(&square), Transformation::translate(0., 0.));
    b.place(Arc::clone(&square), Transformation::translate(0., h - s));
    b.place(square, Transformation::translate(w - s, h - s));
    b.place(
        center,
        Transformation::translate(w / 2. - c.x, h / 2. - c.y),
    );
    Ok(b.finish())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipTitleParams {
    pub title: String,
    /// Length of the top bar.
    pub length: f64,
    /// Width of the top bar.
    pub width: f64,
    /// Fill kept left of the title.
    pub border_left: f64,
    /// Fill kept above the title.
    pub border_top: f64,
    /// Clearance around the title strokes.
    pub border_title: f64,
}

impl Default for ChipTitleParams {
    fn default() -> Self {
        Self {
            title: "TITLE".to_string(),
            length: 12e3,
            width: 500.,
            border_left: 30.,
            border_top: 10.,
            border_title: 100.,
        }
    }
}

/// A filled top bar with the title knocked out of it.
///
/// The bar is subtracted by an inverted-text window (the title's bounding
/// box grown by `border_title`, minus the strokes themselves), so the title
/// reads as filled glyphs inside a clear window.
pub fn chip_title(params: &ChipTitleParams) -> Result<Component> {
    let strip = straight(params.length, params.width)?;
    let size = params.width - params.border_top - params.border_title;
    if size <= 0. {
        return Err(CpwgenError::invalid_dimension(
            "width",
            format!(
                "bar width {} leaves no room for the title after borders",
                params.width
            ),
        ));
    }
    let title = text(&params.title, size, Layer::MASK)?;
    let anchor = Transformation::translate(
        params.border_left + params.border_title,
        -params.width / 2.,
    );
    let placed = anchor.apply_shape(&title.merged(Layer::MASK));

    let mut b = ComponentBuilder::new("chip_title");
    let bar = strip.merged(Layer::MASK);
    match placed.bbox() {
        Some(tb) => {
            let m = params.border_title;
            let window = Shape::new(
                Layer::MASK,
                vec![Polygon::from_verts(vec![
                    Point::new(tb.x0 - m, tb.y0 - m),
                    Point::new(tb.x1 + m, tb.y0 - m),
                    Point::new(tb.x1 + m, tb.y1 + m),
                    Point::new(tb.x0 - m, tb.y1 + m),
                ])],
            );
            let inverted = subtract(&window, &placed)?;
            b.add_shape(subtract(&bar, &inverted)?);
        }
        None => {
            b.add_shape(bar);
        }
    }
    b.add_ports(strip.ports().iter().cloned());
    Ok(b.finish())
}
