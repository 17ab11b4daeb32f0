//! Straight strips with bonding pads for DC film characterization.

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentBuilder, PortKind};
use crate::error::{CpwgenError, Result};
use crate::geometry::transform::Transformation;
use crate::geometry::Layer;
use crate::primitives::{straight, text};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripWithPadsParams {
    /// Length of the central strip.
    pub length: f64,
    /// Width of the central strip.
    pub width: f64,
    /// Minimum side length of the bonding pads.
    pub min_pad_size: f64,
    /// Minimum additional pad half-width beyond the strip.
    pub min_pad_buffer: f64,
    /// When set, renders the number of squares at this text size.
    pub annotate_squares: Option<f64>,
}

impl Default for StripWithPadsParams {
    fn default() -> Self {
        Self {
            length: 2000.,
            width: 2.,
            min_pad_size: 500.,
            min_pad_buffer: 100.,
            annotate_squares: None,
        }
    }
}

/// A straight strip between two square bonding pads.
///
/// Records the number of squares (`length / width`, the sheet-resistance
/// multiplier) and the pad-to-pad length in its metadata. Ports `o1` and
/// `o2` at the outer pad edges are DC ports.
pub fn strip_with_pads(params: &StripWithPadsParams) -> Result<Component> {
    let &StripWithPadsParams {
        length,
        width,
        min_pad_size,
        min_pad_buffer,
        annotate_squares,
    } = params;
    let squares = length / width;
    if (squares.fract()).abs() > 1e-9 {
        warn!("strip of {length} x {width} um has a non-integer number of squares");
    }
    let pad_y = min_pad_size.max(width + 2. * min_pad_buffer);

    let pad = Arc::new(straight(min_pad_size, pad_y)?);
    let strip = Arc::new(straight(length, width)?);

    let mut b = ComponentBuilder::new("strip_with_pads");
    let pad_left = b.place(Arc::clone(&pad), Transformation::identity());
    let st = b.connect(strip, "o1", &pad_left.port("o2")?)?;
    let pad_right = b.connect(pad, "o1", &st.port("o2")?)?;

    let mut o1 = pad_left.port("o1")?.renamed("o1");
    o1.kind = PortKind::Dc;
    let mut o2 = pad_right.port("o2")?.renamed("o2");
    o2.kind = PortKind::Dc;
    b.add_port(o1);
    b.add_port(o2);

    b.set_info("squares", squares);
    b.set_info("length", length + 2. * min_pad_size);
    b.set_info("width", width);

    if let Some(size) = annotate_squares {
        let label = Arc::new(text(&format!("{}", squares as i64), size, Layer::LABEL)?);
        b.place(
            label,
            Transformation::translate(0., min_pad_size + min_pad_buffer),
        );
    }
    Ok(b.finish())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripesArrayParams {
    /// One strip per entry.
    pub widths: Vec<f64>,
    /// Vertical separation between strip bounding boxes.
    pub spacing: f64,
    pub strip: StripWithPadsParams,
}

impl Default for StripesArrayParams {
    fn default() -> Self {
        Self {
            widths: vec![1.],
            spacing: 2000.,
            strip: StripWithPadsParams::default(),
        }
    }
}

/// A vertical stack of evenly separated strips, one per requested width.
pub fn stripes_array(params: &StripesArrayParams) -> Result<Component> {
    let mut b = ComponentBuilder::new("stripes_array");
    let mut cursor = 0.;
    for &width in &params.widths {
        let strip = Arc::new(strip_with_pads(&StripWithPadsParams {
            width,
            ..params.strip.clone()
        })?);
        let bbox = strip
            .bbox()
            .ok_or_else(|| CpwgenError::Geometry("strip has no geometry".to_string()))?;
        b.place(
            strip,
            Transformation::translate(0., cursor - bbox.y0),
        );
        cursor += bbox.height() + params.spacing;
    }
    Ok(b.finish())
}
