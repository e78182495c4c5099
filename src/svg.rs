//! Layered SVG emission: one polyline `<path>` per traced path,
//! millimetre document sizing, layer routing by stroke colour.

use std::fmt::Write;

use crate::config::{PAD, PX_PER_MM};
use crate::optimize::{PathKind, TracedPath};

/// Cut-layer stroke colour (outlines).
const OUTLINE_STROKE: &str = "#00ff00";
/// Engrave-layer stroke colour (centerlines).
const CENTERLINE_STROKE: &str = "#0000ff";

/// Render paths into an SVG document sized for cutter software.
///
/// `width`/`height` are the unpadded image dimensions; they become both
/// the view box and, divided by `PX_PER_MM`, the physical document
/// size. Path coordinates are shifted by `-PAD` so output lives in the
/// original image frame. Closed paths get a trailing `Z`.
pub fn document(paths: &[&TracedPath], width: u32, height: u32) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.2}mm\" height=\"{:.2}mm\" viewBox=\"0 0 {} {}\">\n  <g>\n",
        f64::from(width) / PX_PER_MM,
        f64::from(height) / PX_PER_MM,
        width,
        height,
    );

    let offset = f64::from(PAD);
    for path in paths {
        if path.points.len() < 2 {
            continue;
        }
        let mut d = String::new();
        for (i, p) in path.points.iter().enumerate() {
            let prefix = if i == 0 { "M" } else { " L" };
            let _ = write!(d, "{} {:.2},{:.2}", prefix, p.x - offset, p.y - offset);
        }
        if path.closed {
            d.push_str(" Z");
        }

        let stroke = match path.kind {
            PathKind::Outline => OUTLINE_STROKE,
            PathKind::Centerline => CENTERLINE_STROKE,
        };
        let _ = writeln!(
            svg,
            "    <path d=\"{d}\" stroke=\"{stroke}\" stroke-width=\"2\" fill=\"none\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>"
        );
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}
