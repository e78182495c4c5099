//! img2laser: line-art raster images → laser-ready layered SVG.
//!
//! Traces a decoded RGBA buffer into two layers: a *cut* layer of
//! closed outer contours and an *engrave* layer of single-pixel-wide
//! centerlines extracted from thin strokes. Unlike general-purpose
//! raster tracers that emit paired boundary curves around each stroke,
//! thin strokes here become one polyline each, so thermal cutters make
//! a single pass.
//!
//! # Example
//!
//! ```
//! // A blank white canvas traces to nothing.
//! let buffer = vec![255u8; 4 * 16 * 16];
//! let result = img2laser::process(&buffer, 16, 16, &img2laser::Params::default())?;
//! assert_eq!(result.stats.total_paths, 0);
//! # Ok::<(), img2laser::PipelineError>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod contour;
mod morphology;
mod optimize;
mod regions;
mod skeleton;
mod svg;

pub mod config;
pub mod error;

pub use config::Params;
pub use error::PipelineError;
pub use optimize::{PathKind, TracedPath};

use kurbo::Point;

use crate::config::{MERGE_DISTANCE, NOISE_FLOOR_AREA};
use crate::regions::Region;

/// Path counts for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub outline_count: usize,
    pub centerline_count: usize,
    /// Reserved for gap diagnostics; currently always 0.
    pub gaps_detected: usize,
    pub total_paths: usize,
}

/// Everything one [`process`] call produces.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// SVG document carrying both layers.
    pub full: String,
    /// SVG document with only the cut layer (outlines).
    pub cut: String,
    /// SVG document with only the engrave layer (centerlines).
    pub engrave: String,
    /// The traced paths themselves, silhouette first.
    pub paths: Vec<TracedPath>,
    pub stats: Stats,
}

/// Parameter suggestion for an input image.
///
/// Currently returns [`Params::default`]; a content-aware heuristic can
/// slot in here without changing callers.
pub fn suggest_params(_buffer: &[u8]) -> Params {
    Params::default()
}

/// Run the full pipeline on a row-major RGBA8 buffer.
///
/// Pipeline: pad + binarize, silhouette extraction via morphological
/// closing and flood fill, per-region outline/centerline dispatch,
/// path optimization, layered SVG emission. Deterministic: identical
/// inputs produce identical outputs. An image with no content above
/// the noise floor yields a valid result with empty layers.
pub fn process(
    buffer: &[u8],
    width: u32,
    height: u32,
    params: &Params,
) -> Result<ProcessResult, PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::ZeroDimension);
    }
    let expected = width as usize * height as usize * 4;
    if buffer.len() != expected {
        return Err(PipelineError::InvalidBuffer {
            expected,
            actual: buffer.len(),
        });
    }
    let params = params.clamped();

    let binary = bitmap::binarize_padded(buffer, width, height)?;
    eprintln!(
        "  Binarize    {}x{} px, {} ink",
        width,
        height,
        binary.pixels().filter(|p| p[0] != 0).count()
    );

    // Inputs with nothing above the noise floor trace to nothing,
    // silhouette included.
    let all_regions = regions::find_regions(&binary);
    if !all_regions.iter().any(|r| r.area() >= NOISE_FLOOR_AREA) {
        eprintln!("  Trace       nothing above the noise floor");
        return Ok(assemble(Vec::new(), width, height));
    }

    let mut paths = Vec::new();

    // ── Stage A: silhouette ───────────────────────────────
    let silhouette = morphology::silhouette_mask(&binary);
    let walks = contour::trace_outlines(&silhouette);
    if let Some(best) = largest_walk(&walks) {
        let mut path = optimize::optimize(to_points(best, (0, 0)), PathKind::Outline);
        path.close();
        paths.push(path);
    }
    eprintln!("  Silhouette  {} boundary walks", walks.len());

    // ── Stage B: details ──────────────────────────────────
    if params.detail_level > 0 {
        let mut survivors: Vec<&Region> = all_regions
            .iter()
            .filter(|r| r.area() >= NOISE_FLOOR_AREA)
            .collect();
        survivors.sort_by(|a, b| b.area().cmp(&a.area()));

        // Cubic response: near 100 the cutoff vanishes and everything
        // stays; near 0 only shapes comparable to the largest survive.
        let a_max = survivors[0].area() as f64;
        let keep_factor = (f64::from(100 - params.detail_level) / 100.0).powi(3);
        let area_cutoff = a_max * keep_factor * 0.02;
        survivors.retain(|r| r.area() as f64 >= area_cutoff);

        let fill_threshold = 2.0 + 3.0 * f64::from(params.centerline_sensitivity);
        let mut chains: Vec<Vec<Point>> = Vec::new();
        let mut thick = 0usize;
        for region in &survivors {
            let (local, origin) = region.local_mask();
            if region.avg_width() > fill_threshold {
                thick += 1;
                let walks = contour::trace_outlines(&local);
                if let Some(best) = largest_walk(&walks) {
                    paths.push(optimize::optimize(
                        to_points(best, origin),
                        PathKind::Outline,
                    ));
                }
            } else {
                let thinned = skeleton::thin(&local);
                chains.extend(
                    skeleton::extract_chains(&thinned)
                        .iter()
                        .map(|c| to_points(c, origin)),
                );
            }
        }

        for chain in optimize::merge_chains(chains, MERGE_DISTANCE) {
            // Paths this short are thinning debris, not strokes.
            if chain.len() > 3 {
                paths.push(optimize::optimize(chain, PathKind::Centerline));
            }
        }
        eprintln!(
            "  Details     {} regions kept ({} thick, {} thin)",
            survivors.len(),
            thick,
            survivors.len() - thick
        );
    }

    let result = assemble(paths, width, height);
    eprintln!(
        "  Result      {} paths ({} cut, {} engrave)",
        result.stats.total_paths, result.stats.outline_count, result.stats.centerline_count
    );
    Ok(result)
}

/// The boundary walk enclosing the most area, ignoring walks too short
/// to be real outlines.
fn largest_walk(walks: &[Vec<(u32, u32)>]) -> Option<&Vec<(u32, u32)>> {
    walks
        .iter()
        .filter(|w| w.len() > 3)
        .max_by(|a, b| {
            contour::polygon_area(a)
                .abs()
                .total_cmp(&contour::polygon_area(b).abs())
        })
}

fn to_points(pixels: &[(u32, u32)], origin: (u32, u32)) -> Vec<Point> {
    pixels
        .iter()
        .map(|&(x, y)| Point::new(f64::from(x + origin.0), f64::from(y + origin.1)))
        .collect()
}

/// Stage C: route paths into layers, emit the three documents, count.
fn assemble(paths: Vec<TracedPath>, width: u32, height: u32) -> ProcessResult {
    let cut: Vec<&TracedPath> = paths
        .iter()
        .filter(|p| p.kind == PathKind::Outline)
        .collect();
    let engrave: Vec<&TracedPath> = paths
        .iter()
        .filter(|p| p.kind == PathKind::Centerline)
        .collect();
    let all: Vec<&TracedPath> = paths.iter().collect();

    let stats = Stats {
        outline_count: cut.len(),
        centerline_count: engrave.len(),
        gaps_detected: 0,
        total_paths: paths.len(),
    };
    ProcessResult {
        full: svg::document(&all, width, height),
        cut: svg::document(&cut, width, height),
        engrave: svg::document(&engrave, width, height),
        paths,
        stats,
    }
}
