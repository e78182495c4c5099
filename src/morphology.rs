//! Binary morphology on 0/255 masks: dilation, background flood fill,
//! inversion, and the silhouette mask built from all three.

use image::{GrayImage, Luma};

use crate::bitmap::INK;
use crate::config::DILATE_PASSES;

/// Grow the foreground by `passes` iterations of 4-neighbour dilation.
///
/// Each pass writes into a fresh buffer, so growth is exactly one pixel
/// per pass in the N/S/E/W directions. Connectivity is preserved.
pub fn dilate(mask: &GrayImage, passes: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut current = mask.clone();
    for _ in 0..passes {
        let mut next = current.clone();
        for y in 0..h {
            for x in 0..w {
                if current.get_pixel(x, y)[0] == 0 {
                    continue;
                }
                if x > 0 {
                    next.put_pixel(x - 1, y, Luma([INK]));
                }
                if x + 1 < w {
                    next.put_pixel(x + 1, y, Luma([INK]));
                }
                if y > 0 {
                    next.put_pixel(x, y - 1, Luma([INK]));
                }
                if y + 1 < h {
                    next.put_pixel(x, y + 1, Luma([INK]));
                }
            }
        }
        current = next;
    }
    current
}

/// Flood the background from `(0, 0)` with a 4-connected depth-first
/// fill over zero cells.
///
/// Returns a mask where reached cells are `INK`. The caller guarantees
/// `(0, 0)` is background (the white pad does this). Cells the flood
/// cannot reach are either foreground or holes enclosed by it.
pub fn flood_background(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut reached = GrayImage::new(w, h);
    if w == 0 || h == 0 || mask.get_pixel(0, 0)[0] != 0 {
        return reached;
    }

    let mut stack = vec![(0u32, 0u32)];
    reached.put_pixel(0, 0, Luma([INK]));
    while let Some((x, y)) = stack.pop() {
        let mut visit = |nx: u32, ny: u32, reached: &mut GrayImage, stack: &mut Vec<(u32, u32)>| {
            if mask.get_pixel(nx, ny)[0] == 0 && reached.get_pixel(nx, ny)[0] == 0 {
                reached.put_pixel(nx, ny, Luma([INK]));
                stack.push((nx, ny));
            }
        };
        if x > 0 {
            visit(x - 1, y, &mut reached, &mut stack);
        }
        if x + 1 < w {
            visit(x + 1, y, &mut reached, &mut stack);
        }
        if y > 0 {
            visit(x, y - 1, &mut reached, &mut stack);
        }
        if y + 1 < h {
            visit(x, y + 1, &mut reached, &mut stack);
        }
    }
    reached
}

/// Elementwise foreground/background swap.
pub fn invert(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut out = GrayImage::new(w, h);
    for (src, dst) in mask.pixels().zip(out.pixels_mut()) {
        dst[0] = if src[0] == 0 { INK } else { 0 };
    }
    out
}

/// Build the silhouette mask: a solid blob covering the figure's hull.
///
/// `invert(flood_background(dilate(mask, DILATE_PASSES)))`: dilation
/// closes small gaps so the flood cannot leak into the figure, and
/// inverting the reached-background mask fills internal holes because
/// the flood never saw them.
pub fn silhouette_mask(binary: &GrayImage) -> GrayImage {
    invert(&flood_background(&dilate(binary, DILATE_PASSES)))
}
