use image::GrayImage;

use crate::bitmap::INK;
use crate::config::MAX_TRACE_STEPS;

/// Moore neighbourhood in clockwise order starting at east, indexed 0-7.
const MOORE: [(i32, i32); 8] = [
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
    (0, -1),  // N
    (1, -1),  // NE
];

/// Extract closed boundary walks from a binary mask via Moore-neighbour
/// tracing.
///
/// A border pixel is an ink pixel with at least one 4-neighbour that is
/// background or outside the image. Every unvisited border pixel seeds a
/// walk; the walk marks the pixels it records so it is not re-seeded,
/// but may pass through already-visited pixels (spurs are retraced, not
/// split). Several walks per mask are possible; callers pick the one
/// they want by shoelace area. Hole boundaries produce their own walks
/// and are deliberately not distinguished here.
pub fn trace_outlines(mask: &GrayImage) -> Vec<Vec<(u32, u32)>> {
    let (w, h) = mask.dimensions();
    let mut visited = vec![false; w as usize * h as usize];
    let idx = |x: u32, y: u32| y as usize * w as usize + x as usize;

    let mut walks = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if mask.get_pixel(x, y)[0] != INK
                || visited[idx(x, y)]
                || !is_border_pixel(mask, x, y)
            {
                continue;
            }
            walks.push(walk_boundary(mask, (x, y), &mut visited));
        }
    }
    walks
}

fn is_border_pixel(mask: &GrayImage, x: u32, y: u32) -> bool {
    let (w, h) = mask.dimensions();
    x == 0
        || y == 0
        || x + 1 == w
        || y + 1 == h
        || mask.get_pixel(x - 1, y)[0] == 0
        || mask.get_pixel(x + 1, y)[0] == 0
        || mask.get_pixel(x, y - 1)[0] == 0
        || mask.get_pixel(x, y + 1)[0] == 0
}

/// One Moore walk from `start`. The direction index starts at 7; each
/// step rescans the eight neighbours clockwise from `(d + 5) mod 8`
/// (one past the backtrack direction) and advances to the first ink
/// pixel found. Terminates on returning to `start`, or after
/// `MAX_TRACE_STEPS` steps as a bound against pathological inputs.
fn walk_boundary(
    mask: &GrayImage,
    start: (u32, u32),
    visited: &mut [bool],
) -> Vec<(u32, u32)> {
    let (w, h) = mask.dimensions();
    let fg = |x: i32, y: i32| {
        x >= 0
            && y >= 0
            && (x as u32) < w
            && (y as u32) < h
            && mask.get_pixel(x as u32, y as u32)[0] == INK
    };

    let mut walk = vec![start];
    visited[start.1 as usize * w as usize + start.0 as usize] = true;

    let mut current = start;
    let mut d = 7usize;
    for _ in 0..MAX_TRACE_STEPS {
        let mut advanced = false;
        for i in 0..8 {
            let dir = (d + 5 + i) % 8;
            let (dx, dy) = MOORE[dir];
            let nx = current.0 as i32 + dx;
            let ny = current.1 as i32 + dy;
            if !fg(nx, ny) {
                continue;
            }
            let next = (nx as u32, ny as u32);
            if next == start {
                return walk;
            }
            visited[next.1 as usize * w as usize + next.0 as usize] = true;
            walk.push(next);
            current = next;
            d = dir;
            advanced = true;
            break;
        }
        if !advanced {
            // Isolated pixel: no ink neighbours at all.
            return walk;
        }
    }
    walk
}

/// Signed area via the shoelace formula, closing edge included.
pub fn polygon_area(points: &[(u32, u32)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let (xi, yi) = points[i];
            let (xj, yj) = points[(i + 1) % n];
            f64::from(xi) * f64::from(yj) - f64::from(xj) * f64::from(yi)
        })
        .sum::<f64>()
        / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut m = GrayImage::new(w, h);
        for y in y0..=y1 {
            for x in x0..=x1 {
                m.put_pixel(x, y, Luma([INK]));
            }
        }
        m
    }

    #[test]
    fn filled_square_produces_one_boundary_walk() {
        let m = filled_rect(20, 20, 5, 5, 9, 9);
        let walks = trace_outlines(&m);
        assert_eq!(walks.len(), 1);
        // A 5x5 square has a 16-pixel border ring.
        assert_eq!(walks[0].len(), 16);
        for &(x, y) in &walks[0] {
            assert!(is_border_pixel(&m, x, y));
        }
    }

    #[test]
    fn walk_ends_adjacent_to_its_start() {
        let m = filled_rect(20, 20, 3, 3, 12, 8);
        let walks = trace_outlines(&m);
        let walk = &walks[0];
        let (sx, sy) = walk[0];
        let (ex, ey) = *walk.last().unwrap();
        let dx = (i64::from(sx) - i64::from(ex)).abs();
        let dy = (i64::from(sy) - i64::from(ey)).abs();
        assert!(dx <= 1 && dy <= 1, "walk must close back onto its start");
    }

    #[test]
    fn largest_walk_of_a_holed_block_is_the_outer_boundary() {
        // 10x10 block with a 4x4 hole. The hole border seeds extra
        // walks, but the outer ring dominates by area.
        let mut m = filled_rect(16, 16, 3, 3, 12, 12);
        for y in 6..=9 {
            for x in 6..=9 {
                m.put_pixel(x, y, Luma([0]));
            }
        }
        let walks = trace_outlines(&m);
        assert!(walks.len() >= 2);
        let max_area = walks
            .iter()
            .map(|w| polygon_area(w).abs())
            .fold(0.0, f64::max);
        assert!(
            max_area > 60.0,
            "outer boundary should enclose ~81 px^2, got {max_area}"
        );
    }

    #[test]
    fn isolated_pixel_yields_a_single_point_walk() {
        let mut m = GrayImage::new(10, 10);
        m.put_pixel(4, 4, Luma([INK]));
        let walks = trace_outlines(&m);
        assert_eq!(walks.len(), 1);
        assert_eq!(walks[0], vec![(4, 4)]);
    }

    #[test]
    fn shoelace_area_of_a_square() {
        let square = vec![(0u32, 0u32), (4, 0), (4, 4), (0, 4)];
        assert!((polygon_area(&square).abs() - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shoelace_degenerate_is_zero() {
        assert_eq!(polygon_area(&[(1, 1), (2, 2)]), 0.0);
    }
}
