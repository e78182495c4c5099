//! Zhang-Suen thinning and greedy chain extraction from the thinned
//! mask.

use image::{GrayImage, Luma};

use crate::bitmap::INK;
use crate::config::MIN_CHAIN_PIXELS;

/// Scan order for chain growth: N, NE, E, SE, S, SW, W, NW.
const CHAIN_ORDER: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Thin a binary mask to a 1-pixel-wide skeleton (Zhang-Suen).
///
/// Two subiterations alternate until a full pair deletes nothing.
/// Border rows and columns are never examined, so the caller must
/// provide at least a 1-px background margin (region-local masks do).
/// Already-1-px-wide input is a fixed point.
pub fn thin(mask: &GrayImage) -> GrayImage {
    let mut current = mask.clone();
    loop {
        let removed = subiteration(&mut current, 1) + subiteration(&mut current, 2);
        if removed == 0 {
            return current;
        }
    }
}

/// One parallel subiteration: mark, then clear.
///
/// With `p1` the centre and `p2..p9` its neighbours clockwise from
/// north, a pixel is marked iff `2 <= B <= 6`, `A == 1`, and the
/// step-specific neighbour products vanish, where `B` is the ink
/// neighbour count and `A` the number of 0->1 transitions in the cyclic
/// sequence `(p2, p3, .., p9, p2)`.
fn subiteration(mask: &mut GrayImage, step: u8) -> usize {
    let (w, h) = mask.dimensions();
    if w < 3 || h < 3 {
        return 0;
    }

    let mut to_remove = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if mask.get_pixel(x, y)[0] != INK {
                continue;
            }
            let p = neighbours(mask, x, y);
            let b: u8 = p.iter().sum();
            if !(2..=6).contains(&b) {
                continue;
            }
            let a = (0..8).filter(|&i| p[i] == 0 && p[(i + 1) % 8] == 1).count();
            if a != 1 {
                continue;
            }
            // p2=N p4=E p6=S p8=W as p[0], p[2], p[4], p[6].
            let ok = if step == 1 {
                p[0] * p[2] * p[4] == 0 && p[2] * p[4] * p[6] == 0
            } else {
                p[0] * p[2] * p[6] == 0 && p[0] * p[4] * p[6] == 0
            };
            if ok {
                to_remove.push((x, y));
            }
        }
    }

    for &(x, y) in &to_remove {
        mask.put_pixel(x, y, Luma([0]));
    }
    to_remove.len()
}

/// The 8 neighbours as 0/1, clockwise from north.
fn neighbours(mask: &GrayImage, x: u32, y: u32) -> [u8; 8] {
    let at = |dx: i32, dy: i32| {
        u8::from(
            mask.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0] == INK,
        )
    };
    [
        at(0, -1),
        at(1, -1),
        at(1, 0),
        at(1, 1),
        at(0, 1),
        at(-1, 1),
        at(-1, 0),
        at(-1, -1),
    ]
}

/// Greedy chain extraction from a thinned mask.
///
/// Row-major scan; each unvisited skeleton pixel starts a chain that
/// repeatedly appends the first unvisited skeleton neighbour in the
/// fixed N, NE, E, SE, S, SW, W, NW order, until none remains. Chains
/// shorter than `MIN_CHAIN_PIXELS` are discarded. Branch points are not
/// treated specially: one arm is followed and the others become new
/// chains, which endpoint merging later reconnects.
pub fn extract_chains(skeleton: &GrayImage) -> Vec<Vec<(u32, u32)>> {
    let (w, h) = skeleton.dimensions();
    let mut visited = vec![false; w as usize * h as usize];
    let idx = |x: u32, y: u32| y as usize * w as usize + x as usize;

    let mut chains = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if skeleton.get_pixel(x, y)[0] != INK || visited[idx(x, y)] {
                continue;
            }

            let mut chain = vec![(x, y)];
            visited[idx(x, y)] = true;
            let (mut cx, mut cy) = (x, y);
            'grow: loop {
                for (dx, dy) in CHAIN_ORDER {
                    let nx = cx as i32 + dx;
                    let ny = cy as i32 + dy;
                    if nx < 0 || ny < 0 || nx as u32 >= w || ny as u32 >= h {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    if skeleton.get_pixel(nx, ny)[0] == INK && !visited[idx(nx, ny)] {
                        visited[idx(nx, ny)] = true;
                        chain.push((nx, ny));
                        (cx, cy) = (nx, ny);
                        continue 'grow;
                    }
                }
                break;
            }

            if chain.len() >= MIN_CHAIN_PIXELS {
                chains.push(chain);
            }
        }
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(w: u32, h: u32, ink: &[(u32, u32)]) -> GrayImage {
        let mut m = GrayImage::new(w, h);
        for &(x, y) in ink {
            m.put_pixel(x, y, Luma([INK]));
        }
        m
    }

    fn ink_pixels(m: &GrayImage) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for (x, y, p) in m.enumerate_pixels() {
            if p[0] == INK {
                out.push((x, y));
            }
        }
        out
    }

    #[test]
    fn thin_line_is_a_fixed_point() {
        let line: Vec<(u32, u32)> = (2..18).map(|x| (x, 5)).collect();
        let m = mask_with(20, 11, &line);
        assert_eq!(thin(&m).as_raw(), m.as_raw());
    }

    #[test]
    fn crossing_lines_are_a_fixed_point() {
        let mut ink = Vec::new();
        for i in 3..=17 {
            ink.push((i, 10));
            ink.push((10, i));
        }
        let m = mask_with(21, 21, &ink);
        assert_eq!(thin(&m).as_raw(), m.as_raw());
    }

    #[test]
    fn thick_bar_thins_to_unit_width() {
        let mut ink = Vec::new();
        for y in 5..10 {
            for x in 3..23 {
                ink.push((x, y));
            }
        }
        let m = mask_with(26, 15, &ink);
        let thinned = thin(&m);
        let remaining = ink_pixels(&thinned);
        assert!(!remaining.is_empty());
        // No 2x2 block of ink survives thinning.
        for &(x, y) in &remaining {
            let block = [(x + 1, y), (x, y + 1), (x + 1, y + 1)];
            assert!(
                !block
                    .iter()
                    .all(|&(bx, by)| thinned.get_pixel(bx, by)[0] == INK),
                "2x2 ink block at ({x},{y})"
            );
        }
    }

    #[test]
    fn skeleton_is_a_subset_of_the_input() {
        let mut ink = Vec::new();
        for y in 4..12 {
            for x in 4..20 {
                ink.push((x, y));
            }
        }
        let m = mask_with(24, 16, &ink);
        let thinned = thin(&m);
        for (x, y, p) in thinned.enumerate_pixels() {
            if p[0] == INK {
                assert_eq!(m.get_pixel(x, y)[0], INK);
            }
        }
    }

    #[test]
    fn line_becomes_one_full_length_chain() {
        let line: Vec<(u32, u32)> = (2..18).map(|x| (x, 5)).collect();
        let m = mask_with(20, 11, &line);
        let chains = extract_chains(&m);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 16);
        assert_eq!(chains[0][0], (2, 5));
        assert_eq!(*chains[0].last().unwrap(), (17, 5));
    }

    #[test]
    fn short_chains_are_discarded() {
        let m = mask_with(10, 10, &[(2, 2), (3, 2)]);
        assert!(extract_chains(&m).is_empty());
    }

    #[test]
    fn every_skeleton_pixel_lands_in_at_most_one_chain() {
        let mut ink = Vec::new();
        for i in 3..=17 {
            ink.push((i, 10));
            ink.push((10, i));
        }
        let m = mask_with(21, 21, &ink);
        let chains = extract_chains(&m);
        let mut seen = std::collections::HashSet::new();
        for chain in &chains {
            for p in chain {
                assert!(seen.insert(*p), "pixel {p:?} appears twice");
            }
        }
    }
}
