//! Per-path cleanup: moving-average smoothing, endpoint merging of
//! skeleton chains, Ramer-Douglas-Peucker simplification, and closure
//! detection.

use geo::{LineString, Simplify};
use kurbo::Point;

use crate::config::{CENTERLINE_CLOSE_DISTANCE, OUTLINE_CLOSE_DISTANCE, RDP_EPSILON};

/// Which laser layer a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Closed boundary of a filled shape; routed to the cut layer.
    Outline,
    /// Medial axis of a thin stroke; routed to the engrave layer.
    Centerline,
}

/// A finished vector path.
#[derive(Debug, Clone)]
pub struct TracedPath {
    pub points: Vec<Point>,
    pub kind: PathKind,
    pub closed: bool,
    bbox_area: f64,
}

impl TracedPath {
    pub fn new(points: Vec<Point>, kind: PathKind, closed: bool) -> Self {
        let bbox_area = bbox_area(&points);
        Self {
            points,
            kind,
            closed,
            bbox_area,
        }
    }

    /// Cached axis-aligned bounding-box area.
    pub fn bbox_area(&self) -> f64 {
        self.bbox_area
    }

    /// Signed shoelace area of the polygon the points enclose, closing
    /// edge included. The magnitude is the true enclosed area, which is
    /// what outline dominance comparisons need; the bounding box only
    /// bounds it from above.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    /// Snap the path shut: last point set exactly to the first.
    pub fn close(&mut self) {
        if let Some(&first) = self.points.first() {
            if let Some(last) = self.points.last_mut() {
                *last = first;
            }
        }
        self.closed = true;
    }
}

fn bbox_area(points: &[Point]) -> f64 {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    if points.is_empty() {
        return 0.0;
    }
    (max.x - min.x) * (max.y - min.y)
}

/// Join skeleton chains whose endpoints nearly touch.
///
/// Thinning breaks strokes at junctions into separate chains whose ends
/// sit a pixel or two apart. This pass repeatedly concatenates any two
/// polylines with endpoints within `max_distance`, reversing one side
/// as needed, until no pair qualifies. Runs over the whole chain list
/// before per-path smoothing.
pub fn merge_chains(mut chains: Vec<Vec<Point>>, max_distance: f64) -> Vec<Vec<Point>> {
    loop {
        let mut merged_any = false;
        'scan: for i in 0..chains.len() {
            for j in i + 1..chains.len() {
                if let Some(joined) = try_join(&chains[i], &chains[j], max_distance) {
                    chains[i] = joined;
                    chains.remove(j);
                    merged_any = true;
                    break 'scan;
                }
            }
        }
        if !merged_any {
            return chains;
        }
    }
}

/// Concatenate `a` and `b` if some pair of their endpoints is within
/// `max_distance`, orienting both so the joined ends meet.
fn try_join(a: &[Point], b: &[Point], max_distance: f64) -> Option<Vec<Point>> {
    let (a0, a1) = (*a.first()?, *a.last()?);
    let (b0, b1) = (*b.first()?, *b.last()?);

    let mut joined: Vec<Point>;
    if a1.distance(b0) < max_distance {
        joined = a.to_vec();
        joined.extend_from_slice(b);
    } else if a1.distance(b1) < max_distance {
        joined = a.to_vec();
        joined.extend(b.iter().rev());
    } else if a0.distance(b1) < max_distance {
        joined = b.to_vec();
        joined.extend_from_slice(a);
    } else if a0.distance(b0) < max_distance {
        joined = b.iter().rev().copied().collect();
        joined.extend_from_slice(a);
    } else {
        return None;
    }
    Some(joined)
}

/// Smooth, simplify, and close-detect one polyline.
pub fn optimize(points: Vec<Point>, kind: PathKind) -> TracedPath {
    let smoothed = smooth(&points);
    let simplified = rdp(&smoothed, RDP_EPSILON);

    let close_distance = match kind {
        PathKind::Outline => OUTLINE_CLOSE_DISTANCE,
        PathKind::Centerline => CENTERLINE_CLOSE_DISTANCE,
    };
    let mut path = TracedPath::new(simplified, kind, false);
    if let (Some(first), Some(last)) = (path.points.first(), path.points.last()) {
        if first.distance(*last) < close_distance {
            path.close();
        }
    }
    path
}

/// Window-3 moving average; the window is truncated at the endpoints.
/// Paths shorter than 3 points pass through unchanged.
fn smooth(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(n - 1);
            let count = (hi - lo + 1) as f64;
            let mut sum = Point::ZERO;
            for p in &points[lo..=hi] {
                sum.x += p.x;
                sum.y += p.y;
            }
            Point::new(sum.x / count, sum.y / count)
        })
        .collect()
}

/// Ramer-Douglas-Peucker via `geo`. Identity for `epsilon <= 0` or
/// fewer than 3 points.
fn rdp(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 2 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let line_string: LineString<f64> =
        LineString::from(points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>());
    line_string
        .simplify(&epsilon)
        .into_inner()
        .into_iter()
        .map(|c| Point::new(c.x, c.y))
        .collect()
}
