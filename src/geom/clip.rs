//! Boolean area operations on planar rings.
//!
//! This module provides the clipping primitives behind the overlap
//! analysis:
//! - intersection of a polygon with a convex clipper (Sutherland-Hodgman),
//! - area of a polygon's intersection with a union of convex polygons.
//!
//! The union never needs an explicit polygon representation: each convex
//! clipper's complement decomposes into half-planes, so the target is
//! carved into disjoint remainder pieces as the clippers are processed.

use crate::geom::AREA_EPS;
use crate::geom::ring::Pt2;

/// Tolerance for the 2D predicates, looser than the vertex epsilon.
const TOL: f64 = 1e-10;

/// Shoelace formula on a 2D ring; positive for counter-clockwise.
pub(crate) fn signed_area(ring: &[Pt2]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x1, y1) = ring[i];
        let (x2, y2) = ring[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    0.5 * sum
}

pub(crate) fn area(ring: &[Pt2]) -> f64 {
    signed_area(ring).abs()
}

/// Reverses the ring if it is clockwise.
pub(crate) fn ensure_ccw(mut ring: Vec<Pt2>) -> Vec<Pt2> {
    if signed_area(&ring) < 0.0 {
        ring.reverse();
    }
    ring
}

/// Checks if a point is on the inside of an edge (left side for CCW).
fn is_inside_edge(point: Pt2, edge_start: Pt2, edge_end: Pt2) -> bool {
    let edge_x = edge_end.0 - edge_start.0;
    let edge_y = edge_end.1 - edge_start.1;
    let to_point_x = point.0 - edge_start.0;
    let to_point_y = point.1 - edge_start.1;
    edge_x * to_point_y - edge_y * to_point_x >= -TOL
}

/// Computes intersection of the subject segment (p1,p2) with the clip edge
/// (p3,p4) treated as an infinite line.
fn edge_intersection(p1: Pt2, p2: Pt2, p3: Pt2, p4: Pt2) -> Option<Pt2> {
    let d1x = p2.0 - p1.0;
    let d1y = p2.1 - p1.1;
    let d2x = p4.0 - p3.0;
    let d2y = p4.1 - p3.1;

    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < TOL * TOL {
        return None; // Parallel
    }

    let d3x = p3.0 - p1.0;
    let d3y = p3.1 - p1.1;
    let t = (d3x * d2y - d3y * d2x) / denom;

    if (-TOL..=1.0 + TOL).contains(&t) {
        Some((p1.0 + t * d1x, p1.1 + t * d1y))
    } else {
        None
    }
}

fn points_close(a: Pt2, b: Pt2) -> bool {
    (a.0 - b.0).abs() < TOL && (a.1 - b.1).abs() < TOL
}

/// Removes consecutive duplicates and an explicit closing vertex.
fn dedupe(ring: Vec<Pt2>) -> Vec<Pt2> {
    let mut result: Vec<Pt2> = Vec::with_capacity(ring.len());
    for pt in ring {
        if result.last().is_none_or(|last| !points_close(*last, pt)) {
            result.push(pt);
        }
    }
    if result.len() > 1
        && let (Some(first), Some(last)) = (result.first().copied(), result.last().copied())
        && points_close(first, last)
    {
        result.pop();
    }
    result
}

/// Clips the subject polygon to the left half-plane of the directed edge
/// a -> b. The subject may be concave; the result's area is exact even when
/// the clip pinches it into connected degenerate parts.
pub(crate) fn clip_halfplane(subject: &[Pt2], a: Pt2, b: Pt2) -> Vec<Pt2> {
    if subject.is_empty() {
        return vec![];
    }
    let mut output = Vec::with_capacity(subject.len() + 4);
    for j in 0..subject.len() {
        let current = subject[j];
        let previous = subject[(j + subject.len() - 1) % subject.len()];

        let curr_inside = is_inside_edge(current, a, b);
        let prev_inside = is_inside_edge(previous, a, b);

        if curr_inside {
            if !prev_inside
                && let Some(x) = edge_intersection(previous, current, a, b)
            {
                output.push(x);
            }
            output.push(current);
        } else if prev_inside
            && let Some(x) = edge_intersection(previous, current, a, b)
        {
            output.push(x);
        }
    }
    dedupe(output)
}

/// Intersects a polygon with a convex counter-clockwise clipper.
///
/// # Arguments
/// * `subject` - Polygon to clip (may be concave)
/// * `clip` - Convex CCW clipping polygon
///
/// # Returns
/// The clipped ring, or an empty vector if nothing remains.
pub(crate) fn intersect_convex(subject: &[Pt2], clip: &[Pt2]) -> Vec<Pt2> {
    if subject.len() < 3 || clip.len() < 3 {
        return vec![];
    }
    let mut output = subject.to_vec();
    for i in 0..clip.len() {
        if output.len() < 3 {
            return vec![];
        }
        output = clip_halfplane(&output, clip[i], clip[(i + 1) % clip.len()]);
    }
    if output.len() < 3 { vec![] } else { output }
}

/// Area of `subject ∩ clip` with a convex CCW clipper (square degrees).
pub(crate) fn intersection_area(subject: &[Pt2], clip: &[Pt2]) -> f64 {
    area(&intersect_convex(subject, clip))
}

/// Subtracts a convex CCW clipper from the subject polygon.
///
/// The clipper's complement is decomposed into half-planes: piece `k` is
/// the part of the subject outside edge `k` but inside edges `0..k`. The
/// returned pieces are disjoint and cover `subject \ clip` exactly.
pub(crate) fn subtract_convex(subject: &[Pt2], clip: &[Pt2]) -> Vec<Vec<Pt2>> {
    if subject.len() < 3 {
        return vec![];
    }
    if clip.len() < 3 {
        return vec![subject.to_vec()];
    }
    let m = clip.len();
    let mut pieces = Vec::new();
    for k in 0..m {
        let a = clip[k];
        let b = clip[(k + 1) % m];
        // Outside of edge k = left of the reversed edge.
        let mut piece = clip_halfplane(subject, b, a);
        for j in 0..k {
            if piece.len() < 3 {
                break;
            }
            piece = clip_halfplane(&piece, clip[j], clip[(j + 1) % m]);
        }
        if piece.len() >= 3 && area(&piece) > AREA_EPS {
            pieces.push(piece);
        }
    }
    pieces
}

/// Area of `target ∩ (clip_1 ∪ clip_2 ∪ ...)` in square degrees.
///
/// Every clipper must be convex and CCW. The target is progressively carved:
/// each clipper contributes the part of the not-yet-covered target it
/// overlaps, so overlapping clippers are not double-counted.
pub(crate) fn union_intersection_area(target: &[Pt2], clips: &[Vec<Pt2>]) -> f64 {
    let mut pieces: Vec<Vec<Pt2>> = vec![target.to_vec()];
    let mut total = 0.0;
    for clip in clips {
        if pieces.is_empty() {
            break;
        }
        let mut remaining = Vec::new();
        for piece in &pieces {
            total += intersection_area(piece, clip);
            remaining.extend(subtract_convex(piece, clip));
        }
        pieces = remaining;
    }
    total
}
