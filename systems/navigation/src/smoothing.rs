//! Greedy line-of-sight reduction of raw waypoint sequences.

use glam::Vec3;

/// Height offset applied to both endpoints of every visibility probe.
///
/// Probing at the grid's logical zero height grazes floor geometry and
/// reports spurious hits; raising the segment keeps the oracle answering
/// about walls only.
pub const LINE_OF_SIGHT_HEIGHT: f32 = 0.5;

/// External collaborator answering whether the straight segment between two
/// world points is blocked.
///
/// Implemented for closures, so hosts and tests can inject `|from, to| …`
/// directly.
pub trait ObstacleOracle {
    /// Reports whether the segment from `from` to `to` is obstructed.
    fn is_blocked(&self, from: Vec3, to: Vec3) -> bool;
}

impl<F> ObstacleOracle for F
where
    F: Fn(Vec3, Vec3) -> bool,
{
    fn is_blocked(&self, from: Vec3, to: Vec3) -> bool {
        self(from, to)
    }
}

/// Reduces a waypoint sequence to the subsequence that still clears the
/// obstacle oracle between consecutive points.
///
/// Greedy forward extension: from the last accepted point, the furthest
/// input point with a clear segment is accepted next. When no forward point
/// is clear the immediate successor is accepted regardless, so the output
/// degenerates to the input instead of stalling. The first and last input
/// points always survive, relative order is preserved, and the output is
/// never longer than the input.
#[must_use]
pub fn simplify<O: ObstacleOracle>(points: Vec<Vec3>, oracle: &O) -> Vec<Vec3> {
    if points.len() <= 2 {
        return points;
    }

    let raise = Vec3::new(0.0, LINE_OF_SIGHT_HEIGHT, 0.0);
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);

    let mut anchor = 0usize;
    while anchor + 1 < points.len() {
        let mut accepted = anchor + 1;
        for probe in anchor + 1..points.len() {
            if !oracle.is_blocked(points[anchor] + raise, points[probe] + raise) {
                accepted = probe;
            }
        }

        out.push(points[accepted]);
        anchor = accepted;
    }

    out
}
