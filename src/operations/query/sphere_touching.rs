use crate::error::Result;
use crate::geometry::{CellLocation, CenterlineMesh};
use crate::math::{Point3, TOLERANCE};

/// Walking direction along a centerline cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Towards the first point of the cell.
    Upstream,
    /// Towards the last point of the cell.
    Downstream,
}

/// Finds the location a given number of touching spheres away from a reference
/// location on a centerline.
///
/// One sphere step walks along the cell, accumulating arc length from the
/// reference point, until the arc length equals the radius interpolated at the
/// walker's position. The result is thus scale-invariant: it depends on the
/// vessel size, not on absolute distances.
#[derive(Debug, Clone, Copy)]
pub struct SphereTouchingLocator<'a> {
    mesh: &'a CenterlineMesh,
    radii: &'a [f64],
}

impl<'a> SphereTouchingLocator<'a> {
    /// Creates a locator reading radii from the named point array.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius array is missing.
    pub fn new(mesh: &'a CenterlineMesh, radius_array_name: &str) -> Result<Self> {
        let radii = mesh.require_point_array(radius_array_name)?;
        Ok(Self { mesh, radii })
    }

    /// Walks `sphere_count` touching spheres from `from` along `cell_id` in `direction`.
    ///
    /// Returns `None` if the cell is not a polyline, `from` is not on it, or the
    /// walk runs off the end of the cell before covering all spheres.
    /// A `sphere_count` of zero returns `from` unchanged.
    #[must_use]
    pub fn find_touching(
        &self,
        cell_id: usize,
        from: CellLocation,
        direction: Direction,
        sphere_count: usize,
    ) -> Option<CellLocation> {
        let ids = self.mesh.polyline(cell_id)?;
        if from.sub_id + 1 >= ids.len() {
            return None;
        }
        let mut current = from;
        for _ in 0..sphere_count {
            current = self.find_single(ids, current, direction)?;
        }
        Some(current)
    }

    fn find_single(
        &self,
        ids: &[usize],
        from: CellLocation,
        direction: Direction,
    ) -> Option<CellLocation> {
        let segments = ids.len() - 1;
        let start_pcoord = from.pcoord.clamp(0.0, 1.0);
        let mut arc = 0.0;

        match direction {
            Direction::Downstream => {
                for sub_id in from.sub_id..segments {
                    let t_start = if sub_id == from.sub_id { start_pcoord } else { 0.0 };
                    let (len, r0, dr) = self.segment(ids, sub_id);
                    let excess = |t: f64| arc + (t - t_start) * len - (r0 + t * dr);
                    if excess(1.0) >= 0.0 {
                        let t = solve_crossing(excess, t_start, 1.0);
                        return Some(CellLocation::new(sub_id, t));
                    }
                    arc += (1.0 - t_start) * len;
                }
            }
            Direction::Upstream => {
                for sub_id in (0..=from.sub_id).rev() {
                    let t_start = if sub_id == from.sub_id { start_pcoord } else { 1.0 };
                    let (len, r0, dr) = self.segment(ids, sub_id);
                    let excess = |t: f64| arc + (t_start - t) * len - (r0 + t * dr);
                    if excess(0.0) >= 0.0 {
                        let t = solve_crossing(excess, t_start, 0.0);
                        return Some(CellLocation::new(sub_id, t));
                    }
                    arc += t_start * len;
                }
            }
        }

        None
    }

    /// Length, start radius and radius increment of segment `sub_id`.
    fn segment(&self, ids: &[usize], sub_id: usize) -> (f64, f64, f64) {
        let points = self.mesh.points();
        let p0: &Point3 = &points[ids[sub_id]];
        let p1: &Point3 = &points[ids[sub_id + 1]];
        let r0 = self.radii[ids[sub_id]];
        let r1 = self.radii[ids[sub_id + 1]];
        ((p1 - p0).norm(), r0, r1 - r0)
    }
}

/// Finds `t` between `from` and `to` where `excess` first reaches zero,
/// given `excess(to) >= 0`.
///
/// `excess` is linear in `t`, so the crossing is solved in closed form; when
/// it is numerically flat the interval is bisected instead.
fn solve_crossing(excess: impl Fn(f64) -> f64, from: f64, to: f64) -> f64 {
    let g_from = excess(from);
    if g_from >= 0.0 {
        return from;
    }
    let g_to = excess(to);
    let rise = g_to - g_from;

    if rise > TOLERANCE {
        let t = from + (to - from) * (-g_from / rise);
        return t.clamp(from.min(to), from.max(to));
    }

    let (mut inside, mut outside) = (from, to);
    for _ in 0..64 {
        let mid = 0.5 * (inside + outside);
        if excess(mid) >= 0.0 {
            outside = mid;
        } else {
            inside = mid;
        }
    }
    outside
}
