use std::cmp::Ordering;

use crate::math::vector_3d::lerp_point;
use crate::math::Point3;

/// A position along a polyline cell: segment index plus parametric coordinate.
///
/// `sub_id` indexes the segment between the cell's points `sub_id` and
/// `sub_id + 1`; `pcoord` runs from `0` at the first to `1` at the second.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellLocation {
    pub sub_id: usize,
    pub pcoord: f64,
}

impl CellLocation {
    #[must_use]
    pub fn new(sub_id: usize, pcoord: f64) -> Self {
        Self { sub_id, pcoord }
    }

    /// The first point of a polyline.
    #[must_use]
    pub fn start() -> Self {
        Self::new(0, 0.0)
    }

    /// The last point of a polyline with `number_of_points` points.
    #[must_use]
    pub fn end(number_of_points: usize) -> Self {
        Self::new(number_of_points.saturating_sub(2), 1.0)
    }

    /// Orders two locations along the cell, comparing `(sub_id, pcoord)` lexicographically.
    #[must_use]
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.sub_id
            .cmp(&other.sub_id)
            .then_with(|| self.pcoord.total_cmp(&other.pcoord))
    }

    /// Returns `true` if `self` lies at or before `other` along the cell.
    #[must_use]
    pub fn is_at_or_before(&self, other: &Self) -> bool {
        self.cmp_position(other) != Ordering::Greater
    }

    /// Interpolates the position on the polyline described by `point_ids`.
    ///
    /// Returns `None` if `sub_id` does not index a segment.
    #[must_use]
    pub fn point(&self, points: &[Point3], point_ids: &[usize]) -> Option<Point3> {
        let p0 = points.get(*point_ids.get(self.sub_id)?)?;
        let p1 = points.get(*point_ids.get(self.sub_id + 1)?)?;
        Some(lerp_point(p0, p1, self.pcoord))
    }

    /// Interpolates a per-point scalar array at this location.
    #[must_use]
    pub fn scalar(&self, values: &[f64], point_ids: &[usize]) -> Option<f64> {
        let v0 = values.get(*point_ids.get(self.sub_id)?)?;
        let v1 = values.get(*point_ids.get(self.sub_id + 1)?)?;
        Some(v0 + self.pcoord * (v1 - v0))
    }
}
