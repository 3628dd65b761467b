use tracing::debug;

use super::{ComputeSplitting, SplitRecord};
use crate::error::Result;
use crate::geometry::{CellLocation, CenterlineMesh};
use crate::math::{Point3, TOLERANCE};
use crate::operations::query::TubeDistanceField;

/// How the blanked window is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointWindowMode {
    /// A window of `gap_length` arc length centered on the projection of `point`.
    PointAndGap { point: Point3, gap_length: f64 },
    /// The stretch between the projections of two points.
    BetweenPoints { first: Point3, second: Point3 },
}

/// Blanks a window around user-supplied points on every centerline that
/// passes through them.
///
/// A cell is left unsplit when a point's squared distance to it exceeds
/// `tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointWindowSplitting {
    pub mode: PointWindowMode,
    pub tolerance: f64,
}

impl PointWindowSplitting {
    pub const DEFAULT_TOLERANCE: f64 = 1e-4;
    pub const DEFAULT_GAP_LENGTH: f64 = 1.0;

    /// A window of [`DEFAULT_GAP_LENGTH`](Self::DEFAULT_GAP_LENGTH) around `point`.
    #[must_use]
    pub fn at_point(point: Point3) -> Self {
        Self::point_and_gap(point, Self::DEFAULT_GAP_LENGTH)
    }

    #[must_use]
    pub fn point_and_gap(point: Point3, gap_length: f64) -> Self {
        Self {
            mode: PointWindowMode::PointAndGap { point, gap_length },
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    #[must_use]
    pub fn between_points(first: Point3, second: Point3) -> Self {
        Self {
            mode: PointWindowMode::BetweenPoints { first, second },
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Projects `point` onto the cell, or `None` if it is farther than the tolerance.
    fn project(&self, field: &TubeDistanceField<'_>, point: &Point3) -> Option<CellLocation> {
        field
            .evaluate(point)
            .filter(|e| e.value <= self.tolerance)
            .map(|e| e.location)
    }
}

impl ComputeSplitting for PointWindowSplitting {
    fn compute_splitting(
        &self,
        mesh: &CenterlineMesh,
        _radius_array_name: &str,
        cell_id: usize,
    ) -> Result<SplitRecord> {
        let Some(ids) = mesh.polyline(cell_id) else {
            return Ok(SplitRecord::unsplit());
        };
        let field = TubeDistanceField::without_radius(mesh)?.with_cell(cell_id);

        let window = match self.mode {
            PointWindowMode::PointAndGap { point, gap_length } => {
                self.project(&field, &point).map(|center| {
                    let abscissas = cumulative_abscissas(mesh.points(), ids);
                    let at = abscissa_of(&abscissas, center);
                    let half = 0.5 * gap_length;
                    (
                        location_at(&abscissas, at - half),
                        location_at(&abscissas, at + half),
                    )
                })
            }
            PointWindowMode::BetweenPoints { first, second } => self
                .project(&field, &first)
                .zip(self.project(&field, &second))
                .map(|(a, b)| if b.is_at_or_before(&a) { (b, a) } else { (a, b) }),
        };

        let Some((lower, upper)) = window else {
            return Ok(SplitRecord::unsplit());
        };
        debug!(cell_id, ?lower, ?upper, "point window splitting");

        let mut record = SplitRecord::unsplit();
        record.push(lower, true);
        record.push(upper, false);
        Ok(record)
    }
}

/// Arc length from the first point to every point of the polyline.
fn cumulative_abscissas(points: &[Point3], ids: &[usize]) -> Vec<f64> {
    let mut abscissas = Vec::with_capacity(ids.len());
    let mut total = 0.0;
    abscissas.push(total);
    for pair in ids.windows(2) {
        total += (points[pair[1]] - points[pair[0]]).norm();
        abscissas.push(total);
    }
    abscissas
}

fn abscissa_of(abscissas: &[f64], location: CellLocation) -> f64 {
    let a0 = abscissas[location.sub_id];
    let a1 = abscissas[location.sub_id + 1];
    a0 + location.pcoord * (a1 - a0)
}

/// The location at arc length `abscissa`, clamped to the polyline's terminals.
fn location_at(abscissas: &[f64], abscissa: f64) -> CellLocation {
    let segments = abscissas.len() - 1;
    if abscissa <= 0.0 {
        return CellLocation::start();
    }
    for sub_id in 0..segments {
        let a0 = abscissas[sub_id];
        let a1 = abscissas[sub_id + 1];
        let length = a1 - a0;
        if abscissa <= a1 && length > TOLERANCE {
            return CellLocation::new(sub_id, ((abscissa - a0) / length).clamp(0.0, 1.0));
        }
    }
    CellLocation::end(abscissas.len())
}
