use tracing::warn;

use crate::error::{GeometryError, Result};
use crate::geometry::{CellLocation, CenterlineMesh};
use crate::math::{Point3, TOLERANCE};

/// Result of evaluating a [`TubeDistanceField`] at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeEvaluation {
    /// Squared distance to the closest center minus the squared radius there.
    /// Negative inside the tube, positive outside.
    pub value: f64,
    /// Cell holding the closest center.
    pub cell_id: usize,
    /// Position of the closest center along that cell.
    pub location: CellLocation,
    /// The closest center on the centerline.
    pub center: Point3,
    /// Interpolated radius at the closest center (`0` without radius information).
    pub radius: f64,
}

/// Implicit function of a tapered tube swept along a set of centerline cells.
///
/// Each segment is treated as a line in `(x, y, z, r)` space with the
/// indefinite inner product `(+1, +1, +1, -1)`. The query point (with `r = 0`)
/// is projected onto that line, the parameter is clamped to the segment, and
/// the field value is `|x - c|² - r(c)²`. The minimum over all segments wins.
///
/// Evaluation holds no state; every call returns its own [`TubeEvaluation`].
#[derive(Debug, Clone)]
pub struct TubeDistanceField<'a> {
    mesh: &'a CenterlineMesh,
    radii: Option<&'a [f64]>,
    cells: Option<Vec<usize>>,
}

impl<'a> TubeDistanceField<'a> {
    /// Creates a field over all cells of `mesh`, using the named radius array.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no points or the radius array is missing.
    pub fn new(mesh: &'a CenterlineMesh, radius_array_name: &str) -> Result<Self> {
        check_not_empty(mesh)?;
        let radii = mesh.require_point_array(radius_array_name).inspect_err(|e| {
            warn!(error = %e, "tube distance field needs a radius array");
        })?;
        Ok(Self {
            mesh,
            radii: Some(radii),
            cells: None,
        })
    }

    /// Creates a field that ignores radii: the value is the squared distance
    /// to the closest point on the polylines.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no points.
    pub fn without_radius(mesh: &'a CenterlineMesh) -> Result<Self> {
        check_not_empty(mesh)?;
        Ok(Self {
            mesh,
            radii: None,
            cells: None,
        })
    }

    /// Restricts the field to the given cells.
    #[must_use]
    pub fn with_cells(mut self, cells: Vec<usize>) -> Self {
        self.cells = Some(cells);
        self
    }

    /// Restricts the field to a single cell.
    #[must_use]
    pub fn with_cell(self, cell: usize) -> Self {
        self.with_cells(vec![cell])
    }

    /// Evaluates the field at `point`.
    ///
    /// Returns `None` if the selected cells contain no usable segment.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> Option<TubeEvaluation> {
        match &self.cells {
            Some(cells) => self.evaluate_cells(point, cells.iter().copied()),
            None => self.evaluate_cells(point, 0..self.mesh.number_of_cells()),
        }
    }

    /// Field value at `point`; `f64::INFINITY` when there is nothing to evaluate.
    #[must_use]
    pub fn value(&self, point: &Point3) -> f64 {
        self.evaluate(point).map_or(f64::INFINITY, |e| e.value)
    }

    fn evaluate_cells(
        &self,
        x: &Point3,
        cells: impl Iterator<Item = usize>,
    ) -> Option<TubeEvaluation> {
        let points = self.mesh.points();
        let mut best: Option<TubeEvaluation> = None;

        for cell_id in cells {
            let Some(ids) = self.mesh.polyline(cell_id) else {
                continue;
            };

            for (sub_id, pair) in ids.windows(2).enumerate() {
                let p0 = &points[pair[0]];
                let p1 = &points[pair[1]];
                let (r0, r1) = match self.radii {
                    Some(radii) => (radii[pair[0]], radii[pair[1]]),
                    None => (0.0, 0.0),
                };

                let axis = p1 - p0;
                let dr = r1 - r0;
                let to_x = x - p0;

                let num = axis.dot(&to_x) + dr * r0;
                let den = axis.norm_squared() - dr * dr;

                if den.abs() < TOLERANCE {
                    continue;
                }

                let mut t = num / den;
                let (center, radius) = if t < TOLERANCE {
                    t = 0.0;
                    (*p0, r0)
                } else if 1.0 - t < TOLERANCE {
                    t = 1.0;
                    (*p1, r1)
                } else {
                    (p0 + axis * t, r0 + t * dr)
                };

                let value = (x - center).norm_squared() - radius * radius;

                if best.is_none_or(|b| value < b.value) {
                    best = Some(TubeEvaluation {
                        value,
                        cell_id,
                        location: CellLocation::new(sub_id, t),
                        center,
                        radius,
                    });
                }
            }
        }

        best
    }
}

fn check_not_empty(mesh: &CenterlineMesh) -> Result<()> {
    if mesh.number_of_points() == 0 {
        warn!("tube distance field over an empty mesh");
        return Err(GeometryError::EmptyInput("centerline mesh has no points").into());
    }
    Ok(())
}
