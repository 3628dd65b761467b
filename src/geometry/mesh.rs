use std::collections::BTreeMap;

use crate::error::{ConfigError, GeometryError};
use crate::math::Point3;

/// The kind of connectivity a cell carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    /// A single point.
    Vertex,
    /// A two-point line segment.
    Line,
    /// An ordered sequence of points joined by segments.
    PolyLine,
}

/// A cell: an ordered list of indices into the mesh point list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub cell_type: CellType,
    pub point_ids: Vec<usize>,
}

impl Cell {
    /// Creates a polyline cell.
    #[must_use]
    pub fn polyline(point_ids: Vec<usize>) -> Self {
        Self {
            cell_type: CellType::PolyLine,
            point_ids,
        }
    }

    /// Returns `true` if this cell is a line or polyline with at least two points.
    #[must_use]
    pub fn is_polyline(&self) -> bool {
        matches!(self.cell_type, CellType::Line | CellType::PolyLine) && self.point_ids.len() >= 2
    }
}

/// An in-memory centerline mesh.
///
/// Points carry named scalar `f64` arrays (e.g. the inscribed sphere radius);
/// cells carry named integer arrays (group ids, tract ids, blanking flags).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenterlineMesh {
    points: Vec<Point3>,
    cells: Vec<Cell>,
    point_data: BTreeMap<String, Vec<f64>>,
    cell_data: BTreeMap<String, Vec<i64>>,
}

impl CenterlineMesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Points ---

    /// Appends a point and returns its index.
    pub fn add_point(&mut self, point: Point3) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Returns all points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the point with the given index.
    #[must_use]
    pub fn point(&self, id: usize) -> Option<&Point3> {
        self.points.get(id)
    }

    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    // --- Cells ---

    /// Appends a cell and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell references a point that does not exist.
    pub fn add_cell(&mut self, cell: Cell) -> Result<usize, GeometryError> {
        let cell_id = self.cells.len();
        if let Some(&point_id) = cell.point_ids.iter().find(|&&id| id >= self.points.len()) {
            return Err(GeometryError::PointOutOfRange { cell_id, point_id });
        }
        self.cells.push(cell);
        Ok(cell_id)
    }

    /// Returns a copy holding the same points and point arrays, with no cells.
    #[must_use]
    pub fn points_only(&self) -> Self {
        Self {
            points: self.points.clone(),
            cells: Vec::new(),
            point_data: self.point_data.clone(),
            cell_data: BTreeMap::new(),
        }
    }

    /// Appends the given points and a polyline cell through them.
    ///
    /// Returns the new cell index.
    pub fn add_polyline_points(&mut self, points: &[Point3]) -> usize {
        let first = self.points.len();
        self.points.extend_from_slice(points);
        self.cells
            .push(Cell::polyline((first..first + points.len()).collect()));
        self.cells.len() - 1
    }

    /// Returns all cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the cell with the given index.
    #[must_use]
    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the point ids of a cell if it is a polyline with at least two points.
    #[must_use]
    pub fn polyline(&self, cell_id: usize) -> Option<&[usize]> {
        self.cells
            .get(cell_id)
            .filter(|c| c.is_polyline())
            .map(|c| c.point_ids.as_slice())
    }

    /// Returns the first and last point of a polyline cell.
    #[must_use]
    pub fn polyline_endpoints(&self, cell_id: usize) -> Option<(usize, usize)> {
        let ids = self.polyline(cell_id)?;
        Some((*ids.first()?, *ids.last()?))
    }

    // --- Point data ---

    /// Adds (or replaces) a named point array.
    ///
    /// # Errors
    ///
    /// Returns an error if the array length does not match the number of points.
    pub fn set_point_array(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if values.len() != self.points.len() {
            return Err(ConfigError::ArrayLength {
                name,
                expected: self.points.len(),
                actual: values.len(),
            });
        }
        self.point_data.insert(name, values);
        Ok(())
    }

    /// Returns the named point array, if present.
    #[must_use]
    pub fn point_array(&self, name: &str) -> Option<&[f64]> {
        self.point_data.get(name).map(Vec::as_slice)
    }

    /// Returns the named point array, failing if it is absent or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the array does not exist, or its
    /// length differs from the number of points.
    pub fn require_point_array(&self, name: &str) -> Result<&[f64], ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::UnsetParameter("point array name"));
        }
        let values = self
            .point_array(name)
            .ok_or_else(|| ConfigError::MissingPointArray(name.to_owned()))?;
        if values.len() != self.points.len() {
            return Err(ConfigError::ArrayLength {
                name: name.to_owned(),
                expected: self.points.len(),
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Iterates over `(name, values)` of all point arrays, in name order.
    pub fn point_arrays(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.point_data
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // --- Cell data ---

    /// Adds (or replaces) a named cell array.
    ///
    /// # Errors
    ///
    /// Returns an error if the array length does not match the number of cells.
    pub fn set_cell_array(
        &mut self,
        name: impl Into<String>,
        values: Vec<i64>,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if values.len() != self.cells.len() {
            return Err(ConfigError::ArrayLength {
                name,
                expected: self.cells.len(),
                actual: values.len(),
            });
        }
        self.cell_data.insert(name, values);
        Ok(())
    }

    /// Returns the named cell array, if present.
    #[must_use]
    pub fn cell_array(&self, name: &str) -> Option<&[i64]> {
        self.cell_data.get(name).map(Vec::as_slice)
    }

    /// Returns the named cell array, failing if it is absent or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the array does not exist, or its
    /// length differs from the number of cells.
    pub fn require_cell_array(&self, name: &str) -> Result<&[i64], ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::UnsetParameter("cell array name"));
        }
        let values = self
            .cell_array(name)
            .ok_or_else(|| ConfigError::MissingCellArray(name.to_owned()))?;
        if values.len() != self.cells.len() {
            return Err(ConfigError::ArrayLength {
                name: name.to_owned(),
                expected: self.cells.len(),
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Iterates over `(name, values)` of all cell arrays, in name order.
    pub fn cell_arrays(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.cell_data
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn add_polyline_points_creates_cell() {
        let mut mesh = CenterlineMesh::new();
        let id = mesh.add_polyline_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        assert_eq!(id, 0);
        assert_eq!(mesh.number_of_points(), 3);
        assert_eq!(mesh.polyline(0).unwrap(), &[0, 1, 2]);
        assert_eq!(mesh.polyline_endpoints(0), Some((0, 2)));
    }

    #[test]
    fn vertex_cell_is_not_a_polyline() {
        let mut mesh = CenterlineMesh::new();
        mesh.add_point(p(0.0, 0.0, 0.0));
        let id = mesh
            .add_cell(Cell {
                cell_type: CellType::Vertex,
                point_ids: vec![0],
            })
            .unwrap();
        assert!(mesh.polyline(id).is_none());

        let single = mesh.add_cell(Cell::polyline(vec![0])).unwrap();
        assert!(mesh.polyline(single).is_none());
    }

    #[test]
    fn add_cell_rejects_dangling_point_ids() {
        let mut mesh = CenterlineMesh::new();
        mesh.add_point(p(0.0, 0.0, 0.0));
        let err = mesh.add_cell(Cell::polyline(vec![0, 5])).unwrap_err();
        assert_eq!(
            err,
            GeometryError::PointOutOfRange {
                cell_id: 0,
                point_id: 5
            }
        );
    }

    #[test]
    fn require_point_array_reports_missing_and_unset() {
        let mut mesh = CenterlineMesh::new();
        mesh.add_polyline_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        assert_eq!(
            mesh.require_point_array("Radius").unwrap_err(),
            ConfigError::MissingPointArray("Radius".into())
        );
        assert_eq!(
            mesh.require_point_array("").unwrap_err(),
            ConfigError::UnsetParameter("point array name")
        );
        mesh.set_point_array("Radius", vec![1.0, 1.0]).unwrap();
        assert_eq!(mesh.require_point_array("Radius").unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn set_arrays_check_length() {
        let mut mesh = CenterlineMesh::new();
        mesh.add_polyline_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        assert!(mesh.set_point_array("Radius", vec![1.0]).is_err());
        assert!(mesh.set_cell_array("GroupIds", vec![0, 1]).is_err());
        assert!(mesh.set_cell_array("GroupIds", vec![3]).is_ok());
        assert_eq!(mesh.require_cell_array("GroupIds").unwrap(), &[3]);
    }

    #[test]
    fn points_only_drops_cells_and_cell_data() {
        let mut mesh = CenterlineMesh::new();
        mesh.add_polyline_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        mesh.set_point_array("Radius", vec![1.0, 2.0]).unwrap();
        mesh.set_cell_array("GroupIds", vec![0]).unwrap();

        let bare = mesh.points_only();
        assert_eq!(bare.number_of_points(), 2);
        assert_eq!(bare.number_of_cells(), 0);
        assert_eq!(bare.point_array("Radius").unwrap(), &[1.0, 2.0]);
        assert!(bare.cell_array("GroupIds").is_none());
    }
}
