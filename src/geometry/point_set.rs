use std::collections::BTreeMap;

use crate::math::{Point3, Vector3};

/// A set of points without connectivity, carrying named vector and integer arrays.
///
/// Used to hand bifurcation reference systems to downstream consumers.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSet {
    pub points: Vec<Point3>,
    pub vector_data: BTreeMap<String, Vec<Vector3>>,
    pub int_data: BTreeMap<String, Vec<i64>>,
}

impl PointSet {
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the named vector array, if present.
    #[must_use]
    pub fn vector_array(&self, name: &str) -> Option<&[Vector3]> {
        self.vector_data.get(name).map(Vec::as_slice)
    }

    /// Returns the named integer array, if present.
    #[must_use]
    pub fn int_array(&self, name: &str) -> Option<&[i64]> {
        self.int_data.get(name).map(Vec::as_slice)
    }
}
