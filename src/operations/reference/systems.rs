use crate::config::ArrayNames;
use crate::geometry::PointSet;
use crate::math::{Point3, Vector3};

/// Local frame of one bifurcation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceSystem {
    /// Group id of the blanked bifurcation group.
    pub group_id: i64,
    pub origin: Point3,
    /// Unit normal of the bifurcation plane.
    pub normal: Vector3,
    /// Unit vector in the bifurcation plane, pointing downstream.
    pub up_normal: Vector3,
}

/// Reference systems of all bifurcations of a labeled centerline mesh,
/// ordered by group id.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceSystems {
    systems: Vec<ReferenceSystem>,
}

impl ReferenceSystems {
    pub(super) fn new(systems: Vec<ReferenceSystem>) -> Self {
        Self { systems }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ReferenceSystem] {
        &self.systems
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSystem> {
        self.systems.iter()
    }

    /// The reference system of a bifurcation group.
    #[must_use]
    pub fn get(&self, group_id: i64) -> Option<&ReferenceSystem> {
        self.systems.iter().find(|s| s.group_id == group_id)
    }

    /// Exports the systems as a point set: one point per bifurcation at its
    /// origin, carrying normal, up-normal and group id arrays.
    #[must_use]
    pub fn to_point_set(&self, names: &ArrayNames) -> PointSet {
        let mut set = PointSet {
            points: self.systems.iter().map(|s| s.origin).collect(),
            ..PointSet::default()
        };
        set.vector_data.insert(
            names.normal.clone(),
            self.systems.iter().map(|s| s.normal).collect(),
        );
        set.vector_data.insert(
            names.up_normal.clone(),
            self.systems.iter().map(|s| s.up_normal).collect(),
        );
        set.int_data.insert(
            names.group_ids.clone(),
            self.systems.iter().map(|s| s.group_id).collect(),
        );
        set
    }
}

impl<'a> IntoIterator for &'a ReferenceSystems {
    type Item = &'a ReferenceSystem;
    type IntoIter = std::slice::Iter<'a, ReferenceSystem>;

    fn into_iter(self) -> Self::IntoIter {
        self.systems.iter()
    }
}
