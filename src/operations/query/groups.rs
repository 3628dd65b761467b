use std::collections::BTreeSet;

use crate::error::Result;
use crate::geometry::CenterlineMesh;
use crate::math::TOLERANCE;

/// Groups directly before and after a group along the originating centerlines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacentGroups {
    /// Groups holding the tract with `TractId - 1` on the same centerline.
    pub upstream: Vec<i64>,
    /// Groups holding the tract with `TractId + 1` on the same centerline.
    pub downstream: Vec<i64>,
}

/// Read-only queries over a split and grouped centerline mesh.
///
/// Group ids are always required; blanking and centerline/tract ids are
/// attached with [`with_blanking`](Self::with_blanking) and
/// [`with_tracts`](Self::with_tracts) when a query needs them.
#[derive(Debug, Clone, Copy)]
pub struct CenterlineGroups<'a> {
    mesh: &'a CenterlineMesh,
    group_ids: &'a [i64],
    blanking: Option<&'a [i64]>,
    tracts: Option<(&'a [i64], &'a [i64])>,
}

impl<'a> CenterlineGroups<'a> {
    /// Creates a view over `mesh` reading the named group id cell array.
    ///
    /// # Errors
    ///
    /// Returns an error if the group id array is missing.
    pub fn new(mesh: &'a CenterlineMesh, group_ids_name: &str) -> Result<Self> {
        Ok(Self {
            mesh,
            group_ids: mesh.require_cell_array(group_ids_name)?,
            blanking: None,
            tracts: None,
        })
    }

    /// Attaches the blanking cell array.
    ///
    /// # Errors
    ///
    /// Returns an error if the blanking array is missing.
    pub fn with_blanking(mut self, blanking_name: &str) -> Result<Self> {
        self.blanking = Some(self.mesh.require_cell_array(blanking_name)?);
        Ok(self)
    }

    /// Attaches the centerline id and tract id cell arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if either array is missing.
    pub fn with_tracts(mut self, centerline_ids_name: &str, tract_ids_name: &str) -> Result<Self> {
        let centerline_ids = self.mesh.require_cell_array(centerline_ids_name)?;
        let tract_ids = self.mesh.require_cell_array(tract_ids_name)?;
        self.tracts = Some((centerline_ids, tract_ids));
        Ok(self)
    }

    /// Group id of a cell.
    #[must_use]
    pub fn group_of(&self, cell_id: usize) -> Option<i64> {
        self.group_ids.get(cell_id).copied()
    }

    /// All distinct group ids, ascending.
    #[must_use]
    pub fn group_ids(&self) -> Vec<i64> {
        self.collect_groups(|_| true)
    }

    /// Group ids of blanked cells, ascending. Empty without blanking information.
    #[must_use]
    pub fn blanked_group_ids(&self) -> Vec<i64> {
        self.collect_groups(|cell| self.is_cell_blanked(cell))
    }

    /// Group ids of non-blanked cells, ascending.
    #[must_use]
    pub fn non_blanked_group_ids(&self) -> Vec<i64> {
        self.collect_groups(|cell| !self.is_cell_blanked(cell))
    }

    /// Returns `true` if any cell of the group is blanked.
    #[must_use]
    pub fn is_group_blanked(&self, group_id: i64) -> bool {
        (0..self.group_ids.len())
            .any(|cell| self.group_ids[cell] == group_id && self.is_cell_blanked(cell))
    }

    /// Cells belonging to a group, in cell order.
    #[must_use]
    pub fn group_cell_ids(&self, group_id: i64) -> Vec<usize> {
        (0..self.group_ids.len())
            .filter(|&cell| self.group_ids[cell] == group_id)
            .collect()
    }

    /// Cells belonging to a group, skipping cells whose first and last points
    /// both coincide with those of an earlier cell of the group.
    ///
    /// Distinct centerlines overlap physically, so the same tract usually
    /// appears once per centerline passing through it.
    #[must_use]
    pub fn unique_group_cell_ids(&self, group_id: i64) -> Vec<usize> {
        let points = self.mesh.points();
        let mut unique: Vec<usize> = Vec::new();
        for cell in self.group_cell_ids(group_id) {
            let Some((first, last)) = self.mesh.polyline_endpoints(cell) else {
                continue;
            };
            let duplicate = unique.iter().any(|&seen| {
                self.mesh
                    .polyline_endpoints(seen)
                    .is_some_and(|(seen_first, seen_last)| {
                        (points[first] - points[seen_first]).norm_squared() < TOLERANCE
                            && (points[last] - points[seen_last]).norm_squared() < TOLERANCE
                    })
            });
            if !duplicate {
                unique.push(cell);
            }
        }
        unique
    }

    /// Cells of one originating centerline, ordered by tract id.
    ///
    /// Empty without tract information.
    #[must_use]
    pub fn centerline_cell_ids(&self, centerline_id: i64) -> Vec<usize> {
        let Some((centerline_ids, tract_ids)) = self.tracts else {
            return Vec::new();
        };
        let mut cells: Vec<usize> = (0..centerline_ids.len())
            .filter(|&cell| centerline_ids[cell] == centerline_id)
            .collect();
        cells.sort_by_key(|&cell| tract_ids[cell]);
        cells
    }

    /// Groups adjacent to `group_id` along each centerline passing through it.
    ///
    /// Assumes tract ids are contiguous per centerline. Returns `None` without
    /// tract information.
    #[must_use]
    pub fn adjacent_groups(&self, group_id: i64) -> Option<AdjacentGroups> {
        let (centerline_ids, tract_ids) = self.tracts?;
        let mut upstream = BTreeSet::new();
        let mut downstream = BTreeSet::new();

        for cell in self.group_cell_ids(group_id) {
            if self.mesh.polyline(cell).is_none() {
                continue;
            }
            let centerline_id = centerline_ids[cell];
            let tract_id = tract_ids[cell];
            for other in 0..self.group_ids.len() {
                let other_group = self.group_ids[other];
                if other_group == group_id || centerline_ids[other] != centerline_id {
                    continue;
                }
                if tract_ids[other] == tract_id - 1 {
                    upstream.insert(other_group);
                }
                if tract_ids[other] == tract_id + 1 {
                    downstream.insert(other_group);
                }
            }
        }

        Some(AdjacentGroups {
            upstream: upstream.into_iter().collect(),
            downstream: downstream.into_iter().collect(),
        })
    }

    fn is_cell_blanked(&self, cell: usize) -> bool {
        self.blanking.is_some_and(|b| b[cell] != 0)
    }

    fn collect_groups(&self, keep: impl Fn(usize) -> bool) -> Vec<i64> {
        (0..self.group_ids.len())
            .filter(|&cell| keep(cell))
            .map(|cell| self.group_ids[cell])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
