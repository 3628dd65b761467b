//! Centerline splitting into tracts and grouping of tracts into branches.
//!
//! A run goes through four stages:
//!
//! 1. every input cell gets a [`SplitRecord`] from the selected [`SplittingStrategy`];
//! 2. the cells are cut into tracts at the recorded locations;
//! 3. tracts are grouped into branches (and optionally merged);
//! 4. group ids and tract ids are renumbered to contiguous ranges.
//!
//! [`CenterlineSplitter`] drives the whole sequence.

mod endpoint;
mod grouping;
mod merge;
mod point_window;
mod renumber;
mod splitter;
mod tracts;
mod tree_branch;

pub use endpoint::{EndpointMode, EndpointSplitting};
pub use point_window::{PointWindowMode, PointWindowSplitting};
pub use splitter::CenterlineSplitter;
pub use tree_branch::TreeBranchSplitting;

use crate::error::Result;
use crate::geometry::{CellLocation, CenterlineMesh};

/// Cut locations along one centerline cell and the blanking flag of each
/// resulting tract.
///
/// There is always one more blanking flag than cuts: flag `i` covers the
/// stretch between cut `i - 1` and cut `i`, the first flag the stretch before
/// the first cut and the last flag the stretch after the last cut.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    cuts: Vec<CellLocation>,
    blanking: Vec<bool>,
}

impl Default for SplitRecord {
    fn default() -> Self {
        Self::unsplit()
    }
}

impl SplitRecord {
    /// A record with no cuts: the whole cell becomes a single non-blanked tract.
    #[must_use]
    pub fn unsplit() -> Self {
        Self {
            cuts: Vec::new(),
            blanking: vec![false],
        }
    }

    /// Appends a cut; `blanked` flags the stretch that starts at it.
    pub fn push(&mut self, cut: CellLocation, blanked: bool) {
        self.cuts.push(cut);
        self.blanking.push(blanked);
    }

    #[must_use]
    pub fn cuts(&self) -> &[CellLocation] {
        &self.cuts
    }

    #[must_use]
    pub fn blanking(&self) -> &[bool] {
        &self.blanking
    }

    #[must_use]
    pub fn number_of_cuts(&self) -> usize {
        self.cuts.len()
    }

    /// Returns `true` if the record has no cuts.
    #[must_use]
    pub fn is_unsplit(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Raises every cut that lies before its predecessor up to the predecessor.
    fn make_monotonic(&mut self) {
        for i in 1..self.cuts.len() {
            if !self.cuts[i - 1].is_at_or_before(&self.cuts[i]) {
                self.cuts[i] = self.cuts[i - 1];
            }
        }
    }
}

/// Computes where a single centerline cell is cut.
pub trait ComputeSplitting {
    /// Computes the split record of `cell_id`.
    ///
    /// Cells that are not polylines with at least two points yield an
    /// unsplit record.
    ///
    /// # Errors
    ///
    /// Returns an error if an array the strategy needs is missing.
    fn compute_splitting(
        &self,
        mesh: &CenterlineMesh,
        radius_array_name: &str,
        cell_id: usize,
    ) -> Result<SplitRecord>;
}

/// The interchangeable ways of placing cuts along centerlines.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplittingStrategy {
    /// Blank the stretches where a centerline runs inside a neighbor's tube.
    TreeBranch(TreeBranchSplitting),
    /// Blank a short gap a fixed number of spheres away from the terminals.
    Endpoint(EndpointSplitting),
    /// Blank a window around one point, or between two points.
    PointWindow(PointWindowSplitting),
}

impl Default for SplittingStrategy {
    fn default() -> Self {
        Self::TreeBranch(TreeBranchSplitting::default())
    }
}

impl ComputeSplitting for SplittingStrategy {
    fn compute_splitting(
        &self,
        mesh: &CenterlineMesh,
        radius_array_name: &str,
        cell_id: usize,
    ) -> Result<SplitRecord> {
        match self {
            Self::TreeBranch(s) => s.compute_splitting(mesh, radius_array_name, cell_id),
            Self::Endpoint(s) => s.compute_splitting(mesh, radius_array_name, cell_id),
            Self::PointWindow(s) => s.compute_splitting(mesh, radius_array_name, cell_id),
        }
    }
}

impl From<TreeBranchSplitting> for SplittingStrategy {
    fn from(strategy: TreeBranchSplitting) -> Self {
        Self::TreeBranch(strategy)
    }
}

impl From<EndpointSplitting> for SplittingStrategy {
    fn from(strategy: EndpointSplitting) -> Self {
        Self::Endpoint(strategy)
    }
}

impl From<PointWindowSplitting> for SplittingStrategy {
    fn from(strategy: PointWindowSplitting) -> Self {
        Self::PointWindow(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsplit_record_has_one_flag() {
        let record = SplitRecord::unsplit();
        assert!(record.is_unsplit());
        assert_eq!(record.blanking(), &[false]);
    }

    #[test]
    fn push_keeps_flags_one_ahead_of_cuts() {
        let mut record = SplitRecord::unsplit();
        record.push(CellLocation::new(1, 0.5), true);
        record.push(CellLocation::new(2, 0.5), false);
        assert_eq!(record.number_of_cuts(), 2);
        assert_eq!(record.blanking(), &[false, true, false]);
    }

    #[test]
    fn make_monotonic_raises_backward_cuts() {
        let mut record = SplitRecord::unsplit();
        record.push(CellLocation::new(3, 0.2), true);
        record.push(CellLocation::new(1, 0.9), false);
        record.make_monotonic();
        assert_eq!(record.cuts()[1], CellLocation::new(3, 0.2));
    }
}
