#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use super::grouping::group_tracts;
use super::merge::merge_tracts;
use super::renumber::{make_group_ids_adjacent, make_tract_ids_adjacent};
use super::tracts::split_into_tracts;
use super::{ComputeSplitting, SplitRecord, SplittingStrategy};
use crate::config::SplitterConfig;
use crate::error::Result;
use crate::geometry::CenterlineMesh;

/// Splits a set of centerlines into tracts and groups the tracts into branches.
///
/// The output mesh holds one polyline cell per tract with the input point
/// arrays interpolated onto it, the input cell arrays copied from the
/// originating cell, and the group id, centerline id, tract id and blanking
/// cell arrays named in the configuration. Group ids and per-centerline tract
/// ids are contiguous from zero.
///
/// ```no_run
/// use vessel_branches::operations::split::{CenterlineSplitter, TreeBranchSplitting};
/// use vessel_branches::{CenterlineMesh, SplitterConfig};
///
/// # fn run(centerlines: &CenterlineMesh) -> vessel_branches::Result<()> {
/// let tracts = CenterlineSplitter::new(TreeBranchSplitting::default(), SplitterConfig::default())
///     .execute(centerlines)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CenterlineSplitter {
    strategy: SplittingStrategy,
    config: SplitterConfig,
}

impl CenterlineSplitter {
    /// Creates a new `CenterlineSplitter` operation.
    #[must_use]
    pub fn new(strategy: impl Into<SplittingStrategy>, config: SplitterConfig) -> Self {
        Self {
            strategy: strategy.into(),
            config,
        }
    }

    /// Returns the strategy used to cut each centerline.
    #[must_use]
    pub fn strategy(&self) -> &SplittingStrategy {
        &self.strategy
    }

    /// Returns the array names and grouping options of this run.
    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an array name is unset or the radius
    /// array is missing. Nothing is produced in that case. Degenerate cells
    /// and tracts are skipped, never reported as errors.
    pub fn execute(&self, mesh: &CenterlineMesh) -> Result<CenterlineMesh> {
        let names = &self.config.names;
        names.validate_for_splitting().inspect_err(|e| {
            warn!(error = %e, "centerline splitter is not configured");
        })?;
        mesh.require_point_array(&names.radius).inspect_err(|e| {
            warn!(error = %e, "centerline splitter needs a radius array");
        })?;

        let records = compute_records(&self.strategy, mesh, &names.radius)?;
        let split_cells = records.iter().filter(|(_, r)| !r.is_unsplit()).count();

        let tracts = split_into_tracts(mesh, &records, names)?;
        let groups = group_tracts(&tracts, self.config.grouping_mode, names)?;
        let (mut output, mut groups) = if self.config.merge_tracts {
            merge_tracts(&tracts, groups, names)?
        } else {
            (tracts, groups)
        };

        make_group_ids_adjacent(&mut groups);
        let mut tract_ids = output.require_cell_array(&names.tract_ids)?.to_vec();
        let centerline_ids = output.require_cell_array(&names.centerline_ids)?.to_vec();
        make_tract_ids_adjacent(&centerline_ids, &mut tract_ids);

        let number_of_groups = groups.iter().max().map_or(0, |g| g + 1);
        output.set_cell_array(names.group_ids.as_str(), groups)?;
        output.set_cell_array(names.tract_ids.as_str(), tract_ids)?;

        info!(
            cells = mesh.number_of_cells(),
            split_cells,
            tracts = output.number_of_cells(),
            groups = number_of_groups,
            "centerline splitting finished"
        );
        Ok(output)
    }
}

#[cfg(feature = "parallel")]
fn compute_records(
    strategy: &SplittingStrategy,
    mesh: &CenterlineMesh,
    radius_array_name: &str,
) -> Result<Vec<(usize, SplitRecord)>> {
    (0..mesh.number_of_cells())
        .into_par_iter()
        .map(|cell_id| {
            strategy
                .compute_splitting(mesh, radius_array_name, cell_id)
                .map(|record| (cell_id, record))
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_records(
    strategy: &SplittingStrategy,
    mesh: &CenterlineMesh,
    radius_array_name: &str,
) -> Result<Vec<(usize, SplitRecord)>> {
    (0..mesh.number_of_cells())
        .map(|cell_id| {
            strategy
                .compute_splitting(mesh, radius_array_name, cell_id)
                .map(|record| (cell_id, record))
        })
        .collect()
}
