use std::collections::BTreeSet;

use tracing::debug;

use crate::config::ArrayNames;
use crate::error::Result;
use crate::geometry::{Cell, CenterlineMesh};

/// Fuses consecutive tracts of one centerline that share a group.
///
/// On each centerline, when two tracts share a group, every tract between
/// them is moved into that group. Runs of same-group tracts are then
/// concatenated into one cell that keeps the cell arrays of the run's first
/// tract. Output cells are ordered by centerline id, then tract id; points
/// and point arrays are unchanged.
///
/// Returns the merged tracts and their group ids.
pub(super) fn merge_tracts(
    tracts: &CenterlineMesh,
    mut groups: Vec<i64>,
    names: &ArrayNames,
) -> Result<(CenterlineMesh, Vec<i64>)> {
    let centerline_ids = tracts.require_cell_array(&names.centerline_ids)?;
    let tract_ids = tracts.require_cell_array(&names.tract_ids)?;
    let centerlines: BTreeSet<i64> = centerline_ids.iter().copied().collect();

    let mut merged = tracts.points_only();
    let mut source_cells = Vec::new();
    let mut merged_groups = Vec::new();

    for centerline in centerlines {
        let mut cells: Vec<usize> = (0..tracts.number_of_cells())
            .filter(|&c| centerline_ids[c] == centerline)
            .collect();
        cells.sort_by_key(|&c| tract_ids[c]);

        for j in 0..cells.len() {
            let group = groups[cells[j]];
            if let Some(k) = (j + 1..cells.len()).rev().find(|&k| groups[cells[k]] == group) {
                for &between in &cells[j + 1..k] {
                    groups[between] = group;
                }
            }
        }

        let mut runs: Vec<Vec<usize>> = Vec::new();
        for &cell in &cells {
            match runs.last_mut() {
                Some(run) if groups[run[0]] == groups[cell] => run.push(cell),
                _ => runs.push(vec![cell]),
            }
        }

        for run in runs {
            let mut point_ids: Vec<usize> = Vec::new();
            for &cell in &run {
                let Some(cell_points) = tracts.cell(cell).map(|c| c.point_ids.as_slice()) else {
                    continue;
                };
                let skip = usize::from(!point_ids.is_empty());
                point_ids.extend(cell_points.iter().skip(skip).copied());
            }
            if run.len() > 1 {
                debug!(centerline, tracts = run.len(), "merging tracts");
            }
            merged.add_cell(Cell::polyline(point_ids))?;
            source_cells.push(run[0]);
            merged_groups.push(groups[run[0]]);
        }
    }

    for (name, values) in tracts.cell_arrays() {
        merged.set_cell_array(name, source_cells.iter().map(|&c| values[c]).collect())?;
    }

    Ok((merged, merged_groups))
}
