use tracing::debug;

use super::{ComputeSplitting, SplitRecord};
use crate::error::Result;
use crate::geometry::{CellLocation, CenterlineMesh};
use crate::math::vector_3d::lerp_point;
use crate::math::{Point3, TOLERANCE};
use crate::operations::query::{Direction, SphereTouchingLocator, TubeDistanceField};

/// Splits centerlines of a divergent tree where they leave each other's tubes.
///
/// For every other cell, the points where this cell exits the other cell's
/// tube are collected. Each exit is paired with a location `gap_spheres`
/// touching spheres upstream of it, and the stretch in between is blanked.
/// Overlapping stretches are fused so that blanked and non-blanked tracts
/// alternate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeBranchSplitting {
    /// Touching spheres between the start of a blanked stretch and the tube exit.
    pub gap_spheres: usize,
    /// Step of the exit refinement, as a fraction of the local mean radius.
    pub refinement_step_fraction: f64,
}

impl Default for TreeBranchSplitting {
    fn default() -> Self {
        Self {
            gap_spheres: 1,
            refinement_step_fraction: 1e-2,
        }
    }
}

impl ComputeSplitting for TreeBranchSplitting {
    fn compute_splitting(
        &self,
        mesh: &CenterlineMesh,
        radius_array_name: &str,
        cell_id: usize,
    ) -> Result<SplitRecord> {
        let Some(ids) = mesh.polyline(cell_id) else {
            return Ok(SplitRecord::unsplit());
        };
        let radii = mesh.require_point_array(radius_array_name)?;
        let field = TubeDistanceField::new(mesh, radius_array_name)?;
        let locator = SphereTouchingLocator::new(mesh, radius_array_name)?;

        let mut exits: Vec<CellLocation> = Vec::new();
        for other in 0..mesh.number_of_cells() {
            if other == cell_id || mesh.polyline(other).is_none() {
                continue;
            }
            let tube = field.clone().with_cell(other);
            for exit in self.tube_exits(mesh.points(), radii, ids, &tube) {
                let at = exits.partition_point(|e| e.cmp_position(&exit).is_lt());
                exits.insert(at, exit);
            }
        }

        if exits.is_empty() {
            return Ok(SplitRecord::unsplit());
        }

        let touchings: Vec<CellLocation> = exits
            .iter()
            .map(|&exit| {
                locator
                    .find_touching(cell_id, exit, Direction::Upstream, self.gap_spheres)
                    .unwrap_or(exit)
            })
            .collect();

        let record = pair_touchings(&touchings, &exits);
        debug!(
            cell_id,
            exits = exits.len(),
            cuts = record.number_of_cuts(),
            "tree branch splitting"
        );
        Ok(record)
    }
}

impl TreeBranchSplitting {
    /// Locations along `ids` where the polyline goes from inside `tube`
    /// (value `<= 0`) to outside (value `> 0`).
    fn tube_exits(
        &self,
        points: &[Point3],
        radii: &[f64],
        ids: &[usize],
        tube: &TubeDistanceField<'_>,
    ) -> Vec<CellLocation> {
        let mut exits = Vec::new();
        for (sub_id, pair) in ids.windows(2).enumerate() {
            let p0 = &points[pair[0]];
            let p1 = &points[pair[1]];
            if !(tube.value(p0) <= 0.0 && tube.value(p1) > 0.0) {
                continue;
            }
            let mean_radius = 0.5 * (radii[pair[0]] + radii[pair[1]]);
            let pcoord = self.refine_exit(p0, p1, mean_radius, tube);
            exits.push(CellLocation::new(sub_id, pcoord));
        }
        exits
    }

    /// Walks the segment in fixed steps and returns the end of the first step
    /// that crosses the tube boundary outwards.
    fn refine_exit(
        &self,
        p0: &Point3,
        p1: &Point3,
        mean_radius: f64,
        tube: &TubeDistanceField<'_>,
    ) -> f64 {
        let length = (p1 - p0).norm();
        let step = self.refinement_step_fraction * mean_radius;
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let steps = if step > TOLERANCE {
            (length / step).ceil().max(1.0) as usize
        } else {
            1
        };
        #[allow(clippy::cast_precision_loss)]
        let pcoord_step = 1.0 / steps as f64;

        let mut pcoord = 0.0;
        for _ in 0..steps {
            let inside = tube.value(&lerp_point(p0, p1, pcoord)) <= 0.0;
            let outside = tube.value(&lerp_point(p0, p1, pcoord + pcoord_step)) > 0.0;
            pcoord += pcoord_step;
            if inside && outside {
                break;
            }
        }
        pcoord.min(1.0)
    }
}

/// Turns touchings and tube exits (both in exit order) into a cut sequence.
///
/// Each emitted touching opens a blanked stretch, closed by the farthest exit
/// among the run of following touchings that fall at or before the current
/// closing exit. Touchings at or before the last emitted exit are skipped.
fn pair_touchings(touchings: &[CellLocation], exits: &[CellLocation]) -> SplitRecord {
    let mut record = SplitRecord::unsplit();
    let mut previous_exit: Option<CellLocation> = None;

    for (i, touching) in touchings.iter().enumerate() {
        if previous_exit.is_some_and(|prev| touching.is_at_or_before(&prev)) {
            continue;
        }
        record.push(*touching, true);

        let mut farthest = i;
        for j in (i + 1)..touchings.len() {
            if !touchings[j].is_at_or_before(&exits[farthest]) {
                break;
            }
            if exits[farthest].is_at_or_before(&exits[j]) {
                farthest = j;
            }
        }

        record.push(exits[farthest], false);
        previous_exit = Some(exits[farthest]);
    }

    record
}
