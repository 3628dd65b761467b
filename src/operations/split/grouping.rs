use std::collections::BTreeSet;

use crate::config::{ArrayNames, GroupingMode};
use crate::error::Result;
use crate::geometry::CenterlineMesh;
use crate::math::{Point3, TOLERANCE};
use crate::operations::query::TubeDistanceField;

/// Assigns a group id to every tract.
///
/// Every tract starts in its own group (its cell index); tracts judged to be
/// the same branch are then relabeled into a common group. Ids are not yet
/// contiguous.
pub(super) fn group_tracts(
    tracts: &CenterlineMesh,
    mode: GroupingMode,
    names: &ArrayNames,
) -> Result<Vec<i64>> {
    match mode {
        GroupingMode::FirstPoint => Ok(coincident_endpoint_groups(tracts, true)),
        GroupingMode::LastPoint => Ok(coincident_endpoint_groups(tracts, false)),
        GroupingMode::PointInTube => point_in_tube_groups(tracts, names),
    }
}

#[allow(clippy::cast_possible_wrap)]
fn initial_groups(tracts: &CenterlineMesh) -> Vec<i64> {
    (0..tracts.number_of_cells()).map(|i| i as i64).collect()
}

fn endpoint(tracts: &CenterlineMesh, cell: usize, first: bool) -> Option<Point3> {
    let (a, b) = tracts.polyline_endpoints(cell)?;
    tracts.point(if first { a } else { b }).copied()
}

/// Tracts whose first (or last) points coincide share the group of the
/// earliest such tract.
fn coincident_endpoint_groups(tracts: &CenterlineMesh, first: bool) -> Vec<i64> {
    let mut groups = initial_groups(tracts);
    let n = tracts.number_of_cells();

    for i in 0..n {
        let Some(reference) = endpoint(tracts, i, first) else {
            continue;
        };
        let group = groups[i];
        for j in i..n {
            if endpoint(tracts, j, first).is_some_and(|p| (p - reference).norm() < TOLERANCE) {
                groups[j] = group;
            }
        }
    }

    groups
}

/// A tract absorbs the group of a tract from another centerline when its
/// first point lies inside that tract's tube and the closest center of that
/// tube lies inside its own tube.
///
/// Blanked tracts only group with blanked tracts. A tract already sharing a
/// group with some tract of a centerline is not regrouped against it. Among
/// several candidates on one centerline, the one whose closest center lies
/// deepest inside the tract's own tube wins.
fn point_in_tube_groups(tracts: &CenterlineMesh, names: &ArrayNames) -> Result<Vec<i64>> {
    let blanking = tracts.require_cell_array(&names.blanking)?;
    let centerline_ids = tracts.require_cell_array(&names.centerline_ids)?;
    let mut groups = initial_groups(tracts);
    if tracts.number_of_cells() == 0 {
        return Ok(groups);
    }
    let field = TubeDistanceField::new(tracts, &names.radius)?;
    let centerlines: BTreeSet<i64> = centerline_ids.iter().copied().collect();
    let n = tracts.number_of_cells();

    for i in 0..n {
        let Some(first_point) = endpoint(tracts, i, true) else {
            continue;
        };
        let own_tube = field.clone().with_cell(i);
        let group = groups[i];

        for &centerline in &centerlines {
            if centerline == centerline_ids[i] {
                continue;
            }
            let candidates: Vec<usize> = (0..n)
                .filter(|&j| j != i && centerline_ids[j] == centerline)
                .collect();
            if candidates.iter().any(|&j| groups[j] == group) {
                continue;
            }

            let mut best: Option<(f64, i64)> = None;
            for &j in &candidates {
                if blanking[j] != blanking[i] || groups[j] == group || tracts.polyline(j).is_none()
                {
                    continue;
                }
                let Some(eval) = field.clone().with_cell(j).evaluate(&first_point) else {
                    continue;
                };
                let own_value = own_tube.value(&eval.center);
                if eval.value < -TOLERANCE
                    && own_value < -TOLERANCE
                    && best.is_none_or(|(v, _)| own_value < v)
                {
                    best = Some((own_value, groups[j]));
                }
            }

            if let Some((_, absorbed)) = best {
                for g in &mut groups {
                    if *g == absorbed {
                        *g = group;
                    }
                }
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Tracts of two centerlines: a shared trunk, a blanked junction piece
    /// each, and a diverging branch each.
    fn split_y() -> CenterlineMesh {
        let mut mesh = CenterlineMesh::new();
        for sign in [1.0, -1.0] {
            mesh.add_polyline_points(&[p(-5.0, 0.0, 0.0), p(-1.0, 0.0, 0.0)]);
            mesh.add_polyline_points(&[p(-1.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(1.0, sign, 0.0)]);
            mesh.add_polyline_points(&[p(1.0, sign, 0.0), p(5.0, 5.0 * sign, 0.0)]);
        }
        let radii = vec![1.0; mesh.number_of_points()];
        mesh.set_point_array("MaximumInscribedSphereRadius", radii)
            .unwrap();
        mesh.set_cell_array("Blanking", vec![0, 1, 0, 0, 1, 0]).unwrap();
        mesh.set_cell_array("CenterlineIds", vec![0, 0, 0, 1, 1, 1])
            .unwrap();
        mesh
    }

    #[test]
    fn first_point_groups_trunk_and_junction() {
        let mesh = split_y();
        let groups = group_tracts(&mesh, GroupingMode::FirstPoint, &ArrayNames::default()).unwrap();
        assert_eq!(groups, vec![0, 1, 2, 0, 1, 5]);
    }

    #[test]
    fn last_point_groups_only_the_trunk() {
        let mesh = split_y();
        let groups = group_tracts(&mesh, GroupingMode::LastPoint, &ArrayNames::default()).unwrap();
        assert_eq!(groups, vec![0, 1, 2, 0, 4, 5]);
    }

    #[test]
    fn point_in_tube_groups_overlapping_tracts() {
        let mesh = split_y();
        let groups =
            group_tracts(&mesh, GroupingMode::PointInTube, &ArrayNames::default()).unwrap();
        assert_eq!(groups[0], groups[3]);
        assert_eq!(groups[1], groups[4]);
        assert_ne!(groups[2], groups[5]);
        assert_ne!(groups[0], groups[1]);
        assert_ne!(groups[1], groups[2]);
    }

    #[test]
    fn point_in_tube_needs_blanking() {
        let mut mesh = CenterlineMesh::new();
        mesh.add_polyline_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        mesh.set_cell_array("CenterlineIds", vec![0]).unwrap();
        assert!(group_tracts(&mesh, GroupingMode::PointInTube, &ArrayNames::default()).is_err());
    }
}
