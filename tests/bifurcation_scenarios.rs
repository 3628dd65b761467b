#![allow(clippy::unwrap_used)]

mod common;

use approx::assert_relative_eq;
use common::{centerlines, init_tracing, is_contiguous, p};
use vessel_branches::geometry::CenterlineMesh;
use vessel_branches::math::{Point3, Vector3};
use vessel_branches::operations::query::CenterlineGroups;
use vessel_branches::operations::reference::BifurcationReferenceSystems;
use vessel_branches::operations::split::{CenterlineSplitter, TreeBranchSplitting};
use vessel_branches::{ArrayNames, SplitterConfig};

/// Two centerlines sharing a trunk along -x and diverging at the origin
/// towards `(5, 3, 0)` and `(5, -3, 0)`.
fn trunk_y() -> CenterlineMesh {
    centerlines(
        &[
            vec![p(-5.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(5.0, 3.0, 0.0)],
            vec![p(-5.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(5.0, -3.0, 0.0)],
        ],
        1.0,
    )
}

fn split(mesh: &CenterlineMesh) -> CenterlineMesh {
    CenterlineSplitter::new(TreeBranchSplitting::default(), SplitterConfig::default())
        .execute(mesh)
        .unwrap()
}

/// Builds an already labeled mesh: one polyline per `(points, group, blanked)`.
fn labeled(cells: &[(Vec<Point3>, i64, bool)]) -> CenterlineMesh {
    let mut mesh = CenterlineMesh::new();
    for (points, _, _) in cells {
        mesh.add_polyline_points(points);
    }
    let radii = vec![1.0; mesh.number_of_points()];
    mesh.set_point_array("MaximumInscribedSphereRadius", radii)
        .unwrap();
    mesh.set_cell_array("GroupIds", cells.iter().map(|c| c.1).collect())
        .unwrap();
    mesh.set_cell_array("Blanking", cells.iter().map(|c| i64::from(c.2)).collect())
        .unwrap();
    mesh
}

fn polyline_length(mesh: &CenterlineMesh, cell: usize) -> f64 {
    mesh.polyline(cell)
        .unwrap()
        .windows(2)
        .map(|w| (mesh.point(w[1]).unwrap() - mesh.point(w[0]).unwrap()).norm())
        .sum()
}

fn assert_unit_frame(normal: &Vector3, up: &Vector3) {
    assert!(normal.iter().chain(up.iter()).all(|c| c.is_finite()));
    assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(up.norm(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(normal.dot(up), 0.0, epsilon = 1e-9);
}

#[test]
fn trunk_y_yields_one_bifurcation_between_three_branches() {
    init_tracing();
    let out = split(&trunk_y());

    assert_eq!(out.number_of_cells(), 6);
    assert_eq!(out.cell_array("CenterlineIds").unwrap(), &[0, 0, 0, 1, 1, 1]);
    assert_eq!(out.cell_array("TractIds").unwrap(), &[0, 1, 2, 0, 1, 2]);
    assert_eq!(out.cell_array("Blanking").unwrap(), &[0, 1, 0, 0, 1, 0]);
    assert_eq!(out.cell_array("GroupIds").unwrap(), &[0, 1, 2, 0, 1, 3]);

    let groups = CenterlineGroups::new(&out, "GroupIds")
        .unwrap()
        .with_blanking("Blanking")
        .unwrap()
        .with_tracts("CenterlineIds", "TractIds")
        .unwrap();
    assert_eq!(groups.blanked_group_ids(), vec![1]);
    assert_eq!(groups.non_blanked_group_ids(), vec![0, 2, 3]);

    let adjacent = groups.adjacent_groups(1).unwrap();
    assert_eq!(adjacent.upstream, vec![0]);
    assert_eq!(adjacent.downstream, vec![2, 3]);
}

#[test]
fn trunk_y_reference_system_lies_in_the_branching_plane() {
    init_tracing();
    let out = split(&trunk_y());
    let systems = BifurcationReferenceSystems::default().execute(&out).unwrap();
    assert_eq!(systems.len(), 1);

    let system = systems.get(1).unwrap();
    assert_unit_frame(&system.normal, &system.up_normal);
    assert_relative_eq!(system.normal.z.abs(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(system.up_normal, Vector3::x(), epsilon = 1e-6);
    assert!(system.origin.x > 0.0 && system.origin.x < 2.0);
    assert_relative_eq!(system.origin.y, 0.0, epsilon = 1e-9);

    let set = systems.to_point_set(&ArrayNames::default());
    assert_eq!(set.number_of_points(), 1);
    assert_eq!(set.int_array("GroupIds").unwrap(), &[1]);
}

#[test]
fn lines_diverging_from_a_common_start_have_one_bifurcation() {
    init_tracing();
    let mesh = centerlines(
        &[
            vec![p(0.0, 0.0, 0.0), p(5.0, 3.0, 0.0)],
            vec![p(0.0, 0.0, 0.0), p(5.0, -3.0, 0.0)],
        ],
        1.0,
    );
    let out = split(&mesh);
    let groups = CenterlineGroups::new(&out, "GroupIds")
        .unwrap()
        .with_blanking("Blanking")
        .unwrap()
        .with_tracts("CenterlineIds", "TractIds")
        .unwrap();
    assert_eq!(groups.blanked_group_ids().len(), 1);

    let last_tract_group = |centerline| {
        let cells = groups.centerline_cell_ids(centerline);
        groups.group_of(*cells.last().unwrap()).unwrap()
    };
    let (a, b) = (last_tract_group(0), last_tract_group(1));
    assert_ne!(a, b);
    assert!(!groups.is_group_blanked(a));
    assert!(!groups.is_group_blanked(b));

    // The walk back from the tube exit stops one radius short of the shared
    // start, leaving a common stub that forms a third non-blanked group.
    let non_blanked = groups.non_blanked_group_ids();
    assert_eq!(non_blanked.len(), 3);
    let stub = non_blanked
        .into_iter()
        .find(|&g| g != a && g != b)
        .unwrap();
    let stub_cells = groups.group_cell_ids(stub);
    assert_eq!(stub_cells.len(), 2);
    for cell in stub_cells {
        assert!(polyline_length(&out, cell) < 1.0);
    }

    let systems = BifurcationReferenceSystems::default().execute(&out).unwrap();
    let system = systems.iter().next().unwrap();
    assert_unit_frame(&system.normal, &system.up_normal);
    assert_relative_eq!(system.normal.z.abs(), 1.0, epsilon = 1e-9);
    assert!(system.up_normal.x > 0.99);
}

#[test]
fn three_way_normal_does_not_depend_on_cell_order() {
    init_tracing();
    let directions: Vec<Vector3> = (0..3)
        .map(|k| {
            let angle = f64::from(k) * 2.0 * std::f64::consts::PI / 3.0;
            Vector3::new(angle.cos(), angle.sin(), 0.0)
        })
        .collect();
    let cells_for = |order: [usize; 3]| -> Vec<(Vec<Point3>, i64, bool)> {
        let mut cells = Vec::new();
        for k in order {
            let u = directions[k];
            cells.push((vec![Point3::from(u * 0.5), Point3::from(u * 2.0)], 0, true));
            #[allow(clippy::cast_possible_wrap)]
            let group = k as i64 + 1;
            cells.push((vec![Point3::from(u * 2.0), Point3::from(u * 5.0)], group, false));
        }
        cells
    };

    let mut normals = Vec::new();
    for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0], [2, 1, 0]] {
        let systems = BifurcationReferenceSystems::default()
            .execute(&labeled(&cells_for(order)))
            .unwrap();
        assert_eq!(systems.len(), 1);
        let system = systems.get(0).unwrap();
        assert_unit_frame(&system.normal, &system.up_normal);
        assert_relative_eq!(system.normal.z.abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(system.origin, Point3::origin(), epsilon = 1e-9);
        // Symmetric tracts cancel out, so the up-normal is a perpendicular of the normal.
        assert_relative_eq!(system.up_normal.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(system.up_normal.dot(&system.normal), 0.0, epsilon = 1e-9);
        assert_relative_eq!(system.up_normal.z, 0.0, epsilon = 1e-9);
        normals.push(system.normal);
    }
    for n in &normals[1..] {
        assert_relative_eq!(n.dot(&normals[0]).abs(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn duplicated_two_point_group_falls_back_to_a_line_frame() {
    init_tracing();
    let segment = vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0)];
    let mesh = labeled(&[(segment.clone(), 0, true), (segment, 0, true)]);
    let systems = BifurcationReferenceSystems::default().execute(&mesh).unwrap();

    let system = systems.get(0).unwrap();
    assert_unit_frame(&system.normal, &system.up_normal);
    assert_relative_eq!(system.origin, p(1.5, 0.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(system.up_normal, Vector3::x(), epsilon = 1e-12);
}

#[test]
fn collinear_tracts_fall_back_to_a_line_frame_at_the_weighted_origin() {
    init_tracing();
    let mesh = labeled(&[
        (vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)], 0, true),
        (vec![p(1.0, 0.0, 0.0), p(3.0, 0.0, 0.0)], 0, true),
    ]);
    let systems = BifurcationReferenceSystems::default().execute(&mesh).unwrap();

    let system = systems.get(0).unwrap();
    assert_unit_frame(&system.normal, &system.up_normal);
    assert_relative_eq!(system.origin, p(1.25, 0.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(system.up_normal, Vector3::x(), epsilon = 1e-12);
}

#[test]
fn split_ids_stay_contiguous_on_a_three_way_tree() {
    init_tracing();
    let mesh = centerlines(
        &[
            vec![p(-6.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(6.0, 4.0, 0.0)],
            vec![p(-6.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(7.0, 0.0, 0.0)],
            vec![p(-6.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(6.0, -4.0, 1.0)],
        ],
        1.0,
    );
    let out = split(&mesh);

    assert!(is_contiguous(out.cell_array("GroupIds").unwrap()));
    let centerline_ids = out.cell_array("CenterlineIds").unwrap();
    let tract_ids = out.cell_array("TractIds").unwrap();
    for centerline in 0..3 {
        let ids: Vec<i64> = centerline_ids
            .iter()
            .zip(tract_ids)
            .filter(|&(&c, _)| c == centerline)
            .map(|(_, &t)| t)
            .collect();
        assert!(!ids.is_empty());
        assert!(is_contiguous(&ids));
    }

    let blanking = out.cell_array("Blanking").unwrap();
    assert!(blanking.iter().all(|&b| b == 0 || b == 1));
    assert!(blanking.contains(&1));
}
