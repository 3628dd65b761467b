#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::systems::{ReferenceSystem, ReferenceSystems};
use crate::config::ArrayNames;
use crate::error::Result;
use crate::geometry::CenterlineMesh;
use crate::math::vector_3d::{
    cotangent, normalize_or_none, perpendicular, triangle_normal, weighted_centroid,
};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::query::CenterlineGroups;

/// First and last point of one tract of a bifurcation group, with radii.
#[derive(Debug, Clone, Copy)]
struct TractEnds {
    first: Point3,
    first_radius: f64,
    last: Point3,
    last_radius: f64,
}

/// Computes a local reference system for every blanked group of a labeled
/// centerline mesh.
///
/// The origin is the squared-radius weighted centroid of the group's tract
/// endpoints. For every pair of tracts, the polygon through their endpoints
/// contributes a cotangent-weighted normal; the normals are oriented
/// consistently and averaged into the plane normal. The up-normal is the
/// squared-radius weighted average of the in-plane tract directions.
#[derive(Debug, Clone, Default)]
pub struct BifurcationReferenceSystems {
    names: ArrayNames,
}

impl BifurcationReferenceSystems {
    /// Creates a new `BifurcationReferenceSystems` operation.
    #[must_use]
    pub fn new(names: ArrayNames) -> Self {
        Self { names }
    }

    /// Executes the operation.
    ///
    /// Groups without usable endpoints are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an array name is unset or the radius,
    /// group id or blanking array is missing.
    pub fn execute(&self, mesh: &CenterlineMesh) -> Result<ReferenceSystems> {
        let names = &self.names;
        names.validate_for_reference_systems().inspect_err(|e| {
            warn!(error = %e, "bifurcation reference systems are not configured");
        })?;
        let radii = mesh.require_point_array(&names.radius)?;
        let groups = CenterlineGroups::new(mesh, &names.group_ids)?.with_blanking(&names.blanking)?;

        let bifurcations = groups.blanked_group_ids();
        let systems: Vec<ReferenceSystem> =
            compute_systems(&bifurcations, |group_id| {
                group_reference_system(mesh, radii, &groups, group_id)
            });

        info!(
            bifurcations = bifurcations.len(),
            systems = systems.len(),
            "bifurcation reference systems computed"
        );
        Ok(ReferenceSystems::new(systems))
    }
}

#[cfg(feature = "parallel")]
fn compute_systems<F>(group_ids: &[i64], compute: F) -> Vec<ReferenceSystem>
where
    F: Fn(i64) -> Option<ReferenceSystem> + Sync + Send,
{
    group_ids.par_iter().filter_map(|&g| compute(g)).collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_systems<F>(group_ids: &[i64], compute: F) -> Vec<ReferenceSystem>
where
    F: Fn(i64) -> Option<ReferenceSystem>,
{
    group_ids.iter().filter_map(|&g| compute(g)).collect()
}

fn group_reference_system(
    mesh: &CenterlineMesh,
    radii: &[f64],
    groups: &CenterlineGroups<'_>,
    group_id: i64,
) -> Option<ReferenceSystem> {
    let ends: Vec<TractEnds> = groups
        .unique_group_cell_ids(group_id)
        .into_iter()
        .filter_map(|cell| {
            let (a, b) = mesh.polyline_endpoints(cell)?;
            Some(TractEnds {
                first: *mesh.point(a)?,
                first_radius: radii[a],
                last: *mesh.point(b)?,
                last_radius: radii[b],
            })
        })
        .collect();

    if ends.is_empty() {
        warn!(group_id, "bifurcation group has no tracts, skipping");
        return None;
    }
    if ends.len() == 1 {
        return line_reference_system(group_id, &ends[0], None);
    }

    let mut points = Vec::with_capacity(2 * ends.len());
    let mut weights = Vec::with_capacity(2 * ends.len());
    for e in &ends {
        points.extend([e.first, e.last]);
        weights.extend([e.first_radius.powi(2), e.last_radius.powi(2)]);
    }
    let origin = weighted_centroid(&points, &weights)?;

    let mut normals = Vec::new();
    for (i, a) in ends.iter().enumerate() {
        for b in &ends[i + 1..] {
            let polygon: Vec<Point3> = if (a.first - b.first).norm_squared() < TOLERANCE {
                vec![a.first, a.last, b.last]
            } else {
                vec![a.first, a.last, b.last, b.first]
            };
            match polygon_normal(&polygon, &origin) {
                Some(n) => normals.push(n),
                None => debug!(group_id, "dropping degenerate tract pair polygon"),
            }
        }
    }

    let Some(&reference) = normals.first() else {
        debug!(group_id, "no tract pair spans a plane, using the first tract");
        return line_reference_system(group_id, &ends[0], Some(origin));
    };
    let oriented: Vector3 = normals
        .iter()
        .map(|n| if n.dot(&reference) < 0.0 { -n } else { *n })
        .sum();
    let normal = normalize_or_none(&oriented).unwrap_or(reference);

    let mut up = Vector3::zeros();
    for e in &ends {
        let direction = e.last - e.first;
        let projected = direction - normal * direction.dot(&normal);
        if let Some(unit) = normalize_or_none(&projected) {
            up += unit * e.last_radius.powi(2);
        }
    }
    let up_normal = normalize_or_none(&up).or_else(|| perpendicular(&normal))?;

    Some(ReferenceSystem {
        group_id,
        origin,
        normal,
        up_normal,
    })
}

/// Frame of a group whose endpoints only define a line: the up-normal
/// follows the line and the normal is a stable perpendicular to it.
///
/// The origin defaults to the midpoint of the line.
fn line_reference_system(
    group_id: i64,
    ends: &TractEnds,
    origin: Option<Point3>,
) -> Option<ReferenceSystem> {
    let Some(up_normal) = normalize_or_none(&(ends.last - ends.first)) else {
        warn!(group_id, "bifurcation group collapses to a point, skipping");
        return None;
    };
    let normal = perpendicular(&up_normal)?;
    Some(ReferenceSystem {
        group_id,
        origin: origin.unwrap_or_else(|| nalgebra::center(&ends.first, &ends.last)),
        normal,
        up_normal,
    })
}

/// Cotangent-weighted normal of a polygon fanned around `origin`.
///
/// Each vertex contributes the normal of the triangle it forms with its
/// neighbors, weighted by the cotangents of the angles its edges make with
/// the direction to `origin`, over the squared distance to `origin`. Vertices
/// on top of the origin contribute nothing.
fn polygon_normal(vertices: &[Point3], origin: &Point3) -> Option<Vector3> {
    let n = vertices.len();
    let mut sum = Vector3::zeros();
    for k in 0..n {
        let prev = &vertices[(k + n - 1) % n];
        let vertex = &vertices[k];
        let next = &vertices[(k + 1) % n];
        let distance_squared = (origin - vertex).norm_squared();
        if distance_squared < TOLERANCE {
            continue;
        }
        let weight =
            (cotangent(prev, vertex, origin) + cotangent(origin, vertex, next)) / distance_squared;
        sum += triangle_normal(prev, vertex, next) * weight;
    }
    normalize_or_none(&sum)
}
