#![allow(dead_code, clippy::unwrap_used)]

use vessel_branches::geometry::CenterlineMesh;
use vessel_branches::math::Point3;

/// Installs a log subscriber honoring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

pub fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

/// Builds a mesh with one polyline per entry and a constant radius array.
pub fn centerlines(lines: &[Vec<Point3>], radius: f64) -> CenterlineMesh {
    let mut mesh = CenterlineMesh::new();
    for line in lines {
        mesh.add_polyline_points(line);
    }
    let radii = vec![radius; mesh.number_of_points()];
    mesh.set_point_array("MaximumInscribedSphereRadius", radii)
        .unwrap();
    mesh
}

/// Returns `true` if `ids` holds every value of `0..=max(ids)`.
pub fn is_contiguous(ids: &[i64]) -> bool {
    let Some(&max) = ids.iter().max() else {
        return true;
    };
    ids.iter().all(|&id| id >= 0) && (0..=max).all(|v| ids.contains(&v))
}
