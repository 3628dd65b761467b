pub mod vector_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Tolerance for near-zero denominators and coincident points (squared distances).
pub const TOLERANCE: f64 = 1e-12;

/// Coarser tolerance used when deciding whether an inserted split point
/// duplicates an existing centerline point.
pub const POINT_MERGE_TOLERANCE: f64 = 1e-6;
