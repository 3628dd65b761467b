mod location;
mod mesh;
mod point_set;

pub use location::CellLocation;
pub use mesh::{Cell, CellType, CenterlineMesh};
pub use point_set::PointSet;
