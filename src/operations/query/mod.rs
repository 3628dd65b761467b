mod groups;
mod sphere_touching;
mod tube_distance;

pub use groups::{AdjacentGroups, CenterlineGroups};
pub use sphere_touching::{Direction, SphereTouchingLocator};
pub use tube_distance::{TubeDistanceField, TubeEvaluation};
