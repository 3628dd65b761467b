mod bifurcation;
mod systems;

pub use bifurcation::BifurcationReferenceSystems;
pub use systems::{ReferenceSystem, ReferenceSystems};
